use crate::config::{ValidatedFilter, ValidationReport};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    source: &'a str,
    filters: &'a [ValidatedFilter],
    disabled: Vec<&'a str>,
    warnings: &'a [String],
}

pub fn create_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn disabled_tags(report: &ValidationReport) -> Vec<&str> {
    report
        .filters
        .iter()
        .filter(|filter| !filter.enabled)
        .map(|filter| filter.tag.as_str())
        .collect()
}

/// Human readable listing of the declared filters, in declaration order.
pub fn format_check_text(source: &str, report: &ValidationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Configuration".bold(), source.bright_white());

    if report.filters.is_empty() {
        let _ = writeln!(out, "{}", "No filters declared".yellow());
    } else {
        let mut table = create_styled_table();
        table.set_header(vec!["Tag", "Enabled", "Level", "Type", "Target"]);
        for filter in &report.filters {
            table.add_row(vec![
                filter.tag.clone(),
                if filter.enabled { "yes" } else { "no" }.to_string(),
                filter.severity.to_string(),
                filter.sink.kind.to_string(),
                filter.sink.target.clone(),
            ]);
        }
        let _ = writeln!(out, "{table}");
    }

    for warning in &report.warnings {
        let _ = writeln!(out, "{} {}", "warning:".yellow().bold(), warning);
    }
    let enabled = report.filters.iter().filter(|f| f.enabled).count();
    let _ = writeln!(
        out,
        "{} {} filter(s) valid, {} enabled",
        "OK".green().bold(),
        report.filters.len(),
        enabled
    );
    out
}

pub fn format_check_json(source: &str, report: &ValidationReport) -> String {
    let output = CheckOutput {
        source,
        filters: &report.filters,
        disabled: disabled_tags(report),
        warnings: &report.warnings,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
