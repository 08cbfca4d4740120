use crate::level::Severity;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Default line layout for file sinks.
pub const DEFAULT_FORMAT: &str = "[%D %T] [%L] (%S) %M";

/// A single message travelling through the registry.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: Severity,
    pub created: DateTime<Local>,
    pub source: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: Severity, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            created: Local::now(),
            source: source.into(),
            message: message.into(),
        }
    }
}

/// Render a record using `%`-codes, terminated by a newline.
///
/// Recognised codes: `%T` `%t` `%D` `%d` `%L` `%S` `%s` `%M` and `%%`.
/// Anything else after a `%` is copied through unchanged.
pub fn format_record(format: &str, record: &LogRecord) -> String {
    let mut out = String::with_capacity(format.len() + record.message.len() + 16);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('T') => out.push_str(&record.created.format("%H:%M:%S").to_string()),
            Some('t') => out.push_str(&record.created.format("%H:%M").to_string()),
            Some('D') => out.push_str(&record.created.format("%Y/%m/%d").to_string()),
            Some('d') => out.push_str(&record.created.format("%m/%d/%y").to_string()),
            Some('L') => out.push_str(record.level.short_label()),
            Some('S') => out.push_str(&record.source),
            Some('s') => out.push_str(short_source(&record.source)),
            Some('M') => out.push_str(&record.message),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    out.push('\n');
    out
}

fn short_source(source: &str) -> &str {
    source.rsplit('/').next().unwrap_or(source)
}
