pub mod cli;
pub mod config;
pub mod display;
pub mod level;
pub mod record;
pub mod registry;
pub mod sink;
pub mod suffix;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{
    ConfigError, ErrorCategory, FilterDeclaration, LoadReport, ValidatedFilter, ValidationReport,
    load_from_path, load_from_reader, validate_from_path, validate_from_reader,
};
pub use level::{Severity, UnknownSeverity, resolve_level};
pub use record::LogRecord;
pub use registry::{Filter, Registry};
pub use sink::{Property, Sink, SinkKind};
pub use suffix::parse_suffixed;

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_tracing(cli.verbose);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    match &cli.command {
        Commands::Check { config, format } => {
            let report = validate_from_path(config).with_context(|| {
                format!("Failed to validate configuration '{}'", config.display())
            })?;

            let source = config.display().to_string();
            let output = match format {
                OutputFormat::Text => display::format_check_text(&source, &report),
                OutputFormat::Json => display::format_check_json(&source, &report),
            };
            println!("{}", output.trim_end());
        }
        Commands::Emit {
            config,
            level,
            source,
            message,
        } => {
            let mut registry = Registry::new();
            registry
                .load_configuration(config)
                .with_context(|| format!("Failed to load configuration '{}'", config.display()))?;

            let delivered = registry.log(*level, source.as_str(), message.as_str());
            if delivered == 0 {
                eprintln!("No filter accepted a {} message", level);
            }
            registry.close_all();
        }
    }

    Ok(())
}
