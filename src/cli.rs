use crate::level::Severity;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Validate logging filter configurations and route messages through them
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase diagnostic output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration and list its filters without opening any sink
    Check {
        /// XML filter configuration
        config: PathBuf,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load a configuration and send one message through its filters
    Emit {
        /// XML filter configuration
        config: PathBuf,

        /// Severity of the message (e.g. "INFO", "ERROR")
        #[arg(short, long, default_value = "INFO")]
        level: Severity,

        /// Source recorded with the message
        #[arg(short, long, default_value = "log-provisioner")]
        source: String,

        /// Message text
        message: String,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
