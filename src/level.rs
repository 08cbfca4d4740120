use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity threshold attached to every installed filter.
///
/// Variants are declared from least to most severe so the derived ordering
/// can be used directly when deciding whether a record passes a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Finest,
    Fine,
    Debug,
    Trace,
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown level '{0}'. Valid levels are: FINEST, FINE, DEBUG, TRACE, INFO, WARNING, ERROR, CRITICAL")]
pub struct UnknownSeverity(pub String);

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Finest,
        Severity::Fine,
        Severity::Debug,
        Severity::Trace,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Name as written in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Finest => "FINEST",
            Severity::Fine => "FINE",
            Severity::Debug => "DEBUG",
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Four-letter label used by the `%L` format code.
    pub fn short_label(&self) -> &'static str {
        match self {
            Severity::Finest => "FNST",
            Severity::Fine => "FINE",
            Severity::Debug => "DEBG",
            Severity::Trace => "TRAC",
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "EROR",
            Severity::Critical => "CRIT",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    // Exact match only: no case folding, no abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FINEST" => Ok(Severity::Finest),
            "FINE" => Ok(Severity::Fine),
            "DEBUG" => Ok(Severity::Debug),
            "TRACE" => Ok(Severity::Trace),
            "INFO" => Ok(Severity::Info),
            "WARNING" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" => Ok(Severity::Critical),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn resolve_level(name: &str) -> Result<Severity, UnknownSeverity> {
    name.parse()
}
