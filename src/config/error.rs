use crate::sink::SinkKind;
use thiserror::Error;

/// Broad class of a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The declaration, or a sink's live resource, could not be opened or read.
    Resource,
    /// The declaration is not well-formed XML.
    Parse,
    /// The declaration is well-formed but describes an invalid filter.
    Validation,
}

/// Errors that abort a configuration load
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open '{source_label}' for reading: {source}")]
    Open {
        source_label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read '{source_label}': {source}")]
    Read {
        source_label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse XML configuration in '{source_label}': {source}")]
    Encoding {
        source_label: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Could not parse XML configuration in '{source_label}': {source}")]
    Parse {
        source_label: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("Required attribute '{attribute}' for filter missing in '{source_label}'")]
    MissingAttribute {
        attribute: &'static str,
        source_label: String,
    },

    #[error("Required child <{child}> for filter missing in '{source_label}'")]
    MissingChild {
        child: &'static str,
        source_label: String,
    },

    #[error("Required child <level> for filter has unknown value in '{source_label}': {value}")]
    UnknownLevel { value: String, source_label: String },

    #[error("Unknown filter type \"{value}\" in '{source_label}'")]
    UnknownType { value: String, source_label: String },

    #[error("Required property \"{property}\" for {kind} filter missing in '{source_label}'")]
    MissingProperty {
        property: &'static str,
        kind: SinkKind,
        source_label: String,
    },

    #[error("Could not open {kind} sink '{target}' declared in '{source_label}': {source}")]
    SinkOpen {
        kind: SinkKind,
        target: String,
        source_label: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConfigError::Open { .. } | ConfigError::Read { .. } | ConfigError::SinkOpen { .. } => {
                ErrorCategory::Resource
            }
            ConfigError::Encoding { .. } | ConfigError::Parse { .. } => ErrorCategory::Parse,
            ConfigError::MissingAttribute { .. }
            | ConfigError::MissingChild { .. }
            | ConfigError::UnknownLevel { .. }
            | ConfigError::UnknownType { .. }
            | ConfigError::MissingProperty { .. } => ErrorCategory::Validation,
        }
    }

    pub fn source_label(&self) -> &str {
        match self {
            ConfigError::Open { source_label, .. }
            | ConfigError::Read { source_label, .. }
            | ConfigError::Encoding { source_label, .. }
            | ConfigError::Parse { source_label, .. }
            | ConfigError::MissingAttribute { source_label, .. }
            | ConfigError::MissingChild { source_label, .. }
            | ConfigError::UnknownLevel { source_label, .. }
            | ConfigError::UnknownType { source_label, .. }
            | ConfigError::MissingProperty { source_label, .. }
            | ConfigError::SinkOpen { source_label, .. } => source_label,
        }
    }
}
