//! Declarative filter configuration
//!
//! A configuration document lists filters, each pairing a severity threshold
//! with a sink:
//!
//! ```xml
//! <logging>
//!   <filter enabled="true">
//!     <tag>file</tag>
//!     <type>file</type>
//!     <level>INFO</level>
//!     <property name="filename">app.log</property>
//!     <property name="maxsize">100M</property>
//!   </filter>
//! </logging>
//! ```
//!
//! Loading validates every filter in order, builds the sinks of enabled
//! filters and installs them into a [`Registry`](crate::registry::Registry).
//! Disabled filters are validated the same way but never constructed.
//!
//! [`validate_from_path`] runs the same checks without constructing any sink
//! or touching a registry.

pub mod error;
pub mod loader;

use crate::sink::Property;
use serde::Deserialize;

pub use error::{ConfigError, ErrorCategory};
pub use loader::{
    LoadReport, ValidatedFilter, ValidationReport, compile_declaration, load_from_path,
    load_from_reader, validate_declaration, validate_from_path, validate_from_reader,
};

#[derive(Debug, Default, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct XmlFilter {
    #[serde(rename = "@enabled", default)]
    enabled: String,
    // Repeated children are collected; the last occurrence wins.
    #[serde(default)]
    tag: Vec<String>,
    #[serde(default)]
    level: Vec<String>,
    #[serde(rename = "type", default)]
    kind: Vec<String>,
    #[serde(rename = "property", default)]
    properties: Vec<XmlProperty>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlLoggerConfig {
    #[serde(rename = "filter", default)]
    filters: Vec<XmlFilter>,
}

/// One `<filter>` entry exactly as written; nothing is interpreted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDeclaration {
    pub enabled: String,
    pub tag: String,
    pub level: String,
    pub kind: String,
    pub properties: Vec<Property>,
}

impl From<XmlFilter> for FilterDeclaration {
    fn from(mut filter: XmlFilter) -> Self {
        Self {
            enabled: filter.enabled,
            tag: filter.tag.pop().unwrap_or_default(),
            level: filter.level.pop().unwrap_or_default(),
            kind: filter.kind.pop().unwrap_or_default(),
            properties: filter
                .properties
                .into_iter()
                .map(|prop| Property::new(prop.name, prop.value))
                .collect(),
        }
    }
}

/// Parse a configuration document into its filter declarations, in order.
pub fn parse_declarations(
    document: &str,
    source_label: &str,
) -> Result<Vec<FilterDeclaration>, ConfigError> {
    let config: XmlLoggerConfig =
        quick_xml::de::from_str(document).map_err(|source| ConfigError::Parse {
            source_label: source_label.to_string(),
            source,
        })?;

    Ok(config
        .filters
        .into_iter()
        .map(FilterDeclaration::from)
        .collect())
}
