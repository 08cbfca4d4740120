//! Sink builders and the live sinks they produce.
//!
//! Every sink type goes through the same steps when a filter is declared:
//!
//! ```text
//! scan properties      recognised names are parsed, unknown names warn
//! check required       missing required properties fail, even when disabled
//! construct            only when the filter is enabled
//! ```
//!
//! # Sink types
//!
//! - `console` - formatted records on stdout, no properties
//! - `file`    - formatted records appended to `filename`
//! - `xml`     - one `<record>` element per record appended to `filename`
//! - `socket`  - JSON records sent to `endpoint` over `udp` or `tcp`

pub mod console;
pub mod file;
pub mod socket;
pub mod xml;

use crate::config::ConfigError;
use crate::record::LogRecord;
use serde::Serialize;
use std::fmt;
use std::io;

pub use console::ConsoleSink;
pub use file::{FileSink, FileSinkConfig};
pub use socket::{SocketProtocol, SocketSink, SocketSinkConfig};
pub use xml::{XmlSink, XmlSinkConfig};

/// The sink type named by a filter's `<type>` child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Console,
    File,
    Xml,
    Socket,
}

impl SinkKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "console" => Some(SinkKind::Console),
            "file" => Some(SinkKind::File),
            "xml" => Some(SinkKind::Xml),
            "socket" => Some(SinkKind::Socket),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SinkKind::Console => "console",
            SinkKind::File => "file",
            SinkKind::Xml => "xml",
            SinkKind::Socket => "socket",
        }
    }

    /// Validate `properties` for this sink type without opening anything.
    pub fn outline(
        self,
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<SinkOutline, ConfigError> {
        match self {
            SinkKind::Console => ConsoleSink::outline(ctx, properties),
            SinkKind::File => FileSink::outline(ctx, properties),
            SinkKind::Xml => XmlSink::outline(ctx, properties),
            SinkKind::Socket => SocketSink::outline(ctx, properties),
        }
    }

    /// Validate `properties` for this sink type and, when `enabled`, construct it.
    pub fn build(
        self,
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
        enabled: bool,
    ) -> Result<Option<Sink>, ConfigError> {
        match self {
            SinkKind::Console => ConsoleSink::build(ctx, properties, enabled),
            SinkKind::File => FileSink::build(ctx, properties, enabled),
            SinkKind::Xml => XmlSink::build(ctx, properties, enabled),
            SinkKind::Socket => SocketSink::build(ctx, properties, enabled),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One `<property name="...">value</property>` entry, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The value with surrounding whitespace and newlines removed.
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Anything except the literal `false` counts as true.
    pub fn flag(&self) -> bool {
        self.trimmed() != "false"
    }
}

/// Per-load state shared with the builders: the label used in error messages
/// and the warnings collected so far.
#[derive(Debug)]
pub struct BuildContext<'a> {
    source_label: &'a str,
    warnings: Vec<String>,
}

impl<'a> BuildContext<'a> {
    pub fn new(source_label: &'a str) -> Self {
        Self {
            source_label,
            warnings: Vec::new(),
        }
    }

    pub fn source_label(&self) -> &'a str {
        self.source_label
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    pub(crate) fn warn_unknown_property(&mut self, kind: SinkKind, name: &str) {
        let warning = format!(
            "unknown property \"{}\" for {} filter in '{}'",
            name, kind, self.source_label
        );
        eprintln!("Warning: {}", warning);
        self.warnings.push(warning);
    }

    pub(crate) fn require(
        &self,
        kind: SinkKind,
        property: &'static str,
        value: &str,
    ) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Err(ConfigError::MissingProperty {
                property,
                kind,
                source_label: self.source_label.to_string(),
            });
        }
        Ok(())
    }
}

/// What a sink would be built with, as produced by validation alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkOutline {
    #[serde(rename = "type")]
    pub kind: SinkKind,
    pub target: String,
    pub settings: serde_json::Value,
}

/// Construction contract implemented once per sink type.
pub trait SinkBuilder: Sized + Into<Sink> {
    const KIND: SinkKind;
    type Config: Serialize;

    /// Scan the property bag and check required properties.
    fn parse_properties(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<Self::Config, ConfigError>;

    /// What the sink writes to, for error messages.
    fn target(config: &Self::Config) -> String;

    /// Acquire the live resource.
    fn open(config: Self::Config) -> io::Result<Self>;

    fn outline(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<SinkOutline, ConfigError> {
        let config = Self::parse_properties(ctx, properties)?;
        Ok(SinkOutline {
            kind: Self::KIND,
            target: Self::target(&config),
            settings: settings_value(&config),
        })
    }

    fn build(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
        enabled: bool,
    ) -> Result<Option<Sink>, ConfigError> {
        let config = Self::parse_properties(ctx, properties)?;

        // Disabled filters are only checked, nothing is opened.
        if !enabled {
            return Ok(None);
        }

        let target = Self::target(&config);
        match Self::open(config) {
            Ok(sink) => Ok(Some(sink.into())),
            Err(source) => Err(ConfigError::SinkOpen {
                kind: Self::KIND,
                target,
                source_label: ctx.source_label().to_string(),
                source,
            }),
        }
    }
}

/// A constructed, writable sink
#[derive(Debug)]
pub enum Sink {
    Console(ConsoleSink),
    File(FileSink),
    Xml(XmlSink),
    Socket(SocketSink),
}

impl Sink {
    pub fn kind(&self) -> SinkKind {
        match self {
            Sink::Console(_) => SinkKind::Console,
            Sink::File(_) => SinkKind::File,
            Sink::Xml(_) => SinkKind::Xml,
            Sink::Socket(_) => SinkKind::Socket,
        }
    }

    /// Human readable destination, e.g. a file name or `udp://host:port`.
    pub fn target(&self) -> String {
        match self {
            Sink::Console(_) => "stdout".to_string(),
            Sink::File(sink) => FileSink::target(sink.config()),
            Sink::Xml(sink) => XmlSink::target(sink.config()),
            Sink::Socket(sink) => SocketSink::target(sink.config()),
        }
    }

    /// The validated settings the sink was built with.
    pub fn settings(&self) -> serde_json::Value {
        match self {
            Sink::Console(_) => settings_value(&()),
            Sink::File(sink) => settings_value(sink.config()),
            Sink::Xml(sink) => settings_value(sink.config()),
            Sink::Socket(sink) => settings_value(sink.config()),
        }
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        match self {
            Sink::Console(sink) => sink.write(record),
            Sink::File(sink) => sink.write(record),
            Sink::Xml(sink) => sink.write(record),
            Sink::Socket(sink) => sink.write(record),
        }
    }

    /// Flush and release the underlying resource. Further writes fail.
    pub fn close(&mut self) -> io::Result<()> {
        match self {
            Sink::Console(sink) => sink.close(),
            Sink::File(sink) => sink.close(),
            Sink::Xml(sink) => sink.close(),
            Sink::Socket(sink) => sink.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Sink::Console(_) => false,
            Sink::File(sink) => sink.is_closed(),
            Sink::Xml(sink) => sink.is_closed(),
            Sink::Socket(sink) => sink.is_closed(),
        }
    }
}

// Two sinks are equal when they were built from the same settings.
impl PartialEq for Sink {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Sink::Console(_), Sink::Console(_)) => true,
            (Sink::File(a), Sink::File(b)) => a.config() == b.config(),
            (Sink::Xml(a), Sink::Xml(b)) => a.config() == b.config(),
            (Sink::Socket(a), Sink::Socket(b)) => a.config() == b.config(),
            _ => false,
        }
    }
}

impl From<ConsoleSink> for Sink {
    fn from(sink: ConsoleSink) -> Self {
        Sink::Console(sink)
    }
}

impl From<FileSink> for Sink {
    fn from(sink: FileSink) -> Self {
        Sink::File(sink)
    }
}

impl From<XmlSink> for Sink {
    fn from(sink: XmlSink) -> Self {
        Sink::Xml(sink)
    }
}

impl From<SocketSink> for Sink {
    fn from(sink: SocketSink) -> Self {
        Sink::Socket(sink)
    }
}

// Sinks without settings report an empty object.
fn settings_value<T: Serialize>(config: &T) -> serde_json::Value {
    match serde_json::to_value(config) {
        Ok(serde_json::Value::Null) | Err(_) => serde_json::Value::Object(Default::default()),
        Ok(value) => value,
    }
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::other("sink is closed")
}
