use super::{BuildContext, Property, SinkBuilder, SinkKind};
use crate::config::ConfigError;
use crate::record::{DEFAULT_FORMAT, LogRecord, format_record};
use std::io::{self, Write};

/// Writes formatted records to stdout. Takes no properties.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let line = format_record(DEFAULT_FORMAT, record);
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()
    }

    pub fn close(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl SinkBuilder for ConsoleSink {
    const KIND: SinkKind = SinkKind::Console;
    type Config = ();

    fn parse_properties(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<Self::Config, ConfigError> {
        for prop in properties {
            ctx.warn_unknown_property(Self::KIND, &prop.name);
        }
        Ok(())
    }

    fn target(_config: &Self::Config) -> String {
        "stdout".to_string()
    }

    fn open(_config: Self::Config) -> io::Result<Self> {
        Ok(ConsoleSink::new())
    }
}
