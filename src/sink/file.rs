use super::{BuildContext, Property, SinkBuilder, SinkKind, closed_error};
use crate::config::ConfigError;
use crate::record::{DEFAULT_FORMAT, LogRecord, format_record};
use crate::suffix::{COUNT_BASE, SIZE_BASE, parse_plain, parse_suffixed};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};

/// Validated settings of a `file` filter.
///
/// Rotation settings are carried for the rotation layer; a limit of 0 means
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSinkConfig {
    pub filename: String,
    pub format: String,
    pub max_lines: u64,
    pub max_size: u64,
    pub daily: bool,
    pub rotate: bool,
    pub keep_num: u64,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            format: DEFAULT_FORMAT.to_string(),
            max_lines: 0,
            max_size: 0,
            daily: false,
            rotate: false,
            keep_num: 0,
        }
    }
}

/// Appends formatted records to a file.
#[derive(Debug)]
pub struct FileSink {
    config: FileSinkConfig,
    writer: Option<BufWriter<File>>,
    lines_written: u64,
}

impl FileSink {
    pub fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed_error)?;
        let line = format_record(&self.config.format, record);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl SinkBuilder for FileSink {
    const KIND: SinkKind = SinkKind::File;
    type Config = FileSinkConfig;

    fn parse_properties(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<Self::Config, ConfigError> {
        let mut config = FileSinkConfig::default();

        for prop in properties {
            match prop.name.as_str() {
                "filename" => config.filename = prop.trimmed().to_string(),
                "format" => config.format = prop.trimmed().to_string(),
                "maxlines" => config.max_lines = parse_suffixed(prop.trimmed(), COUNT_BASE),
                "maxsize" => config.max_size = parse_suffixed(prop.trimmed(), SIZE_BASE),
                "daily" => config.daily = prop.flag(),
                "rotate" => config.rotate = prop.flag(),
                "keepnum" | "keepNum" => config.keep_num = parse_plain(prop.trimmed()),
                other => ctx.warn_unknown_property(Self::KIND, other),
            }
        }

        ctx.require(Self::KIND, "filename", &config.filename)?;
        Ok(config)
    }

    fn target(config: &Self::Config) -> String {
        config.filename.clone()
    }

    fn open(config: Self::Config) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.filename)?;
        Ok(FileSink {
            config,
            writer: Some(BufWriter::new(file)),
            lines_written: 0,
        })
    }
}
