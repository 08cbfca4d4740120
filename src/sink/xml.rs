use super::{BuildContext, Property, SinkBuilder, SinkKind, closed_error};
use crate::config::ConfigError;
use crate::record::LogRecord;
use crate::suffix::{COUNT_BASE, SIZE_BASE, parse_suffixed};
use chrono::Local;
use quick_xml::escape::escape;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Validated settings of an `xml` filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlSinkConfig {
    pub filename: String,
    pub max_records: u64,
    pub max_size: u64,
    pub daily: bool,
    pub rotate: bool,
}

/// Appends `<record>` elements to a file, wrapped in a `<log>` element per
/// session.
#[derive(Debug)]
pub struct XmlSink {
    config: XmlSinkConfig,
    writer: Option<BufWriter<File>>,
    records_written: u64,
}

impl XmlSink {
    pub fn config(&self) -> &XmlSinkConfig {
        &self.config
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed_error)?;
        write!(
            writer,
            "\t<record level=\"{}\">\n\t\t<timestamp>{}</timestamp>\n\t\t<source>{}</source>\n\t\t<message>{}</message>\n\t</record>\n",
            record.level.short_label(),
            record.created.format(TIMESTAMP_FORMAT),
            escape(record.source.as_str()),
            escape(record.message.as_str()),
        )?;
        writer.flush()?;
        self.records_written += 1;
        Ok(())
    }

    /// Writes the closing `</log>` and releases the file.
    pub fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.write_all(b"</log>\n")?;
                writer.flush()
            }
            None => Ok(()),
        }
    }
}

impl Drop for XmlSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl SinkBuilder for XmlSink {
    const KIND: SinkKind = SinkKind::Xml;
    type Config = XmlSinkConfig;

    fn parse_properties(
        ctx: &mut BuildContext<'_>,
        properties: &[Property],
    ) -> Result<Self::Config, ConfigError> {
        let mut config = XmlSinkConfig::default();

        for prop in properties {
            match prop.name.as_str() {
                "filename" => config.filename = prop.trimmed().to_string(),
                "maxrecords" => config.max_records = parse_suffixed(prop.trimmed(), COUNT_BASE),
                "maxsize" => config.max_size = parse_suffixed(prop.trimmed(), SIZE_BASE),
                "daily" => config.daily = prop.flag(),
                "rotate" => config.rotate = prop.flag(),
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
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "<log created=\"{}\">",
            Local::now().format(TIMESTAMP_FORMAT)
        )?;
        writer.flush()?;

        Ok(XmlSink {
            config,
            writer: Some(writer),
            records_written: 0,
        })
    }
}
