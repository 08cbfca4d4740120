use crate::config::{self, ConfigError, LoadReport};
use crate::level::Severity;
use crate::record::LogRecord;
use crate::sink::Sink;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// An installed unit: records at or above `severity` go to `sink`.
#[derive(Debug, PartialEq)]
pub struct Filter {
    pub severity: Severity,
    pub sink: Sink,
}

impl Filter {
    pub fn new(severity: Severity, sink: Sink) -> Self {
        Self { severity, sink }
    }

    pub fn accepts(&self, level: Severity) -> bool {
        level >= self.severity
    }
}

/// The live `tag -> filter` mapping of a logger.
///
/// Not synchronised: callers must not share a registry across threads while
/// a load is running.
#[derive(Debug, Default)]
pub struct Registry {
    filters: BTreeMap<String, Filter>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every filter and release its sink.
    ///
    /// Returns the number of filters released.
    pub fn close_all(&mut self) -> usize {
        let filters = std::mem::take(&mut self.filters);
        let count = filters.len();
        for (tag, mut filter) in filters {
            if let Err(err) = filter.sink.close() {
                warn!(tag = %tag, error = %err, "failed to close sink");
            }
        }
        if count > 0 {
            debug!(count, "released installed filters");
        }
        count
    }

    /// Install `filter` under `tag`. A filter already installed under the
    /// same tag is closed and replaced; returns whether that happened.
    pub fn install(&mut self, tag: impl Into<String>, filter: Filter) -> bool {
        let tag = tag.into();
        match self.filters.insert(tag.clone(), filter) {
            Some(mut previous) => {
                if let Err(err) = previous.sink.close() {
                    warn!(tag = %tag, error = %err, "failed to close replaced sink");
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, tag: &str) -> Option<&Filter> {
        self.filters.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.filters.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filters ordered by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(tag, filter)| (tag.as_str(), filter))
    }

    /// Write `record` to every filter that accepts its level.
    ///
    /// A failing sink is reported and skipped. Returns how many sinks
    /// received the record.
    pub fn dispatch(&mut self, record: &LogRecord) -> usize {
        let mut delivered = 0;
        for (tag, filter) in self.filters.iter_mut() {
            if !filter.accepts(record.level) {
                continue;
            }
            match filter.sink.write(record) {
                Ok(()) => delivered += 1,
                Err(err) => eprintln!("Error: filter '{}' could not write record: {}", tag, err),
            }
        }
        delivered
    }

    pub fn log(
        &mut self,
        level: Severity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> usize {
        self.dispatch(&LogRecord::new(level, source, message))
    }

    pub fn load_configuration(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, ConfigError> {
        config::load_from_path(self, path)
    }

    pub fn load_configuration_from_reader<R: Read>(
        &mut self,
        reader: R,
        source_label: &str,
    ) -> Result<LoadReport, ConfigError> {
        config::load_from_reader(self, reader, source_label)
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.close_all();
    }
}
