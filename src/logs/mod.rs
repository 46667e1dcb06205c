//! In-memory capture of recent log events, exposed over the admin API.

use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LogsConfig;

mod layer;

pub use layer::LogBufferLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl LogLevel {
    /// Returns true if self is at or above the given minimum level
    pub fn meets_minimum(&self, min: LogLevel) -> bool {
        *self >= min
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub target: String,
    /// Structured fields recorded alongside the message.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

/// Bounded ring buffer of recent entries, shared between the tracing layer
/// and the admin handlers.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<LogBufferInner>,
}

struct LogBufferInner {
    buffer: RwLock<VecDeque<Arc<LogEntry>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(LogBufferInner {
                buffer: RwLock::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    /// Push a new log entry, evicting oldest if at capacity
    pub fn push(&self, entry: LogEntry) {
        if self.inner.capacity == 0 {
            return;
        }

        let mut buffer = self.inner.buffer.write();
        if buffer.len() >= self.inner.capacity {
            buffer.pop_front();
        }
        buffer.push_back(Arc::new(entry));
    }

    pub fn get_entries(&self, filter: &LogFilter) -> Vec<Arc<LogEntry>> {
        let buffer = self.inner.buffer.read();

        buffer
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// The newest `limit` matching entries, oldest first.
    pub fn get_recent(&self, limit: usize, filter: &LogFilter) -> Vec<Arc<LogEntry>> {
        let buffer = self.inner.buffer.read();

        let mut entries: Vec<Arc<LogEntry>> = buffer
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .take(limit)
            .cloned()
            .collect();

        entries.reverse();
        entries
    }

    pub fn len(&self) -> usize {
        self.inner.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct LogFilter {
    pub min_level: Option<LogLevel>,
    pub since: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        let level_matches = self
            .min_level
            .is_none_or(|min| entry.level.meets_minimum(min));

        let since_matches = self.since.is_none_or(|since| entry.timestamp >= since);

        level_matches && since_matches
    }
}

/// Installs the global subscriber: an env filter (`RUST_LOG`, falling back
/// to `config.level`), human-readable output on stderr and capture into the
/// returned buffer.
pub fn init(config: &LogsConfig) -> anyhow::Result<LogBuffer> {
    let buffer = LogBuffer::new(config.buffer_capacity);

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(LogBufferLayer::new(buffer.clone()))
        .try_init()?;

    Ok(buffer)
}
