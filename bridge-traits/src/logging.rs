//! Host Logging Sink
//!
//! The bridge logs through `tracing`. Hosts that want those records in their
//! own pipeline (OSLog, Logcat, a file) implement [`LoggerSink`]; the
//! subscriber installed by `core-runtime` converts each event into a
//! [`LogEntry`] and hands it over.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// Field carrying the provider name on orchestrator and adapter events.
pub const PROVIDER_FIELD: &str = "provider";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One structured record handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path of the emitting code, e.g. `core_bridge::orchestrator`.
    pub target: String,
    pub message: String,
    /// Event fields, ordered by name.
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost span, e.g. `bridge.phase_a`.
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// The provider the record is about, if the event named one.
    pub fn provider(&self) -> Option<&str> {
        self.fields.get(PROVIDER_FIELD).map(String::as_str)
    }
}

/// Single-line rendering used by [`ConsoleLogger`].
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5} {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target
        )?;
        if let Some(span) = &self.span {
            write!(f, " [{span}]")?;
        }
        write!(f, ": {}", self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Receives bridge log records on behalf of the host.
///
/// Values of sensitive fields (SDK keys, tokens) are masked before delivery
/// unless the host turned masking off when configuring logging.
///
/// ```ignore
/// struct Logcat;
///
/// #[async_trait]
/// impl LoggerSink for Logcat {
///     async fn log(&self, entry: LogEntry) -> Result<()> {
///         android_log(entry.level, &entry.to_string());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Records below this level are dropped before conversion.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Writes records to stderr; meant for development builds and tools.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{entry}");
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
