//! # Logging Bootstrap
//!
//! Installs the global `tracing` subscriber for the bridge.
//!
//! Filtering resolves in order: an explicit filter string, then `RUST_LOG`,
//! then a default that lets the workspace crates through at the configured
//! level and everything else (SDK shims, dependencies) only at `warn`.
//!
//! When a host [`LoggerSink`] is configured, each event that passes the filter
//! is also converted into a [`LogEntry`] and delivered to the host. Values of
//! sensitive fields are masked before they leave the process unless masking
//! is turned off.
//!
//! ```ignore
//! use bridge_traits::logging::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug)
//!         .with_logger_sink(Arc::new(ConsoleLogger::default())),
//! )?;
//! tracing::info!(provider = "AppLovinMax", "Mediator ready");
//! ```

use crate::error::{Error, Result};

use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use core_async::{runtime, task};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Targets that follow [`LoggingConfig::level`] under the default filter.
const WORKSPACE_TARGETS: &[&str] = &[
    "core_runtime",
    "core_bridge",
    "mediator_applovin_max",
    "bridge_desktop",
];

/// Field name fragments whose values never reach the host sink.
const SENSITIVE_KEYS: &[&str] = &[
    "sdk_key",
    "token",
    "secret",
    "password",
    "api_key",
    "authorization",
    "receipt",
];

const MASK: &str = "[REDACTED]";

/// Output format of the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, coloured; the debug-build default.
    Pretty,
    /// Single line per event.
    Compact,
    /// One JSON object per event; the release-build default.
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("Unknown log format '{other}'"))),
        }
    }
}

/// Settings for [`init_logging`].
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level applied to the workspace crates by the default filter.
    pub level: LogLevel,
    /// `EnvFilter` directives overriding both `RUST_LOG` and the default.
    pub filter: Option<String>,
    /// Mask sensitive field values before they reach the sink.
    pub redact_sensitive: bool,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Log span open/close (pretty) or the span list (json).
    pub spans: bool,
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            redact_sensitive: true,
            logger_sink: None,
            spans: true,
            show_target: true,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("redact_sensitive", &self.redact_sensitive)
            .field("logger_sink", &self.logger_sink.is_some())
            .field("spans", &self.spans)
            .field("show_target", &self.show_target)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    pub fn with_redaction(mut self, enabled: bool) -> Self {
        self.redact_sensitive = enabled;
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enabled: bool) -> Self {
        self.spans = enabled;
        self
    }

    pub fn with_target(mut self, shown: bool) -> Self {
        self.show_target = shown;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        if let Some(directives) = &self.filter {
            return EnvFilter::try_new(directives)
                .map_err(|e| Error::Config(format!("Invalid log filter '{directives}': {e}")));
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(default_directives(self.level))
            .map_err(|e| Error::Config(format!("Invalid default log filter: {e}")))
    }
}

/// Installs the global subscriber.
///
/// Fails with [`Error::Config`] on a bad filter or when a global subscriber
/// is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let host = config
        .logger_sink
        .clone()
        .map(|sink| HostSinkLayer::new(sink, config.redact_sensitive));
    let base = tracing_subscriber::registry().with(filter).with(host);

    let installed = match config.format {
        LogFormat::Pretty => base
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.show_target)
                    .with_span_events(if config.spans {
                        FmtSpan::NEW | FmtSpan::CLOSE
                    } else {
                        FmtSpan::NONE
                    }),
            )
            .try_init(),
        LogFormat::Compact => base
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.show_target),
            )
            .try_init(),
        LogFormat::Json => base
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(config.spans)
                    .with_span_list(config.spans)
                    .with_target(config.show_target),
            )
            .try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Logging already initialized: {e}")))
}

fn default_directives(level: LogLevel) -> String {
    let level = match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    std::iter::once("warn".to_string())
        .chain(WORKSPACE_TARGETS.iter().map(|t| format!("{t}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Masks `value` when `field` names a secret. Email-looking values keep only
/// their first character.
///
/// ```ignore
/// use core_runtime::logging::redact_if_sensitive;
///
/// tracing::debug!(sdk_key = %redact_if_sensitive("sdk_key", &key), "Starting SDK");
/// ```
pub fn redact_if_sensitive(field: &str, value: &str) -> String {
    let field = field.to_ascii_lowercase();
    if SENSITIVE_KEYS.iter().any(|key| field.contains(key)) {
        return MASK.to_string();
    }

    match value.split_once('@') {
        Some((local, domain)) if domain.contains('.') && !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{MASK}")
        }
        _ => value.to_string(),
    }
}

/// Mirrors filtered events to the host [`LoggerSink`].
struct HostSinkLayer {
    sink: Arc<dyn LoggerSink>,
    redact: bool,
}

impl HostSinkLayer {
    fn new(sink: Arc<dyn LoggerSink>, redact: bool) -> Self {
        Self { sink, redact }
    }

    fn deliver(&self, entry: LogEntry) {
        let sink = Arc::clone(&self.sink);
        if runtime::has_current() {
            task::spawn(async move {
                if let Err(err) = sink.log(entry).await {
                    eprintln!("host log sink failed: {err}");
                }
            });
        } else if let Ok(Err(err)) = runtime::block_on(async move { sink.log(entry).await }) {
            eprintln!("host log sink failed: {err}");
        }
    }
}

impl<S> Layer<S> for HostSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = to_log_level(*metadata.level());
        if level < self.sink.min_level() {
            return;
        }

        let mut fields = EntryFields::default();
        event.record(&mut fields);

        let message = fields
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);
        for (name, value) in fields.values {
            let value = if self.redact {
                redact_if_sensitive(name, &value)
            } else {
                value
            };
            entry = entry.with_field(name, value);
        }
        if let Some(span) = ctx.event_span(event) {
            entry = entry.with_span(span.name());
        }

        self.deliver(entry);
    }
}

/// Collects the message and key/value pairs of one event.
#[derive(Default)]
struct EntryFields {
    message: Option<String>,
    values: Vec<(&'static str, String)>,
}

impl EntryFields {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => self.values.push((name, value)),
        }
    }
}

impl Visit for EntryFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

fn to_log_level(level: Level) -> LogLevel {
    if level == Level::ERROR {
        LogLevel::Error
    } else if level == Level::WARN {
        LogLevel::Warn
    } else if level == Level::INFO {
        LogLevel::Info
    } else if level == Level::DEBUG {
        LogLevel::Debug
    } else {
        LogLevel::Trace
    }
}
