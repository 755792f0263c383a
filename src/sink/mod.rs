//! Telemetry sinks
//!
//! A sink is the destination of everything the harness emits:
//! - Stdout - prints formatted entries
//! - File (JSONL) - appends to `<events_dir>/YYYY-MM/YYYY-MM-DD.jsonl`
//! - HTTP - POSTs entries to a configured endpoint
//!
//! Sinks that cannot be built from the configuration are skipped with a
//! warning; with nothing left the harness degrades to [`NoopSink`].

use chrono::{DateTime, Local, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod fanout;
pub mod file;
pub mod http;
#[cfg(test)]
pub mod memory;
pub mod noop;
pub mod stdout;

pub use fanout::FanoutSink;
pub use file::FileSink;
pub use http::HttpSink;
pub use noop::NoopSink;
pub use stdout::StdoutSink;

use crate::config::{Config, SinkConfig, SinkKind};
use crate::telemetry::{Attachment, ExceptionReport, Level, Tags, TelemetryRecord, UserIdentity};

/// Environment variable that overrides the configured HTTP endpoint
pub const DSN_ENV: &str = "TRIPWIRE_DSN";

/// A sink could not deliver an entry
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP delivery failed: {0}")]
    Http(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// One interaction with a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SinkEntry {
    Event(TelemetryRecord),
    Exception(ExceptionReport),
    User(UserIdentity),
    Attachment { filename: String, size: usize },
    ClearAttachments,
    StartBuffering,
    Flush,
    Stop,
}

impl SinkEntry {
    /// Short type name, used for filtering
    pub fn type_name(&self) -> &'static str {
        match self {
            SinkEntry::Event(_) => "event",
            SinkEntry::Exception(_) => "exception",
            SinkEntry::User(_) => "user",
            SinkEntry::Attachment { .. } => "attachment",
            SinkEntry::ClearAttachments => "clear_attachments",
            SinkEntry::StartBuffering => "start_buffering",
            SinkEntry::Flush => "flush",
            SinkEntry::Stop => "stop",
        }
    }

    /// Format for terminal display
    pub fn format_display(&self, at: DateTime<Utc>) -> String {
        let time = at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();

        let body = match self {
            SinkEntry::Event(record) => {
                let level = match record.level {
                    Level::Debug => "DEBUG".dimmed(),
                    Level::Info => "INFO".green(),
                    Level::Warning => "WARN".yellow(),
                    Level::Error => "ERROR".red(),
                };
                let mut parts = vec![level.to_string(), record.message.clone()];
                push_tags(&mut parts, &record.envelope.tags);
                if !record.extra.is_empty() {
                    let extra = serde_json::to_string(&record.extra).unwrap_or_default();
                    parts.push(extra.dimmed().to_string());
                }
                parts.join(" ")
            }
            SinkEntry::Exception(report) => {
                let mut parts = vec!["EXCEPTION".red().bold().to_string(), report.error.to_string()];
                push_tags(&mut parts, &report.envelope.tags);
                if !report.extra.is_empty() {
                    let extra = serde_json::to_string(&report.extra).unwrap_or_default();
                    parts.push(extra.dimmed().to_string());
                }
                parts.join(" ")
            }
            SinkEntry::User(user) => format!("{} {}", "USER".cyan(), user.email),
            SinkEntry::Attachment { filename, size } => {
                format!("{} {} ({} bytes)", "ATTACH".blue(), filename, size)
            }
            SinkEntry::ClearAttachments => format!("{} cleared", "ATTACH".blue()),
            SinkEntry::StartBuffering => format!("{} buffering", "REPLAY".magenta()),
            SinkEntry::Flush => format!("{} flush", "REPLAY".magenta()),
            SinkEntry::Stop => format!("{} stop", "REPLAY".magenta()),
        };

        format!("{} {}", time.dimmed(), body)
    }

    /// Message text for records, empty otherwise
    pub fn message(&self) -> &str {
        match self {
            SinkEntry::Event(record) => &record.message,
            SinkEntry::Exception(report) => &report.error.message,
            _ => "",
        }
    }
}

fn push_tags(parts: &mut Vec<String>, tags: &Tags) {
    if tags.is_empty() {
        return;
    }
    let rendered: Vec<String> = tags.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    parts.push(format!("[{}]", rendered.join(" ")).dimmed().to_string());
}

/// An entry as persisted by the file and HTTP sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEntry {
    pub at: DateTime<Utc>,
    pub entry: SinkEntry,
}

impl LoggedEntry {
    pub fn now(entry: SinkEntry) -> Self {
        Self { at: Utc::now(), entry }
    }
}

/// Destination for telemetry.
///
/// Every operation funnels into [`TelemetrySink::deliver`] unless a sink
/// overrides it. `flush` and `stop` return only once delivery has completed.
pub trait TelemetrySink: Send + Sync {
    fn name(&self) -> &str;

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError>;

    fn capture_event(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        self.deliver(SinkEntry::Event(record.clone()))
    }

    fn capture_exception(&self, report: &ExceptionReport) -> Result<(), SinkError> {
        self.deliver(SinkEntry::Exception(report.clone()))
    }

    fn set_user(&self, user: &UserIdentity) -> Result<(), SinkError> {
        self.deliver(SinkEntry::User(user.clone()))
    }

    fn add_attachment(&self, attachment: &Attachment) -> Result<(), SinkError> {
        self.deliver(SinkEntry::Attachment {
            filename: attachment.filename.clone(),
            size: attachment.data.len(),
        })
    }

    fn clear_attachments(&self) -> Result<(), SinkError> {
        self.deliver(SinkEntry::ClearAttachments)
    }

    fn start_buffering(&self) -> Result<(), SinkError> {
        self.deliver(SinkEntry::StartBuffering)
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.deliver(SinkEntry::Flush)
    }

    fn stop(&self) -> Result<(), SinkError> {
        self.deliver(SinkEntry::Stop)
    }
}

/// Build the configured sink, degrading to a no-op sink when nothing usable is configured
pub fn from_config(config: &SinkConfig, timeout: Duration) -> Arc<dyn TelemetrySink> {
    if let Some(reason) = &config.rejected {
        log::warn!("Unreadable sink configuration ({}), using no-op sink", reason);
        return Arc::new(NoopSink);
    }

    if !config.enabled {
        log::warn!("Telemetry sink disabled in config, using no-op sink");
        return Arc::new(NoopSink);
    }

    let mut sinks: Vec<Arc<dyn TelemetrySink>> = Vec::new();

    for kind in &config.sinks {
        match kind {
            SinkKind::Stdout => sinks.push(Arc::new(StdoutSink)),
            SinkKind::File => {
                let events_dir = Config::expand_path(&config.events_dir);
                sinks.push(Arc::new(FileSink::new(events_dir)));
            }
            SinkKind::Http => match resolve_endpoint(config) {
                Some(endpoint) => sinks.push(Arc::new(HttpSink::new(endpoint, timeout))),
                None => log::warn!("HTTP sink configured without a valid endpoint, skipping"),
            },
            SinkKind::Unknown(name) => log::warn!("Unknown sink kind '{}', skipping", name),
        }
    }

    match sinks.len() {
        0 => {
            log::warn!("No usable telemetry sink configured, using no-op sink");
            Arc::new(NoopSink)
        }
        1 => sinks.remove(0),
        _ => Arc::new(FanoutSink::new(sinks)),
    }
}

/// `$TRIPWIRE_DSN` wins over the configured endpoint; only http(s) URLs are accepted
fn resolve_endpoint(config: &SinkConfig) -> Option<String> {
    let endpoint = std::env::var(DSN_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| config.endpoint.clone())?;

    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Some(endpoint)
    } else {
        log::warn!("Ignoring telemetry endpoint '{}': not an http(s) URL", endpoint);
        None
    }
}
