//! Telemetry records and the envelope every outgoing item carries

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use uuid::Uuid;

/// Free-form contextual data attached to a record
pub type Extra = Map<String, Value>;

/// Ordered string tags
pub type Tags = IndexMap<String, String>;

/// Record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to outgoing records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
}

impl UserIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }
}

/// A named blob held on the scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Metadata shared by events and exception reports.
///
/// Identity and timestamp are fixed at creation. Tags, user and attachments
/// are filled in by the scope when the item is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            tags: Tags::new(),
            user: None,
            environment: None,
            release: None,
            attachments: Vec::new(),
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

/// Structured reference to an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorInfo {
    /// Build an error reference, capturing a stack when `RUST_BACKTRACE` allows it
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        let backtrace = Backtrace::capture();
        let stack = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        Self {
            kind: kind.into(),
            message: message.into(),
            stack,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A leveled log/event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub message: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl TelemetryRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            extra: Extra::new(),
            error: None,
            envelope: Envelope::new(),
        }
    }

    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }
}

/// A normalized exception capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionReport {
    pub error: ErrorInfo,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl ExceptionReport {
    pub fn new(error: ErrorInfo, extra: Extra) -> Self {
        Self {
            error,
            extra,
            envelope: Envelope::new(),
        }
    }
}

/// Per-call tags and extra for an exception capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureContext {
    pub tags: Tags,
    pub extra: Extra,
}

impl CaptureContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn extra(mut self, extra: Extra) -> Self {
        self.extra.extend(extra);
        self
    }
}

/// Turn an arbitrary JSON value into an extra map.
///
/// Objects keep their keys, `null` is empty, anything else lands under `value`.
pub fn into_extra(data: Value) -> Extra {
    match data {
        Value::Object(map) => map,
        Value::Null => Extra::new(),
        other => {
            let mut extra = Extra::new();
            extra.insert("value".to_string(), other);
            extra
        }
    }
}
