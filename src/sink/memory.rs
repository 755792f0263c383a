//! In-memory recording sink for tests

use std::sync::{Mutex, PoisonError};

use super::{SinkEntry, SinkError, TelemetrySink};
use crate::telemetry::{ExceptionReport, TelemetryRecord, UserIdentity};

#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<SinkEntry>>,
    reject_events: bool,
    unavailable: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every `capture_event`, records everything else
    pub fn rejecting_events() -> Self {
        Self {
            reject_events: true,
            ..Self::default()
        }
    }

    /// Fails every interaction
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<SinkEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn events(&self) -> Vec<TelemetryRecord> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                SinkEntry::Event(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn exceptions(&self) -> Vec<ExceptionReport> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                SinkEntry::Exception(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    pub fn users(&self) -> Vec<UserIdentity> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                SinkEntry::User(user) => Some(user),
                _ => None,
            })
            .collect()
    }
}

impl TelemetrySink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        if self.unavailable {
            return Err(SinkError::Unavailable("memory sink is unavailable".to_string()));
        }
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
        Ok(())
    }

    fn capture_event(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        if self.reject_events {
            return Err(SinkError::Unavailable("events are rejected".to_string()));
        }
        self.deliver(SinkEntry::Event(record.clone()))
    }
}
