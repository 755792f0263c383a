//! Delivers every entry to several sinks

use std::sync::Arc;

use super::{SinkEntry, SinkError, TelemetrySink};
use crate::telemetry::{Attachment, ExceptionReport, TelemetryRecord, UserIdentity};

pub struct FanoutSink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self { sinks }
    }

    /// A failing sink does not stop delivery to the rest; the first error is returned
    fn each<F>(&self, what: &str, op: F) -> Result<(), SinkError>
    where
        F: Fn(&dyn TelemetrySink) -> Result<(), SinkError>,
    {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = op(sink.as_ref()) {
                log::warn!("Sink '{}' failed to deliver {}: {}", sink.name(), what, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TelemetrySink for FanoutSink {
    fn name(&self) -> &str {
        "fanout"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        self.each(entry.type_name(), |sink| sink.deliver(entry.clone()))
    }

    fn capture_event(&self, record: &TelemetryRecord) -> Result<(), SinkError> {
        self.each("event", |sink| sink.capture_event(record))
    }

    fn capture_exception(&self, report: &ExceptionReport) -> Result<(), SinkError> {
        self.each("exception", |sink| sink.capture_exception(report))
    }

    fn set_user(&self, user: &UserIdentity) -> Result<(), SinkError> {
        self.each("user", |sink| sink.set_user(user))
    }

    fn add_attachment(&self, attachment: &Attachment) -> Result<(), SinkError> {
        self.each("attachment", |sink| sink.add_attachment(attachment))
    }

    fn clear_attachments(&self) -> Result<(), SinkError> {
        self.each("clear_attachments", |sink| sink.clear_attachments())
    }

    fn start_buffering(&self) -> Result<(), SinkError> {
        self.each("start_buffering", |sink| sink.start_buffering())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.each("flush", |sink| sink.flush())
    }

    fn stop(&self) -> Result<(), SinkError> {
        self.each("stop", |sink| sink.stop())
    }
}
