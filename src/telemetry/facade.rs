//! Uniform logging and capture API
//!
//! The facade holds no data of its own. Every call builds a fresh record and
//! sends it through the scope, so scope context is merged at call time.
//! Nothing here returns an error: sink failures are logged and dropped.

use serde_json::Value;
use std::sync::Arc;

use super::exception::Thrown;
use super::record::{CaptureContext, Level, TelemetryRecord, into_extra};
use super::target::Scope;

#[derive(Clone)]
pub struct TelemetryFacade {
    scope: Arc<Scope>,
}

impl TelemetryFacade {
    pub fn new(scope: Arc<Scope>) -> Self {
        Self { scope }
    }

    pub fn log_info(&self, message: &str, data: Value) {
        self.log(Level::Info, message, data);
    }

    pub fn log_warn(&self, message: &str, data: Value) {
        self.log(Level::Warning, message, data);
    }

    pub fn log_debug(&self, message: &str, data: Value) {
        self.log(Level::Debug, message, data);
    }

    /// With an `error`, this captures it as an exception first, then emits the record
    pub fn log_error(&self, message: &str, error: Option<Thrown>, data: Value) {
        let mut record = TelemetryRecord::new(Level::Error, message).with_extra(into_extra(data));
        if let Some(error) = error {
            let (info, extra) = error.normalize();
            self.scope.capture_exception(info.clone(), CaptureContext::new().extra(extra));
            record = record.with_error(info);
        }
        self.scope.capture_event(record);
    }

    pub fn capture_exception(&self, error: impl Into<Thrown>, context: CaptureContext) {
        self.scope.capture_exception(error, context);
    }

    pub fn capture_event(&self, record: TelemetryRecord) {
        self.scope.capture_event(record);
    }

    fn log(&self, level: Level, message: &str, data: Value) {
        let record = TelemetryRecord::new(level, message).with_extra(into_extra(data));
        self.scope.capture_event(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkEntry;
    use crate::sink::memory::MemorySink;
    use crate::telemetry::{ClientOptions, SinkTarget, Tags};
    use serde_json::json;

    fn facade_with(sink: Arc<MemorySink>) -> TelemetryFacade {
        let target = SinkTarget::init(ClientOptions::default(), sink, &Tags::new());
        TelemetryFacade::new(Arc::clone(target.scope()))
    }

    #[test]
    fn test_leveled_logs_map_to_levels() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        facade.log_debug("d", json!({}));
        facade.log_info("i", json!({}));
        facade.log_warn("w", json!({}));

        let levels: Vec<Level> = sink.events().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![Level::Debug, Level::Info, Level::Warning]);
    }

    #[test]
    fn test_log_info_carries_data_as_extra() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        facade.log_info("User action performed", json!({"action": "button_click", "dataSize": 1024}));

        let record = &sink.events()[0];
        assert_eq!(record.message, "User action performed");
        assert_eq!(record.extra["action"], json!("button_click"));
        assert_eq!(record.extra["dataSize"], json!(1024));
    }

    #[test]
    fn test_log_error_with_error_makes_two_interactions() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        facade.log_error(
            "API call failed",
            Some(Thrown::error("Error", "API Error: 404 - Not found")),
            json!({"statusCode": 404}),
        );

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        match (&entries[0], &entries[1]) {
            (SinkEntry::Exception(report), SinkEntry::Event(record)) => {
                assert_eq!(report.error.message, "API Error: 404 - Not found");
                assert_eq!(record.level, Level::Error);
                assert_eq!(record.extra["statusCode"], json!(404));
                assert_eq!(record.error.as_ref().map(|e| e.message.as_str()), Some("API Error: 404 - Not found"));
            }
            other => panic!("unexpected entries: {:?}", other),
        }
    }

    #[test]
    fn test_log_error_without_error_makes_one_interaction() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        facade.log_error("plain failure", None, json!({}));

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].level, Level::Error);
    }

    #[test]
    fn test_logs_never_raise_when_sink_rejects_events() {
        let sink = Arc::new(MemorySink::rejecting_events());
        let facade = facade_with(sink.clone());

        facade.log_info("info", json!({}));
        facade.log_warn("warn", json!({}));
        facade.log_debug("debug", json!({}));

        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_identical_calls_produce_distinct_records() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        facade.log_info("same", json!({"k": 1}));
        facade.log_info("same", json!({"k": 1}));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_ne!(events[0].envelope.event_id, events[1].envelope.event_id);
    }

    #[test]
    fn test_capture_event_forwards_verbatim() {
        let sink = Arc::new(MemorySink::new());
        let facade = facade_with(sink.clone());

        let record = TelemetryRecord::new(Level::Warning, "prebuilt").with_extra(into_extra(json!({"a": true})));
        let id = record.envelope.event_id;
        facade.capture_event(record);

        let sent = &sink.events()[0];
        assert_eq!(sent.envelope.event_id, id);
        assert_eq!(sent.level, Level::Warning);
        assert_eq!(sent.extra["a"], json!(true));
    }
}
