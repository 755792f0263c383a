//! Sink that accepts and discards everything

use super::{SinkEntry, SinkError, TelemetrySink};

/// Used when no usable sink is configured
#[derive(Debug, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn name(&self) -> &str {
        "noop"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        log::debug!("noop sink dropped {}", entry.type_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Level, TelemetryRecord};

    #[test]
    fn test_noop_accepts_everything() {
        let sink = NoopSink;
        assert!(sink.capture_event(&TelemetryRecord::new(Level::Info, "dropped")).is_ok());
        assert!(sink.flush().is_ok());
        assert!(sink.stop().is_ok());
    }
}
