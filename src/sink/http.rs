//! Sink that POSTs each entry as JSON to an endpoint

use std::time::Duration;

use super::{LoggedEntry, SinkEntry, SinkError, TelemetrySink};

pub struct HttpSink {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpSink {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
        Self {
            endpoint,
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl TelemetrySink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        let body = serde_json::to_string(&LoggedEntry::now(entry))?;

        self.agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|e| SinkError::Http(format!("{}: {}", self.endpoint, e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{Level, TelemetryRecord};

    #[test]
    fn test_unreachable_endpoint_is_an_error_not_a_panic() {
        // Port 9 (discard) is closed on any sane test host
        let sink = HttpSink::new("http://127.0.0.1:9/ingest".to_string(), Duration::from_secs(2));
        let result = sink.capture_event(&TelemetryRecord::new(Level::Info, "lost"));
        assert!(matches!(result, Err(SinkError::Http(_))));
    }
}
