//! Sink that prints entries to stdout

use chrono::Utc;

use super::{SinkEntry, SinkError, TelemetrySink};

#[derive(Debug, Default)]
pub struct StdoutSink;

impl TelemetrySink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        println!("{}", entry.format_display(Utc::now()));
        Ok(())
    }
}
