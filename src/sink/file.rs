//! JSONL file sink
//!
//! Entries are appended to `<events_dir>/YYYY-MM/YYYY-MM-DD.jsonl`, one
//! [`LoggedEntry`] per line.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{LoggedEntry, SinkEntry, SinkError, TelemetrySink};

pub struct FileSink {
    events_dir: PathBuf,
}

impl FileSink {
    pub fn new(events_dir: PathBuf) -> Self {
        Self { events_dir }
    }
}

/// Path of the log file holding entries for `date`
pub fn log_file_for(events_dir: &Path, date: DateTime<Local>) -> PathBuf {
    events_dir
        .join(date.format("%Y-%m").to_string())
        .join(format!("{}.jsonl", date.format("%Y-%m-%d")))
}

impl TelemetrySink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn deliver(&self, entry: SinkEntry) -> Result<(), SinkError> {
        let log_file = log_file_for(&self.events_dir, Local::now());
        if let Some(parent) = log_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&LoggedEntry::now(entry))?;

        let mut file = OpenOptions::new().create(true).append(true).open(&log_file)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}
