//! Observe entries written by the file sink
//!
//! Shows the most recent entries, then optionally tails today's file, similar
//! to `tail -f`.

use chrono::Local;
use colored::*;
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::{Config, SinkKind};
use crate::sink::LoggedEntry;
use crate::sink::file::log_file_for;

/// Run the observe command
pub fn run(filter: Option<&str>, last: usize, follow: bool, config: &Config) -> Result<()> {
    let events_dir = Config::expand_path(&config.sink.events_dir);

    if !config.sink.sinks.contains(&SinkKind::File) {
        println!(
            "{} The file sink is not enabled; add `file` to sink.sinks to record entries",
            "⚠".yellow()
        );
    }

    if let Some(f) = filter {
        println!("  Filter: {}", f.cyan());
    }

    if last > 0 {
        show_recent_entries(&events_dir, last, filter)?;
    }

    if follow {
        println!("{}", "--- Live tail (Ctrl+C to stop) ---".dimmed());
        tail_entries(&events_dir, filter)?;
    }

    Ok(())
}

/// Match on entry type or message text
fn matches(logged: &LoggedEntry, filter: Option<&str>) -> bool {
    match filter {
        Some(f) => {
            let f = f.to_lowercase();
            logged.entry.type_name().contains(&f) || logged.entry.message().to_lowercase().contains(&f)
        }
        None => true,
    }
}

/// Parse every entry in `log_file` that passes `filter`; unparseable lines are skipped
fn read_entries(log_file: &Path, filter: Option<&str>) -> Vec<LoggedEntry> {
    let Ok(content) = fs::read_to_string(log_file) else {
        return Vec::new();
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<LoggedEntry>(line).ok())
        .filter(|logged| matches(logged, filter))
        .collect()
}

/// Show the last N entries from yesterday's and today's files
fn show_recent_entries(events_dir: &Path, count: usize, filter: Option<&str>) -> Result<()> {
    let today = Local::now();
    let yesterday = today - chrono::Duration::days(1);

    let mut all_entries = Vec::new();
    for date in [yesterday, today] {
        all_entries.extend(read_entries(&log_file_for(events_dir, date), filter));
    }

    if all_entries.is_empty() {
        println!("  {}", "(no entries)".dimmed());
        return Ok(());
    }

    let start = all_entries.len().saturating_sub(count);
    for logged in &all_entries[start..] {
        println!("{}", logged.entry.format_display(logged.at));
    }

    Ok(())
}

/// Tail the current day's file
fn tail_entries(events_dir: &Path, filter: Option<&str>) -> Result<()> {
    loop {
        let today = Local::now();
        let log_file = log_file_for(events_dir, today);

        if !log_file.exists() {
            // Wait for file to be created
            thread::sleep(Duration::from_secs(1));
            continue;
        }

        let file = File::open(&log_file).context("Failed to open events file")?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::End(0))?;

        let mut line = String::new();
        loop {
            match reader.read_line(&mut line) {
                Ok(0) => {
                    thread::sleep(Duration::from_millis(100));

                    // Crossed midnight, switch to the new file
                    if Local::now().date_naive() != today.date_naive() {
                        break;
                    }
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty()
                        && let Ok(logged) = serde_json::from_str::<LoggedEntry>(trimmed)
                        && matches(&logged, filter)
                    {
                        println!("{}", logged.entry.format_display(logged.at));
                    }
                    line.clear();
                }
                Err(e) => {
                    log::warn!("Error reading events file: {}", e);
                    thread::sleep(Duration::from_secs(1));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{FileSink, TelemetrySink};
    use crate::telemetry::record::Extra;
    use crate::telemetry::{ErrorInfo, ExceptionReport, Level, TelemetryRecord};
    use tempfile::TempDir;

    #[test]
    fn test_read_entries_applies_filter() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().to_path_buf());
        sink.capture_event(&TelemetryRecord::new(Level::Info, "hello")).unwrap();
        sink.capture_exception(&ExceptionReport::new(ErrorInfo::new("URIError", "bad"), Extra::new()))
            .unwrap();

        let log_file = log_file_for(temp.path(), Local::now());
        assert_eq!(read_entries(&log_file, None).len(), 2);

        let exceptions = read_entries(&log_file, Some("EXCEPTION"));
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].entry.message(), "bad");
    }

    #[test]
    fn test_read_entries_skips_garbage_and_missing_files() {
        let temp = TempDir::new().unwrap();
        let log_file = temp.path().join("events.jsonl");
        assert!(read_entries(&log_file, None).is_empty());

        fs::write(&log_file, "not json\n\n").unwrap();
        assert!(read_entries(&log_file, None).is_empty());
    }
}
