//! Integration tests for the tripwire binary
//!
//! Each test runs the built binary against an isolated TRIPWIRE_DIR, so no
//! user configuration or event files leak in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the tripwire binary path
fn tripwire_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/tripwire
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("tripwire");
    path
}

/// Helper to run tripwire with an isolated directory
fn run_tripwire(dir: &Path, args: &[&str]) -> Output {
    Command::new(tripwire_binary())
        .env("TRIPWIRE_DIR", dir)
        .env("NO_COLOR", "1")
        .env_remove("TRIPWIRE_CONFIG")
        .env_remove("TRIPWIRE_DSN")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute tripwire")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Write a config pointing every network scenario at a closed local port
fn write_unreachable_config(dir: &Path) -> PathBuf {
    let config = r#"
network:
  timeout_secs: 2
  http_error_url: http://127.0.0.1:9/404
  failed_fetch_url: http://127.0.0.1:9/missing
  request_error_url: http://127.0.0.1:9/api
"#;
    let path = dir.join("unreachable.yaml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_list_in_registration_order() {
    let temp = TempDir::new().unwrap();
    // stdout is a pipe here, plain names are still the default
    let output = run_tripwire(temp.path(), &["list"]);
    assert!(output.status.success());

    let listing = stdout(&output);
    let names: Vec<&str> = listing.lines().collect();
    assert_eq!(names.len(), 19);
    assert_eq!(names[0], "throw-syntax-error");
    assert_eq!(names[1], "throw-failed-fetch");
    assert_eq!(names[18], "structured-data");
}

#[test]
fn test_list_json_carries_metadata() {
    let temp = TempDir::new().unwrap();
    let output = run_tripwire(temp.path(), &["list", "-o", "json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let uri = parsed
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "throw-uri-error")
        .unwrap();
    assert_eq!(uri["kind"], "thrown_error");
    assert_eq!(uri["raises"][0], "uri");
    assert_eq!(uri["exit_codes"][0], 11);
}

#[test]
fn test_run_uri_error_reports_then_exits_with_its_code() {
    let temp = TempDir::new().unwrap();
    let output = run_tripwire(temp.path(), &["run", "throw-uri-error"]);

    assert_eq!(output.status.code(), Some(11));
    let out = stdout(&output);
    assert!(out.contains("This is a URI error"));
    assert!(out.contains("error_code=500"));
}

#[test]
fn test_run_unknown_scenario_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_tripwire(temp.path(), &["run", "no-such-scenario"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-scenario"));
}

#[test]
fn test_run_log_info_succeeds() {
    let temp = TempDir::new().unwrap();
    let output = run_tripwire(temp.path(), &["run", "log-info"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Test info log from tripwire"));
}

#[test]
fn test_unusable_sink_config_still_runs() {
    let temp = TempDir::new().unwrap();

    for (name, config) in [
        ("unknown-kind.yaml", "sink:\n  sinks: [kafka]\n"),
        ("malformed.yaml", "sink:\n  enabled: maybe\n"),
    ] {
        let path = temp.path().join(name);
        fs::write(&path, config).unwrap();

        let output = run_tripwire(temp.path(), &["--config", path.to_str().unwrap(), "run", "log-info"]);
        assert_eq!(output.status.code(), Some(0), "config {}", name);
    }

    let log = fs::read_to_string(temp.path().join("logs").join("tripwire.log")).unwrap();
    assert!(log.contains("Unknown sink kind 'kafka'"));
    assert!(log.contains("Unreadable sink configuration"));
}

#[test]
fn test_network_failure_exits_with_network_code() {
    let temp = TempDir::new().unwrap();
    let config = write_unreachable_config(temp.path());
    let output = run_tripwire(
        temp.path(),
        &["--config", config.to_str().unwrap(), "run", "request-error"],
    );

    assert_eq!(output.status.code(), Some(15));
    assert!(stdout(&output).contains("Simulated error: request failed."));
}

#[test]
fn test_smoke_runs_log_scenarios() {
    let temp = TempDir::new().unwrap();
    let output = run_tripwire(temp.path(), &["smoke"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("log-debug"));
    assert!(out.contains("structured-data"));
}

#[test]
fn test_file_sink_feeds_observe() {
    let temp = TempDir::new().unwrap();
    let events_dir = temp.path().join("events");
    let config = format!(
        "sink:\n  sinks: [file]\n  events_dir: {}\n",
        events_dir.display()
    );
    let config_path = temp.path().join("file-sink.yaml");
    fs::write(&config_path, config).unwrap();
    let config_arg = config_path.to_str().unwrap();

    let output = run_tripwire(temp.path(), &["--config", config_arg, "run", "throw-syntax-error"]);
    assert_eq!(output.status.code(), Some(10));

    let output = run_tripwire(
        temp.path(),
        &["--config", config_arg, "observe", "--filter", "exception"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("This is a syntax error"));
}

#[test]
fn test_config_set_then_get() {
    let temp = TempDir::new().unwrap();

    let output = run_tripwire(temp.path(), &["config", "set", "client.environment", "staging"]);
    assert!(output.status.success());
    assert!(temp.path().join("tripwire.yaml").exists());

    let output = run_tripwire(temp.path(), &["config", "get", "client.environment"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "staging");
}
