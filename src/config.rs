use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::telemetry::Tags;

/// Main tripwire configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub client: ClientConfig,
    #[serde(deserialize_with = "lenient_sink")]
    pub sink: SinkConfig,
    /// Tags set on the scope at startup
    pub tags: Tags,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub environment: String,
    pub release: String,
    /// Log every outgoing record at debug level
    pub debug: bool,
}

/// Telemetry sink type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum SinkKind {
    /// Print to stdout
    Stdout,
    /// Append to JSONL files under `events_dir`
    File,
    /// POST to `endpoint`
    Http,
    /// Unrecognized name, skipped when the sink is built
    Unknown(String),
}

impl SinkKind {
    pub fn as_str(&self) -> &str {
        match self {
            SinkKind::Stdout => "stdout",
            SinkKind::File => "file",
            SinkKind::Http => "http",
            SinkKind::Unknown(name) => name,
        }
    }
}

impl From<String> for SinkKind {
    fn from(name: String) -> Self {
        match name.to_lowercase().as_str() {
            "stdout" => SinkKind::Stdout,
            "file" => SinkKind::File,
            "http" => SinkKind::Http,
            _ => SinkKind::Unknown(name),
        }
    }
}

impl From<SinkKind> for String {
    fn from(kind: SinkKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub enabled: bool,
    pub sinks: Vec<SinkKind>,
    /// HTTP endpoint for the http sink (`$TRIPWIRE_DSN` overrides)
    pub endpoint: Option<String>,
    pub events_dir: PathBuf,
    /// Why the configured section was unreadable, if it was
    #[serde(skip)]
    pub rejected: Option<String>,
}

impl SinkConfig {
    /// Stand-in for a section that failed to parse; builds a no-op sink
    fn unreadable(reason: String) -> Self {
        Self {
            sinks: Vec::new(),
            rejected: Some(reason),
            ..Self::default()
        }
    }
}

/// A malformed `sink` section must not stop scenarios from running
fn lenient_sink<'de, D>(deserializer: D) -> std::result::Result<SinkConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(serde_yaml::from_value(value).unwrap_or_else(|e| SinkConfig::unreadable(e.to_string())))
}

/// Targets the network scenarios hit
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
    pub http_error_url: String,
    pub failed_fetch_url: String,
    pub request_error_url: String,
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            client: ClientConfig::default(),
            sink: SinkConfig::default(),
            tags: Tags::from([("harness".to_string(), "tripwire".to_string())]),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            release: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sinks: vec![SinkKind::Stdout],
            endpoint: None,
            events_dir: Config::data_dir().join("events"),
            rejected: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            http_error_url: "https://httpstat.us/404".to_string(),
            failed_fetch_url: "https://example.com/this-endpoint-does-not-exist".to_string(),
            request_error_url: "https://example.com/api/nonexistent-endpoint".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check TRIPWIRE_CONFIG env var
        if let Ok(env_path) = std::env::var("TRIPWIRE_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from TRIPWIRE_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try TRIPWIRE_DIR/tripwire.yaml, then ~/.config/tripwire/tripwire.yaml
        let path = Self::tripwire_dir().join("tripwire.yaml");
        if path.exists() {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // Try ./tripwire.yaml (for development)
        let local_config = PathBuf::from("tripwire.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Where the config file lives
    pub fn tripwire_dir() -> PathBuf {
        std::env::var("TRIPWIRE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("tripwire"))
    }

    /// Where logs and file-sink events live
    pub fn data_dir() -> PathBuf {
        std::env::var("TRIPWIRE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("tripwire"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
