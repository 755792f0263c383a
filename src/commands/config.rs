use colored::*;
use eyre::{Context, Result};
use std::fs;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::{Config, LogLevel, SinkKind};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Tripwire Configuration".bold());
            println!();

            println!("{}:", "client".cyan());
            println!("  environment: {}", config.client.environment);
            println!("  release: {}", config.client.release);
            println!("  debug: {}", config.client.debug);
            println!();

            println!("{}:", "sink".cyan());
            println!("  enabled: {}", config.sink.enabled);
            let sinks: Vec<String> = config.sink.sinks.iter().map(SinkKind::to_string).collect();
            println!("  sinks: {}", sinks.join(", "));
            println!("  endpoint: {}", config.sink.endpoint.as_deref().unwrap_or("-"));
            println!("  events_dir: {}", config.sink.events_dir.display());
            println!();

            println!("{}:", "tags".cyan());
            for (key, value) in &config.tags {
                println!("  {}: {}", key, value);
            }
            println!();

            println!("{}:", "network".cyan());
            println!("  timeout_secs: {}", config.network.timeout_secs);
            println!("  http_error_url: {}", config.network.http_error_url);
            println!("  failed_fetch_url: {}", config.network.failed_fetch_url);
            println!("  request_error_url: {}", config.network.request_error_url);
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    if let Some(tag) = key.strip_prefix("tags.") {
        return config.tags.get(tag).cloned();
    }

    match key {
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        "client.environment" => Some(config.client.environment.clone()),
        "client.release" => Some(config.client.release.clone()),
        "client.debug" => Some(config.client.debug.to_string()),
        "sink.enabled" => Some(config.sink.enabled.to_string()),
        "sink.endpoint" => config.sink.endpoint.clone(),
        "sink.events_dir" => Some(config.sink.events_dir.display().to_string()),
        "network.timeout_secs" => Some(config.network.timeout_secs.to_string()),
        "network.http_error_url" => Some(config.network.http_error_url.clone()),
        "network.failed_fetch_url" => Some(config.network.failed_fetch_url.clone()),
        "network.request_error_url" => Some(config.network.request_error_url.clone()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

fn apply(key: &str, value: &str, config: &mut Config) -> Result<()> {
    if let Some(tag) = key.strip_prefix("tags.") {
        config.tags.insert(tag.to_string(), value.to_string());
        return Ok(());
    }

    match key {
        "log_level" | "log-level" => {
            config.log_level = serde_yaml::from_str::<LogLevel>(value).context("Invalid log level")?;
        }
        "client.environment" => config.client.environment = value.to_string(),
        "client.release" => config.client.release = value.to_string(),
        "client.debug" => {
            config.client.debug = value.parse().context("Invalid boolean value (use 'true' or 'false')")?;
        }
        "sink.enabled" => {
            config.sink.enabled = value.parse().context("Invalid boolean value (use 'true' or 'false')")?;
        }
        "sink.endpoint" => config.sink.endpoint = Some(value.to_string()).filter(|v| !v.is_empty()),
        "sink.events_dir" => config.sink.events_dir = value.into(),
        "network.timeout_secs" => {
            config.network.timeout_secs = value.parse().context("Invalid number of seconds")?;
        }
        "network.http_error_url" => config.network.http_error_url = value.to_string(),
        "network.failed_fetch_url" => config.network.failed_fetch_url = value.to_string(),
        "network.request_error_url" => config.network.request_error_url = value.to_string(),
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let mut new_config = config.clone();
    apply(key, value, &mut new_config)?;

    let config_path = Config::tripwire_dir().join("tripwire.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_lookup() {
        let mut config = Config::default();
        apply("network.timeout_secs", "3", &mut config).unwrap();
        apply("tags.type", "test1 test2", &mut config).unwrap();
        apply("log_level", "debug", &mut config).unwrap();

        assert_eq!(lookup("network.timeout_secs", &config).as_deref(), Some("3"));
        assert_eq!(lookup("tags.type", &config).as_deref(), Some("test1 test2"));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply("client.debug", "maybe", &mut config).is_err());
        assert!(apply("no.such.key", "x", &mut config).is_err());
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(lookup("paths.plugins", &Config::default()).is_none());
    }
}
