use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;

mod cli;
mod commands;
mod config;
mod harness;
mod net;
mod scenario;
mod session;
mod sink;
mod telemetry;
mod user;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

/// Log to `<data dir>/logs/tripwire.log`; `RUST_LOG` overrides the configured level
fn setup_logging(log_level: LogLevel) -> Result<()> {
    let log_dir = Config::data_dir().join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("tripwire.log");
    let target = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .context("Failed to open log file")?;

    let from_env = std::env::var("RUST_LOG").is_ok();
    let mut builder = env_logger::Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.into());
    }
    builder.target(env_logger::Target::Pipe(Box::new(target))).init();

    info!(
        "Logging to {} at {} (from {})",
        log_file.display(),
        log_level.as_filter(),
        if from_env { "RUST_LOG" } else { "config" }
    );
    Ok(())
}

/// Returns the process exit code
fn run(cli: Cli, config: Config) -> Result<i32> {
    match cli.command {
        Commands::List { format } => commands::list::run(format.unwrap_or(cli::OutputFormat::Text)).map(|_| 0),
        Commands::Run { scenario } => commands::run::run(&scenario, cli.quiet, &config),
        Commands::Smoke => commands::smoke::run(cli.quiet, &config),
        Commands::Observe { filter, last, follow } => {
            commands::observe::run(filter.as_deref(), last, follow, &config).map(|_| 0)
        }
        Commands::Config { action } => commands::config::run(action, &config).map(|_| 0),
        Commands::Completions { shell } => commands::completions::run(shell).map(|_| 0),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }

    setup_logging(config.log_level).context("Failed to setup logging")?;

    info!("Starting tripwire with config from: {:?}", cli.config);

    let code = run(cli, config).context("Command failed")?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
