//! Trigger a single scenario

use colored::*;
use eyre::{Context, Result};

use crate::config::Config;
use crate::harness::Harness;
use crate::scenario::{RunError, ScenarioRegistry, Supervisor};

/// Build the single-threaded runtime scenarios run on
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Returns 0 on completion, or the exit code of the raised failure
pub fn run(name: &str, quiet: bool, config: &Config) -> Result<i32> {
    let registry = ScenarioRegistry::builtin();
    if registry.get(name).is_none() {
        eyre::bail!("Unknown scenario '{}' (see `tripwire list`)", name);
    }

    let harness = Harness::from_config(config);
    let runtime = runtime()?;
    let outcome = runtime.block_on(Supervisor::new(&registry, &harness).run(name));

    match outcome {
        Ok(()) => {
            if !quiet {
                println!("{} {} completed", "✓".green(), name.cyan());
            }
            Ok(0)
        }
        Err(RunError::Scenario(e)) => {
            eprintln!("{} {} raised {}", "✗".red(), name.cyan(), e);
            Ok(e.exit_code())
        }
        Err(RunError::Registry(e)) => Err(e.into()),
    }
}
