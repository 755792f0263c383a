//! Smoke run over every log-emission scenario

use colored::*;
use eyre::Result;

use super::run::runtime;
use crate::config::Config;
use crate::harness::Harness;
use crate::scenario::{RunError, ScenarioKind, ScenarioRegistry, Supervisor};

/// Returns the exit code of the first failure, or 0
pub fn run(quiet: bool, config: &Config) -> Result<i32> {
    let registry = ScenarioRegistry::builtin();
    let harness = Harness::from_config(config);
    let supervisor = Supervisor::new(&registry, &harness);
    let runtime = runtime()?;

    if !quiet {
        let client = harness.target().client();
        println!(
            "{} Smoke testing sink '{}' ({})",
            "→".blue(),
            client.sink_name().cyan(),
            client.options().environment.as_deref().unwrap_or("no environment")
        );
    }

    let mut exit_code = 0;
    let mut ran = 0;

    for scenario in registry.iter().filter(|s| s.kind() == ScenarioKind::LogEmission) {
        ran += 1;
        match runtime.block_on(supervisor.run(scenario.name())) {
            Ok(()) => {
                if !quiet {
                    println!("  {} {}", "✓".green(), scenario.name());
                }
            }
            Err(RunError::Scenario(e)) => {
                eprintln!("  {} {} raised {}", "✗".red(), scenario.name(), e);
                if exit_code == 0 {
                    exit_code = e.exit_code();
                }
            }
            Err(RunError::Registry(e)) => return Err(e.into()),
        }
    }

    log::info!("Smoke run finished: {} scenarios, exit code {}", ran, exit_code);
    if !quiet && exit_code == 0 {
        println!("{} {} scenarios completed", "✓".green(), ran);
    }
    Ok(exit_code)
}
