//! Scenario listing command

use eyre::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::scenario::{FailureKind, Scenario, ScenarioKind, ScenarioRegistry};

#[derive(Serialize)]
struct ScenarioSummary<'a> {
    name: &'a str,
    kind: ScenarioKind,
    raises: &'a [FailureKind],
    exit_codes: Vec<i32>,
    description: &'a str,
}

impl<'a> From<&'a Scenario> for ScenarioSummary<'a> {
    fn from(scenario: &'a Scenario) -> Self {
        Self {
            name: scenario.name(),
            kind: scenario.kind(),
            raises: scenario.raises(),
            exit_codes: scenario.raises().iter().map(FailureKind::exit_code).collect(),
            description: scenario.description(),
        }
    }
}

pub fn run(format: OutputFormat) -> Result<()> {
    let registry = ScenarioRegistry::builtin();

    match format {
        OutputFormat::Text => {
            for name in registry.list() {
                println!("{}", name);
            }
        }
        OutputFormat::Json => {
            let summaries: Vec<ScenarioSummary> = registry.iter().map(ScenarioSummary::from).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Yaml => {
            let summaries: Vec<ScenarioSummary> = registry.iter().map(ScenarioSummary::from).collect();
            println!("{}", serde_yaml::to_string(&summaries)?);
        }
    }

    log::debug!("Listed {} scenarios", registry.len());
    Ok(())
}
