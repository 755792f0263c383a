//! Scenario catalog
//!
//! A scenario is a named action over the [`Harness`]. Most of them raise on
//! purpose after reporting; the registry hands that failure back unmodified.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub mod builtin;
pub mod error;
pub mod supervisor;

pub use error::{FailureKind, RegistryError, RunError, ScenarioError};
pub use supervisor::Supervisor;

use crate::harness::Harness;

pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ScenarioError>> + 'a>>;

pub type Action = Box<dyn for<'a> Fn(&'a Harness) -> ScenarioFuture<'a> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ThrownError,
    RejectedPromise,
    NetworkFailure,
    LogEmission,
    SessionControl,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioKind::ThrownError => "thrown-error",
            ScenarioKind::RejectedPromise => "rejected-promise",
            ScenarioKind::NetworkFailure => "network-failure",
            ScenarioKind::LogEmission => "log-emission",
            ScenarioKind::SessionControl => "session-control",
        };
        f.write_str(name)
    }
}

pub struct Scenario {
    name: String,
    kind: ScenarioKind,
    raises: Vec<FailureKind>,
    description: String,
    action: Action,
}

impl Scenario {
    pub fn new<F>(name: impl Into<String>, kind: ScenarioKind, action: F) -> Self
    where
        F: for<'a> Fn(&'a Harness) -> ScenarioFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            raises: Vec::new(),
            description: String::new(),
            action: Box::new(action),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Failure kinds this scenario may raise
    pub fn raising(mut self, kinds: &[FailureKind]) -> Self {
        self.raises = kinds.to_vec();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn raises(&self) -> &[FailureKind] {
        &self.raises
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("raises", &self.raises)
            .finish_non_exhaustive()
    }
}

/// Scenarios in registration order
#[derive(Debug, Default)]
pub struct ScenarioRegistry {
    scenarios: IndexMap<String, Scenario>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every scenario this harness ships with
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    pub fn register<F>(&mut self, name: &str, kind: ScenarioKind, action: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a Harness) -> ScenarioFuture<'a> + Send + Sync + 'static,
    {
        self.add(Scenario::new(name, kind, action))
    }

    pub fn add(&mut self, scenario: Scenario) -> Result<(), RegistryError> {
        if self.scenarios.contains_key(scenario.name()) {
            return Err(RegistryError::Duplicate(scenario.name().to_string()));
        }
        self.scenarios.insert(scenario.name().to_string(), scenario);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.get(name)
    }

    /// Scenario names in registration order; call again to start over
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> + '_ {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub async fn run(&self, name: &str, harness: &Harness) -> Result<(), RunError> {
        let scenario = self
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;

        log::info!("Running scenario '{}' ({})", scenario.name(), scenario.kind());
        let outcome = (scenario.action)(harness).await;

        if let Err(e) = &outcome {
            log::info!("Scenario '{}' raised: {}", scenario.name(), e);
        }
        outcome.map_err(RunError::from)
    }
}
