//! Runs a scenario and records what it raised
//!
//! The failure has already been captured by the scenario itself. The
//! supervisor only attaches a summary of it to the scope so later records
//! carry it, then returns the error untouched.

use serde::Serialize;

use super::{FailureKind, RunError, ScenarioError, ScenarioRegistry};
use crate::harness::Harness;
use crate::telemetry::Attachment;

pub const ERROR_INFO_ATTACHMENT: &str = "error-info.json";

#[derive(Debug, Serialize)]
struct ErrorSummary<'a> {
    scenario: &'a str,
    kind: FailureKind,
    exit_code: i32,
    message: String,
}

pub struct Supervisor<'a> {
    registry: &'a ScenarioRegistry,
    harness: &'a Harness,
}

impl<'a> Supervisor<'a> {
    pub fn new(registry: &'a ScenarioRegistry, harness: &'a Harness) -> Self {
        Self { registry, harness }
    }

    pub async fn run(&self, name: &str) -> Result<(), RunError> {
        let outcome = self.registry.run(name, self.harness).await;

        if let Err(RunError::Scenario(e)) = &outcome {
            self.attach_summary(name, e);
        }
        outcome
    }

    fn attach_summary(&self, name: &str, error: &ScenarioError) {
        let summary = ErrorSummary {
            scenario: name,
            kind: error.kind(),
            exit_code: error.exit_code(),
            message: error.message(),
        };

        match serde_json::to_vec_pretty(&summary) {
            Ok(data) => {
                let scope = self.harness.target().scope();
                scope.clear_attachments();
                scope.add_attachment(Attachment::new(ERROR_INFO_ATTACHMENT, data));
            }
            Err(e) => log::warn!("Could not serialize failure summary for '{}': {}", name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::testing::harness;
    use crate::net::stub::StubHttp;
    use crate::sink::SinkEntry;
    use crate::sink::memory::MemorySink;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failure_attaches_summary_without_recapturing() {
        let registry = ScenarioRegistry::builtin();
        let sink = Arc::new(MemorySink::new());
        let harness = harness(sink.clone(), Arc::new(StubHttp::status(200)));

        let err = Supervisor::new(&registry, &harness)
            .run("throw-reference-error")
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Scenario(ScenarioError::Reference(_))));
        assert_eq!(sink.exceptions().len(), 1);
        assert!(
            sink.entries()
                .iter()
                .any(|e| matches!(e, SinkEntry::Attachment { filename, .. } if filename == ERROR_INFO_ATTACHMENT))
        );
        assert_eq!(harness.target().scope().attachments(), vec![ERROR_INFO_ATTACHMENT.to_string()]);
    }

    #[tokio::test]
    async fn test_success_attaches_nothing() {
        let registry = ScenarioRegistry::builtin();
        let sink = Arc::new(MemorySink::new());
        let harness = harness(sink.clone(), Arc::new(StubHttp::status(200)));

        Supervisor::new(&registry, &harness).run("log-warn").await.unwrap();

        assert_eq!(sink.len(), 1);
        assert!(harness.target().scope().attachments().is_empty());
    }
}
