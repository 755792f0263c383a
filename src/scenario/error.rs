//! Scenario and registry errors

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::telemetry::{ErrorInfo, Thrown};

/// The failure a scenario deliberately raises
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("URIError: {0}")]
    Uri(String),

    #[error("ReferenceError: {0}")]
    Reference(String),

    #[error("Uncaught {0}")]
    ThrownValue(Value),

    #[error("Error: {message}")]
    Http { status: u16, message: String },

    #[error("Error: {0}")]
    Network(String),
}

/// Failure classes, one exit code each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Syntax,
    Uri,
    Reference,
    ThrownValue,
    Http,
    Network,
}

impl FailureKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::Syntax => 10,
            FailureKind::Uri => 11,
            FailureKind::Reference => 12,
            FailureKind::ThrownValue => 13,
            FailureKind::Http => 14,
            FailureKind::Network => 15,
        }
    }
}

impl ScenarioError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScenarioError::Syntax(_) => FailureKind::Syntax,
            ScenarioError::Uri(_) => FailureKind::Uri,
            ScenarioError::Reference(_) => FailureKind::Reference,
            ScenarioError::ThrownValue(_) => FailureKind::ThrownValue,
            ScenarioError::Http { .. } => FailureKind::Http,
            ScenarioError::Network(_) => FailureKind::Network,
        }
    }

    /// Error class name as the simulated runtime would report it
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScenarioError::Syntax(_) => "SyntaxError",
            ScenarioError::Uri(_) => "URIError",
            ScenarioError::Reference(_) => "ReferenceError",
            ScenarioError::ThrownValue(_) | ScenarioError::Http { .. } | ScenarioError::Network(_) => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScenarioError::Syntax(m) | ScenarioError::Uri(m) | ScenarioError::Reference(m) => m.clone(),
            ScenarioError::ThrownValue(value) => value.to_string(),
            ScenarioError::Http { message, .. } => message.clone(),
            ScenarioError::Network(m) => m.clone(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

impl From<&ScenarioError> for Thrown {
    /// A raised non-error value stays opaque so it gets normalized like any other
    fn from(error: &ScenarioError) -> Self {
        match error {
            ScenarioError::ThrownValue(value) => Thrown::OpaqueValue(value.clone()),
            other => Thrown::ErrorShaped(ErrorInfo::new(other.kind_name(), other.message())),
        }
    }
}

/// Registry misuse
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("scenario '{0}' is already registered")]
    Duplicate(String),

    #[error("unknown scenario '{0}'")]
    Unknown(String),
}

/// Outcome of running a scenario by name
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_display_looks_like_the_simulated_error() {
        let err = ScenarioError::Uri("This is a URI error".to_string());
        assert_eq!(err.to_string(), "URIError: This is a URI error");
        assert_eq!(err.message(), "This is a URI error");
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let kinds = [
            FailureKind::Syntax,
            FailureKind::Uri,
            FailureKind::Reference,
            FailureKind::ThrownValue,
            FailureKind::Http,
            FailureKind::Network,
        ];
        let codes: HashSet<i32> = kinds.iter().map(FailureKind::exit_code).collect();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| *c > 1));
    }

    #[test]
    fn test_thrown_value_stays_opaque() {
        let err = ScenarioError::ThrownValue(json!({"error": "foo"}));
        assert_eq!(Thrown::from(&err), Thrown::OpaqueValue(json!({"error": "foo"})));
    }

    #[test]
    fn test_http_error_is_error_shaped() {
        let err = ScenarioError::Http {
            status: 404,
            message: "HTTP error! Status: 404".to_string(),
        };
        match Thrown::from(&err) {
            Thrown::ErrorShaped(info) => {
                assert_eq!(info.kind, "Error");
                assert!(info.message.contains("404"));
            }
            other => panic!("expected error-shaped, got {:?}", other),
        }
    }
}
