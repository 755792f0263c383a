//! Builtin scenario catalog
//!
//! Failing scenarios report first, tagged `error_code=500`, and then raise.
//! Each failure is captured exactly once.

use chrono::Utc;
use serde_json::{Value, json};
use std::future::Future;

use super::{FailureKind, Scenario, ScenarioError, ScenarioFuture, ScenarioKind, ScenarioRegistry};
use crate::harness::Harness;
use crate::net;
use crate::telemetry::{CaptureContext, ErrorInfo, Level, TelemetryRecord, Thrown};

pub const SYNTAX_ERROR_MESSAGE: &str = "This is a syntax error";
pub const URI_ERROR_MESSAGE: &str = "This is a URI error";
pub const REFERENCE_ERROR_MESSAGE: &str = "nonExistentVariable is not defined";
pub const REQUEST_ERROR_MESSAGE: &str = "Simulated error: request failed.";
pub const REJECTION_MESSAGE: &str = "Non-error promise rejection";

pub fn catalog() -> ScenarioRegistry {
    let scenarios = [
        Scenario::new("throw-syntax-error", ScenarioKind::ThrownError, |h| boxed(throw_syntax_error(h)))
            .describe("Capture and raise a syntax error")
            .raising(&[FailureKind::Syntax]),
        Scenario::new("throw-failed-fetch", ScenarioKind::NetworkFailure, |h| boxed(throw_failed_fetch(h)))
            .describe("GET an endpoint that does not exist and raise on the failed status")
            .raising(&[FailureKind::Http, FailureKind::Network]),
        Scenario::new("http-error-404", ScenarioKind::NetworkFailure, |h| boxed(http_error(h)))
            .describe("GET an endpoint answering 404 and raise on the status")
            .raising(&[FailureKind::Http, FailureKind::Network]),
        Scenario::new("throw-object", ScenarioKind::ThrownError, |h| boxed(throw_object(h)))
            .describe("Raise a plain object instead of an error")
            .raising(&[FailureKind::ThrownValue]),
        Scenario::new("throw-uri-error", ScenarioKind::ThrownError, |h| boxed(throw_uri_error(h)))
            .describe("Capture and raise a URI error")
            .raising(&[FailureKind::Uri]),
        Scenario::new("non-error-rejection", ScenarioKind::RejectedPromise, |h| {
            boxed(non_error_rejection(h))
        })
        .describe("Reject a task with a plain object and capture it as an error"),
        Scenario::new("start-replay", ScenarioKind::SessionControl, |h| boxed(start_replay(h)))
            .describe("Start session buffering around a syntax error")
            .raising(&[FailureKind::Syntax]),
        Scenario::new("stop-replay", ScenarioKind::SessionControl, |h| boxed(stop_replay(h)))
            .describe("Flush and stop the session buffer"),
        Scenario::new("change-user", ScenarioKind::SessionControl, |h| boxed(change_user(h)))
            .describe("Toggle the current user identity"),
        Scenario::new("request-error", ScenarioKind::NetworkFailure, |h| boxed(request_error(h)))
            .describe("GET a missing API endpoint and raise a simulated request failure")
            .raising(&[FailureKind::Network]),
        Scenario::new("throw-reference-error", ScenarioKind::ThrownError, |h| {
            boxed(throw_reference_error(h))
        })
        .describe("Capture and raise a reference error")
        .raising(&[FailureKind::Reference]),
        Scenario::new("basic-event", ScenarioKind::LogEmission, |h| boxed(basic_event(h)))
            .describe("Capture an info event through the scope"),
        Scenario::new("client-event", ScenarioKind::LogEmission, |h| boxed(client_event(h)))
            .describe("Capture an info event on the client, bypassing the scope"),
        Scenario::new("capture-exception", ScenarioKind::LogEmission, |h| boxed(capture_exception(h)))
            .describe("Catch an error and capture it through the scope"),
        Scenario::new("log-info", ScenarioKind::LogEmission, |h| boxed(log_info(h))).describe("Info log with data"),
        Scenario::new("log-error", ScenarioKind::LogEmission, |h| boxed(log_error(h)))
            .describe("Error log with an attached failure"),
        Scenario::new("log-warn", ScenarioKind::LogEmission, |h| boxed(log_warn(h))).describe("Warning log with data"),
        Scenario::new("log-debug", ScenarioKind::LogEmission, |h| boxed(log_debug(h))).describe("Debug log with data"),
        Scenario::new("structured-data", ScenarioKind::LogEmission, |h| boxed(structured_data(h)))
            .describe("Info log carrying a nested data bundle"),
    ];

    let mut registry = ScenarioRegistry::new();
    for scenario in scenarios {
        if let Err(e) = registry.add(scenario) {
            log::error!("Builtin catalog: {}", e);
        }
    }
    registry
}

fn boxed<'a, F>(future: F) -> ScenarioFuture<'a>
where
    F: Future<Output = Result<(), ScenarioError>> + 'a,
{
    Box::pin(future)
}

fn failure_context() -> CaptureContext {
    CaptureContext::new().tag("error_code", "500")
}

/// Report `error` with the failure tag, then hand it back for raising
fn raise(h: &Harness, error: ScenarioError) -> Result<(), ScenarioError> {
    h.facade().capture_exception(Thrown::from(&error), failure_context());
    Err(error)
}

async fn throw_syntax_error(h: &Harness) -> Result<(), ScenarioError> {
    raise(h, ScenarioError::Syntax(SYNTAX_ERROR_MESSAGE.to_string()))
}

async fn throw_failed_fetch(h: &Harness) -> Result<(), ScenarioError> {
    let url = &h.network().failed_fetch_url;
    match net::fetch(h.http(), url).await {
        Ok(response) if response.is_success() => {
            log::info!("Data received from {}: {}", url, response.body);
            Ok(())
        }
        Ok(response) => {
            let message = format!("Fetch failed: {} {}", response.status, response.reason);
            raise(
                h,
                ScenarioError::Http {
                    status: response.status,
                    message: message.trim_end().to_string(),
                },
            )
        }
        Err(e) => raise(h, ScenarioError::Network(e.to_string())),
    }
}

async fn http_error(h: &Harness) -> Result<(), ScenarioError> {
    let url = &h.network().http_error_url;
    match net::fetch(h.http(), url).await {
        Ok(response) if response.is_success() => {
            log::info!("Data received from {}: {}", url, response.body);
            Ok(())
        }
        Ok(response) => raise(
            h,
            ScenarioError::Http {
                status: response.status,
                message: format!("HTTP error! Status: {}", response.status),
            },
        ),
        Err(e) => raise(h, ScenarioError::Network(e.to_string())),
    }
}

async fn throw_object(h: &Harness) -> Result<(), ScenarioError> {
    raise(h, ScenarioError::ThrownValue(json!({"error": "foo"})))
}

async fn throw_uri_error(h: &Harness) -> Result<(), ScenarioError> {
    raise(h, ScenarioError::Uri(URI_ERROR_MESSAGE.to_string()))
}

async fn non_error_rejection(h: &Harness) -> Result<(), ScenarioError> {
    let task = tokio::spawn(async {
        Err::<(), Value>(json!({
            "message": "This is a non-error rejection",
            "code": 500,
        }))
    });

    let reason = match task.await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(reason)) => reason,
        Err(e) => json!(e.to_string()),
    };

    log::info!("Caught non-error rejection: {}", reason);
    let (error, extra) = Thrown::from(reason).normalize_rejection();
    h.facade().capture_exception(error, failure_context().extra(extra));
    Ok(())
}

async fn start_replay(h: &Harness) -> Result<(), ScenarioError> {
    h.session().start();
    let outcome = throw_syntax_error(h).await;
    h.session().flush();
    outcome
}

async fn stop_replay(h: &Harness) -> Result<(), ScenarioError> {
    if !h.session().stop() {
        log::info!("No active session to stop");
    }
    Ok(())
}

async fn change_user(h: &Harness) -> Result<(), ScenarioError> {
    h.user().change(h.session(), h.target().scope());
    Ok(())
}

async fn request_error(h: &Harness) -> Result<(), ScenarioError> {
    let url = &h.network().request_error_url;
    match net::fetch(h.http(), url).await {
        Ok(response) if response.is_success() => {
            log::info!("Response from {}: {}", url, response.body);
            Ok(())
        }
        Ok(response) => {
            log::warn!("Request to {} failed with status {}", url, response.status);
            raise(h, ScenarioError::Network(REQUEST_ERROR_MESSAGE.to_string()))
        }
        Err(e) => {
            log::warn!("{}", e);
            raise(h, ScenarioError::Network(REQUEST_ERROR_MESSAGE.to_string()))
        }
    }
}

async fn throw_reference_error(h: &Harness) -> Result<(), ScenarioError> {
    raise(h, ScenarioError::Reference(REFERENCE_ERROR_MESSAGE.to_string()))
}

async fn basic_event(h: &Harness) -> Result<(), ScenarioError> {
    h.facade()
        .capture_event(TelemetryRecord::new(Level::Info, "Test event from tripwire scope"));
    Ok(())
}

async fn client_event(h: &Harness) -> Result<(), ScenarioError> {
    h.target()
        .client()
        .capture_event(TelemetryRecord::new(Level::Info, "Test event from tripwire client"));
    Ok(())
}

fn failing_operation() -> Result<(), ErrorInfo> {
    Err(ErrorInfo::new("Error", "Test exception from tripwire"))
}

async fn capture_exception(h: &Harness) -> Result<(), ScenarioError> {
    if let Err(e) = failing_operation() {
        h.facade().capture_exception(e, CaptureContext::new());
    }
    Ok(())
}

async fn log_info(h: &Harness) -> Result<(), ScenarioError> {
    h.facade().log_info(
        "Test info log from tripwire",
        json!({
            "testId": "tripwire-info-test",
            "timestamp": Utc::now().to_rfc3339(),
            "user": "test-user",
        }),
    );
    Ok(())
}

async fn log_error(h: &Harness) -> Result<(), ScenarioError> {
    h.facade().log_error(
        "Test error log from tripwire",
        Some(Thrown::error("Error", "Simulated error")),
        json!({
            "testPhase": "tripwire-testing",
            "severity": "medium",
        }),
    );
    Ok(())
}

async fn log_warn(h: &Harness) -> Result<(), ScenarioError> {
    h.facade().log_warn(
        "Test warning log from tripwire",
        json!({
            "warningType": "performance",
            "threshold": "80%",
            "currentValue": "75%",
        }),
    );
    Ok(())
}

async fn log_debug(h: &Harness) -> Result<(), ScenarioError> {
    h.facade().log_debug(
        "Test debug log from tripwire",
        json!({
            "debugInfo": "Processing step 3",
            "dataSize": 2048,
            "operation": "data-transformation",
        }),
    );
    Ok(())
}

async fn structured_data(h: &Harness) -> Result<(), ScenarioError> {
    h.facade().log_info(
        "User interaction captured",
        json!({
            "action": "button_click",
            "buttonId": "tripwire-test-button",
            "userId": "user-123",
            "sessionId": "session-456",
            "timestamp": Utc::now().timestamp_millis(),
            "metadata": {
                "os": std::env::consts::OS,
                "version": env!("CARGO_PKG_VERSION"),
            },
        }),
    );
    Ok(())
}
