//! Outbound HTTP used to provoke network failures
//!
//! Non-success statuses come back as responses; only transport problems are
//! errors. Requests run on tokio's blocking pool so the scenario thread is
//! free while waiting.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("request task failed: {0}")]
    Join(String),
}

pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let mut response = self.agent.get(url).call().map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Could not read body from {}: {}", url, e);
                String::new()
            }
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// GET `url` without blocking the scenario thread
pub async fn fetch(client: Arc<dyn HttpClient>, url: &str) -> Result<HttpResponse, TransportError> {
    let url = url.to_string();
    tokio::task::spawn_blocking(move || client.get(&url))
        .await
        .map_err(|e| TransportError::Join(e.to_string()))?
}

#[cfg(test)]
pub mod stub {
    use super::*;
    use std::sync::Mutex;

    /// Answers every request with the same status, or fails them all
    pub struct StubHttp {
        status: Option<u16>,
        requests: Mutex<Vec<String>>,
    }

    impl StubHttp {
        pub fn status(status: u16) -> Self {
            Self {
                status: Some(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                status: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpClient for StubHttp {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.status {
                Some(status) => Ok(HttpResponse {
                    status,
                    reason: if status == 404 { "Not Found".to_string() } else { String::new() },
                    body: r#"{"ok":true}"#.to_string(),
                }),
                None => Err(TransportError::Request {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }
}
