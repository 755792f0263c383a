//! The context every scenario runs against
//!
//! Built once at startup and passed by reference. It owns the sink target,
//! the facade over its scope, the session buffer, the current user and the
//! HTTP client used by network scenarios.

use std::sync::Arc;

use crate::config::{Config, NetworkConfig};
use crate::net::{HttpClient, UreqClient};
use crate::session::SessionBuffer;
use crate::sink;
use crate::telemetry::{ClientOptions, SinkTarget, TelemetryFacade};
use crate::user::UserContext;

pub struct Harness {
    target: SinkTarget,
    facade: TelemetryFacade,
    session: SessionBuffer,
    user: UserContext,
    http: Arc<dyn HttpClient>,
    network: NetworkConfig,
}

impl Harness {
    pub fn new(target: SinkTarget, http: Arc<dyn HttpClient>, network: NetworkConfig) -> Self {
        let facade = TelemetryFacade::new(Arc::clone(target.scope()));
        let session = SessionBuffer::new(Arc::clone(target.client()));

        Self {
            target,
            facade,
            session,
            user: UserContext::new(),
            http,
            network,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let timeout = config.network.timeout();
        let sink = sink::from_config(&config.sink, timeout);
        let target = SinkTarget::init(ClientOptions::from(&config.client), sink, &config.tags);
        let http: Arc<dyn HttpClient> = Arc::new(UreqClient::new(timeout));

        Self::new(target, http, config.network.clone())
    }

    pub fn target(&self) -> &SinkTarget {
        &self.target
    }

    pub fn facade(&self) -> &TelemetryFacade {
        &self.facade
    }

    pub fn session(&self) -> &SessionBuffer {
        &self.session
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn http(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.http)
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}
