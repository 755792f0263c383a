//! Replay-style session buffer
//!
//! `Idle -> Buffering -> Stopped`. Starting while buffering and stopping
//! while not buffering are no-ops that touch nothing on the sink.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::telemetry::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Buffering,
    Stopped,
}

pub struct SessionBuffer {
    client: Arc<Client>,
    state: Mutex<SessionState>,
}

impl SessionBuffer {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        *self.lock()
    }

    /// Returns `false` when already buffering
    pub fn start(&self) -> bool {
        let mut state = self.lock();
        if *state == SessionState::Buffering {
            log::debug!("Session buffer already buffering");
            return false;
        }

        self.client.start_buffering();
        *state = SessionState::Buffering;
        log::info!("Session buffering started");
        true
    }

    /// Push buffered data out without ending the session
    pub fn flush(&self) -> bool {
        let state = self.lock();
        if *state != SessionState::Buffering {
            return false;
        }

        self.client.flush();
        true
    }

    /// Final flush, then stop. Both complete before this returns.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if *state != SessionState::Buffering {
            log::debug!("Session buffer not buffering ({:?}), nothing to stop", *state);
            return false;
        }

        self.client.flush();
        self.client.stop();
        *state = SessionState::Stopped;
        log::info!("Session buffer stopped");
        true
    }
}
