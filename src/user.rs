//! Current user identity, toggled between two fixed test users

use std::sync::{Mutex, PoisonError};

use crate::session::SessionBuffer;
use crate::telemetry::{Scope, UserIdentity};

pub const USER_A: &str = "john.doe@example.com";
pub const USER_B: &str = "jane.doe@example.com";

pub struct UserContext {
    current: Mutex<UserIdentity>,
}

impl UserContext {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(UserIdentity::new(USER_A)),
        }
    }

    pub fn current(&self) -> UserIdentity {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Switch to the other user.
    ///
    /// The session buffer is stopped before the identity changes, and the
    /// lock is held across the sink update so nobody sees a half-switched user.
    pub fn change(&self, session: &SessionBuffer, scope: &Scope) -> UserIdentity {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        session.stop();

        let next = counterpart(&current);
        scope.set_user(next.clone());
        *current = next.clone();

        log::info!("User changed to: {}", next.email);
        next
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new()
    }
}

fn counterpart(user: &UserIdentity) -> UserIdentity {
    if user.email == USER_A {
        UserIdentity::new(USER_B)
    } else {
        UserIdentity::new(USER_A)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkEntry;
    use crate::sink::memory::MemorySink;
    use crate::telemetry::{ClientOptions, SinkTarget, Tags};
    use std::sync::Arc;

    #[test]
    fn test_change_toggles_and_sets_user_once() {
        let sink = Arc::new(MemorySink::new());
        let target = SinkTarget::init(ClientOptions::default(), sink.clone(), &Tags::new());
        let session = SessionBuffer::new(Arc::clone(target.client()));
        let user = UserContext::new();
        assert_eq!(user.current().email, USER_A);

        let next = user.change(&session, target.scope());
        assert_eq!(next.email, USER_B);
        assert_eq!(user.current().email, USER_B);
        assert_eq!(sink.users(), vec![UserIdentity::new(USER_B)]);

        user.change(&session, target.scope());
        assert_eq!(user.current().email, USER_A);
        assert_eq!(sink.users().len(), 2);
    }

    #[test]
    fn test_change_stops_active_session_first() {
        let sink = Arc::new(MemorySink::new());
        let target = SinkTarget::init(ClientOptions::default(), sink.clone(), &Tags::new());
        let session = SessionBuffer::new(Arc::clone(target.client()));
        let user = UserContext::new();

        session.start();
        user.change(&session, target.scope());

        assert_eq!(
            sink.entries(),
            vec![
                SinkEntry::StartBuffering,
                SinkEntry::Flush,
                SinkEntry::Stop,
                SinkEntry::User(UserIdentity::new(USER_B)),
            ]
        );
    }
}
