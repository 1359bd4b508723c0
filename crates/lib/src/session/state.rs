//! Derived session state and the status broadcast to observers.

use std::{fmt, sync::Arc};

use crate::identity::Identity;

/// Where the session stands, derived from its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No identity
    Unauthenticated,
    /// An operation is in flight
    Loading,
    /// Identity held, not (yet) registered with the remote authority
    Guest,
    /// Identity held and registered
    Registered,
    /// The last operation failed; holds the reason
    Failed(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Guest | SessionState::Registered)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unauthenticated => f.write_str("unauthenticated"),
            SessionState::Loading => f.write_str("loading"),
            SessionState::Guest => f.write_str("guest"),
            SessionState::Registered => f.write_str("registered"),
            SessionState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Snapshot of the session published on its status channel.
///
/// Holders of a receiver (the preference scheduler, a router) read the
/// identity from here rather than from the session itself. It is replaced
/// with `None` on logout and reset.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub state: SessionState,
    pub identity: Option<Arc<Identity>>,
}

impl SessionStatus {
    pub fn unauthenticated() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            identity: None,
        }
    }

    /// Whether an identity is available to sign calls.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::unauthenticated()
    }
}
