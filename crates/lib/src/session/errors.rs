//! Error types for session lifecycle operations
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("No identity available; create or recover an account first")]
    NoIdentity,

    #[error("Remote registration did not settle after {steps} steps")]
    ReconcileLoop { steps: usize },
}

impl SessionError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        SessionError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Check if the operation needed an identity the session does not hold.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SessionError::NoIdentity)
    }

    /// Check if the operation was rejected before any remote call.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SessionError::InvalidInput { .. })
    }

    /// Check if verification and registration kept bouncing off each other.
    pub fn is_reconcile_loop(&self) -> bool {
        matches!(self, SessionError::ReconcileLoop { .. })
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
