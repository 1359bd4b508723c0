//! Error types for remote authority calls
//!
//! [`AuthorityError`] is the closed set of failures the authority itself
//! reports. [`GatewayError`] adds the ways a call can fail before the
//! authority gets a say.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure reported by the remote authority.
///
/// The serde representation matches the authority's variant-tagged wire
/// format, e.g. `{"InvalidInput": "Username cannot be empty"}` or
/// `{"NotFound": null}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Invite not found")]
    InviteNotFound,

    #[error("Invite expired")]
    InviteExpired,

    #[error("Team not found")]
    TeamNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Already exists")]
    AlreadyExists,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Project not found")]
    ProjectNotFound,

    #[error("User not found")]
    UserNotFound,
}

impl AuthorityError {
    /// Check if this error reports a missing record of any kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AuthorityError::NotFound
                | AuthorityError::UserNotFound
                | AuthorityError::TeamNotFound
                | AuthorityError::ProjectNotFound
                | AuthorityError::InviteNotFound
        )
    }
}

/// Error from a remote authority call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The authority processed the call and rejected it
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// The call never reached the authority, or its reply was lost
    #[error("Remote authority unreachable: {reason}")]
    Transport { reason: String },

    /// The call did not complete within the configured deadline
    #[error("Remote authority call timed out after {after:?}")]
    Timeout { after: Duration },

    /// The call's arguments could not be serialized; nothing was sent
    #[error("Failed to encode remote authority request: {reason}")]
    Encode { reason: String },

    /// The authority answered with something that is not a valid reply
    #[error("Malformed remote authority response: {reason}")]
    Decode { reason: String },
}

impl GatewayError {
    /// The authority's own failure kind, if it answered.
    pub fn authority(&self) -> Option<&AuthorityError> {
        match self {
            GatewayError::Authority(err) => Some(err),
            _ => None,
        }
    }

    /// Check if the authority reported a missing record.
    pub fn is_not_found(&self) -> bool {
        self.authority().is_some_and(AuthorityError::is_not_found)
    }

    /// Check if the authority reported that the caller is already registered.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            GatewayError::Authority(AuthorityError::AlreadyExists)
        )
    }

    /// Check if the authority refused the caller.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            GatewayError::Authority(
                AuthorityError::Unauthorized | AuthorityError::InsufficientPermissions
            )
        )
    }

    /// Check if the authority rejected the call's arguments.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            GatewayError::Authority(AuthorityError::InvalidInput(_))
        )
    }

    /// Check if the failure happened outside the authority.
    ///
    /// Transport, timeout, encode and decode failures say nothing about
    /// the caller's registration state.
    pub fn is_transport(&self) -> bool {
        !matches!(self, GatewayError::Authority(_))
    }
}

impl From<GatewayError> for crate::Error {
    fn from(err: GatewayError) -> Self {
        crate::Error::Gateway(err)
    }
}
