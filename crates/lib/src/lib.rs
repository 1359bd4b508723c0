//!
//! Tessera: the client-side identity and session lifecycle core of a collaboration application.
//!
//! ## Core Concepts
//!
//! * **Identities (`identity::Identity`)**: Ed25519 signers derived deterministically from a
//!   BIP-39 secret phrase. The same phrase always yields the same principal, which is how an
//!   account is recovered on another machine.
//! * **Session snapshots (`storage::SessionSnapshot`)**: the durable projection of a session,
//!   written into a single named slot of a `storage::SessionStore` by the `storage::SessionCodec`.
//! * **Remote authority (`gateway::RemoteAuthority`)**: the backend that owns registration and
//!   profile state. `gateway::HttpAuthority` speaks its wire format.
//! * **Sessions (`session::Session`)**: the state machine that owns the identity, reconciles it
//!   against the remote authority and persists every successful transition.
//! * **Preference sync (`preferences::PreferenceSync`)**: a debounced, best-effort pusher of
//!   theme preferences that never blocks the user.

pub mod clock;
pub mod gateway;
pub mod identity;
pub mod preferences;
pub mod session;
pub mod storage;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use identity::{Identity, SecretPhrase};
pub use preferences::PreferenceSync;
pub use session::{Session, SessionConfig, SessionState};

/// Result type used throughout the Tessera library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Tessera library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured key derivation errors from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),

    /// Structured persistence errors from the storage module
    #[error(transparent)]
    Storage(storage::StorageError),

    /// Structured remote authority errors from the gateway module
    #[error(transparent)]
    Gateway(gateway::GatewayError),

    /// Structured lifecycle errors from the session module
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Identity(_) => "identity",
            Error::Storage(_) => "storage",
            Error::Gateway(_) => "gateway",
            Error::Session(_) => "session",
        }
    }

    /// The remote authority's failure kind, if this error came from the authority itself.
    pub fn authority_error(&self) -> Option<&gateway::AuthorityError> {
        match self {
            Error::Gateway(gateway_err) => gateway_err.authority(),
            _ => None,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Gateway(gateway_err) => gateway_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates the resource already exists.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Gateway(gateway_err) => gateway_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error indicates the caller has no usable identity or permission.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_unauthorized(),
            Error::Gateway(gateway_err) => gateway_err.is_unauthorized(),
            _ => false,
        }
    }

    /// Check if this error was caused by malformed caller input.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Identity(_) => true,
            Error::Session(session_err) => session_err.is_invalid_input(),
            Error::Gateway(gateway_err) => gateway_err.is_invalid_input(),
            _ => false,
        }
    }

    /// Check if this error came from the transport rather than the authority.
    ///
    /// Covers unreachable hosts, deadlines and undecodable responses.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Gateway(gateway_err) => gateway_err.is_transport(),
            _ => false,
        }
    }

    /// Check if this error indicates a gateway deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Gateway(gateway::GatewayError::Timeout { .. }))
    }

    /// Check if this error came from session persistence.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
