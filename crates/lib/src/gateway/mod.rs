//! Remote authority gateway
//!
//! The remote authority is the source of truth for registration and profile
//! state. The session core talks to it only through [`RemoteAuthority`]; every
//! call carries the caller's [`Identity`] explicitly, so there is no ambient
//! "current identity" anywhere in the process.
//!
//! Implementations:
//! - [`HttpAuthority`]: signed JSON-over-HTTP adapter (feature `http`)
//! - [`Deadline`]: wraps another authority and bounds every call with a timeout
//! - `InMemoryAuthority`: an in-process authority for tests (feature `testing`)

use async_trait::async_trait;

use crate::identity::Identity;

pub mod deadline;
pub mod errors;
#[cfg(feature = "http")]
pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod types;
#[cfg(feature = "http")]
pub mod wire;

pub use deadline::Deadline;
pub use errors::{AuthorityError, GatewayError};
#[cfg(feature = "http")]
pub use http::HttpAuthority;
#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryAuthority;
pub use types::{NewUserProfile, ProfileUpdate, ThemePreferences, UserProfile};

/// Maximum username length accepted by the authority, in bytes.
pub const USERNAME_MAX_LEN: usize = 12;

/// The operations the session core needs from the remote authority.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Register the caller with the given profile.
    ///
    /// Fails with [`AuthorityError::AlreadyExists`] if the caller's principal
    /// is already registered.
    async fn create_user(
        &self,
        caller: &Identity,
        profile: NewUserProfile,
    ) -> Result<UserProfile, GatewayError>;

    /// The caller's profile, or `None` if the caller is not registered.
    async fn get_current_user(&self, caller: &Identity)
    -> Result<Option<UserProfile>, GatewayError>;

    /// Apply a partial update to the caller's profile and return the result.
    async fn update_profile(
        &self,
        caller: &Identity,
        update: ProfileUpdate,
    ) -> Result<UserProfile, GatewayError>;

    /// Change the caller's username.
    async fn update_username(&self, caller: &Identity, username: &str)
    -> Result<(), GatewayError>;

    /// Replace the caller's theme preferences.
    async fn update_theme_preferences(
        &self,
        caller: &Identity,
        preferences: ThemePreferences,
    ) -> Result<(), GatewayError>;

    /// Check whether no registered user holds `username`.
    async fn is_username_available(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<bool, GatewayError>;
}
