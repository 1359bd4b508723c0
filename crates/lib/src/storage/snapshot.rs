//! The durable projection of a session.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::StorageError;
use crate::{gateway::UserProfile, identity};

/// Everything about a session that survives a restart.
///
/// Invariants (checked by [`SessionSnapshot::check`]):
/// - `secret_phrase` is a valid phrase whenever `authenticated` is true
/// - `user` is present whenever `registered` is true
///
/// The phrase is zeroized when the snapshot is dropped and `Debug` never
/// prints it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    #[zeroize(skip)]
    pub authenticated: bool,

    #[serde(default)]
    #[zeroize(skip)]
    pub registered: bool,

    #[serde(default)]
    #[zeroize(skip)]
    pub user: Option<UserProfile>,

    /// Accepts the older `seedPhrase` field name on read
    #[serde(default, alias = "seedPhrase")]
    pub secret_phrase: String,
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("authenticated", &self.authenticated)
            .field("registered", &self.registered)
            .field("user", &self.user)
            .field("secret_phrase", &"[REDACTED]")
            .finish()
    }
}

impl SessionSnapshot {
    /// Verify the snapshot invariants.
    pub fn check(&self) -> Result<(), StorageError> {
        if self.authenticated {
            if self.secret_phrase.trim().is_empty() {
                return Err(StorageError::Inconsistent {
                    reason: "authenticated session without a secret phrase".to_string(),
                });
            }
            if !identity::validate(&self.secret_phrase) {
                return Err(StorageError::Inconsistent {
                    reason: "stored secret phrase is not a valid phrase".to_string(),
                });
            }
        }
        if self.registered && self.user.is_none() {
            return Err(StorageError::Inconsistent {
                reason: "registered session without a user profile".to_string(),
            });
        }
        Ok(())
    }
}
