//! Encoding of session snapshots into a single durable slot.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::{errors::StorageError, snapshot::SessionSnapshot, store::SessionStore};
use crate::Result;

/// Slot name used when the configuration does not override it.
pub const DEFAULT_SESSION_KEY: &str = "tessera.session";

/// The current snapshot format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const SNAPSHOT_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the snapshot version during deserialization.
fn validate_snapshot_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != SNAPSHOT_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported snapshot version {version}; only version {SNAPSHOT_VERSION} is supported"
        )));
    }
    Ok(version)
}

#[derive(Serialize)]
struct EncodedRef<'a> {
    #[serde(rename = "_v", skip_serializing_if = "is_v0")]
    version: u8,
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
}

#[derive(Deserialize)]
struct Encoded {
    #[serde(
        rename = "_v",
        default,
        deserialize_with = "validate_snapshot_version"
    )]
    #[allow(dead_code)]
    version: u8,
    #[serde(flatten)]
    snapshot: SessionSnapshot,
}

/// Encode a snapshot as JSON text.
///
/// 64-bit integers inside the user profile are written as strings.
pub fn encode(snapshot: &SessionSnapshot) -> std::result::Result<String, StorageError> {
    serde_json::to_string(&EncodedRef {
        version: SNAPSHOT_VERSION,
        snapshot,
    })
    .map_err(|e| StorageError::Encode {
        reason: e.to_string(),
    })
}

/// Decode and check a snapshot.
pub fn decode(text: &str) -> std::result::Result<SessionSnapshot, StorageError> {
    let encoded: Encoded = serde_json::from_str(text).map_err(|e| StorageError::Corrupt {
        reason: e.to_string(),
    })?;
    encoded.snapshot.check()?;
    Ok(encoded.snapshot)
}

/// Reads and writes the session snapshot slot.
#[derive(Clone)]
pub struct SessionCodec {
    store: Arc<dyn SessionStore>,
    key: String,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(store: Arc<dyn SessionStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The slot this codec owns.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the snapshot, replacing whatever the slot held.
    pub async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let text = encode(snapshot)?;
        self.store.write(&self.key, &text).await?;
        debug!(
            slot = %self.key,
            authenticated = snapshot.authenticated,
            registered = snapshot.registered,
            "saved session snapshot"
        );
        Ok(())
    }

    /// Load the snapshot.
    ///
    /// Returns `Ok(None)` when the slot is empty. A slot that cannot be
    /// decoded (including bytes the store reports as corrupt), or that
    /// violates the snapshot invariants, is removed and also reported as
    /// `Ok(None)` so startup never loops on bad data. Only storage I/O
    /// failures are errors.
    pub async fn load(&self) -> Result<Option<SessionSnapshot>> {
        let decoded = match self.store.read(&self.key).await {
            Ok(None) => return Ok(None),
            Ok(Some(text)) => decode(&text),
            Err(crate::Error::Storage(e)) if e.is_corrupt() => Err(e),
            Err(e) => return Err(e),
        };

        match decoded {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(slot = %self.key, error = %e, "discarding unreadable session snapshot");
                self.store.remove(&self.key).await?;
                Ok(None)
            }
        }
    }

    /// Wipe the slot.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await?;
        debug!(slot = %self.key, "cleared session snapshot");
        Ok(())
    }
}
