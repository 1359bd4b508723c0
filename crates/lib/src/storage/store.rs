//! Durable key-value slots that hold encoded session snapshots.

use async_trait::async_trait;

use crate::Result;

/// A durable key-value store of text slots.
///
/// The session core only ever uses a single slot, but stores are keyed so
/// several independent sessions (or tests) can share one backing location.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a slot. Returns `Ok(None)` when the slot is empty.
    ///
    /// Contents that cannot be returned as text are reported as
    /// [`StorageError::Corrupt`](super::StorageError::Corrupt).
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing an empty slot succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
