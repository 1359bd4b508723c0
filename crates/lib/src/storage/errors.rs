//! Error types for session persistence
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    #[error("Storage I/O failed for slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage slot name: '{key}'")]
    InvalidKey { key: String },

    #[error("Failed to encode session snapshot: {reason}")]
    Encode { reason: String },

    #[error("Stored session snapshot is unreadable: {reason}")]
    Corrupt { reason: String },

    #[error("Stored session snapshot is inconsistent: {reason}")]
    Inconsistent { reason: String },
}

impl StorageError {
    /// Check if this error means the stored bytes cannot be trusted.
    ///
    /// Corrupt slots are cleared rather than surfaced.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            StorageError::Corrupt { .. } | StorageError::Inconsistent { .. }
        )
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StorageError::Io { .. })
    }
}

impl From<StorageError> for crate::Error {
    fn from(err: StorageError) -> Self {
        crate::Error::Storage(err)
    }
}
