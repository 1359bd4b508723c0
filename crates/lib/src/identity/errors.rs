//! Error types for identity derivation
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("Invalid secret phrase: {reason}")]
    InvalidPhrase { reason: String },

    #[error("Invalid secret phrase: expected {expected} words, got {actual}")]
    WrongWordCount { expected: usize, actual: usize },

    #[error("Failed to generate secret phrase: {reason}")]
    GenerationFailed { reason: String },
}

impl IdentityError {
    /// Check if this error rejects a caller-supplied phrase.
    pub fn is_invalid_phrase(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidPhrase { .. } | IdentityError::WrongWordCount { .. }
        )
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
