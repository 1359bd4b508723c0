//! Deterministic identity derivation
//!
//! A secret phrase (12-word BIP-39 mnemonic) is the only thing a user needs to
//! carry between machines. The pipeline is
//! phrase → 64-byte BIP-39 seed → first 32 bytes → Ed25519 signing key →
//! [`Identity`] with a self-authenticating principal.
//!
//! ```
//! use tessera::identity;
//!
//! let phrase = identity::generate().unwrap();
//! assert!(identity::validate(&phrase.expose()));
//!
//! let first = identity::derive(&phrase);
//! let again = identity::derive(&phrase);
//! assert_eq!(first.principal(), again.principal());
//! ```

pub mod errors;
pub mod keys;
pub mod phrase;

pub use errors::IdentityError;
pub use keys::Identity;
pub use phrase::{SecretPhrase, WORD_COUNT, validate};

/// Derive the identity handle for a phrase.
pub fn derive(phrase: &SecretPhrase) -> Identity {
    Identity::from_phrase(phrase)
}

/// Produce a fresh random phrase that [`validate`] accepts.
pub fn generate() -> Result<SecretPhrase, IdentityError> {
    SecretPhrase::generate()
}
