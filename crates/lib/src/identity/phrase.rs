//! Secret phrases: BIP-39 mnemonics that seed an identity.

use bip39::{Language, Mnemonic};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use super::errors::IdentityError;

/// Number of words in every phrase this crate generates and accepts.
pub const WORD_COUNT: usize = 12;

/// Entropy behind a 12-word phrase (128 bits).
pub const ENTROPY_LENGTH: usize = 16;

/// Length of the BIP-39 seed produced from a phrase.
pub const SEED_LENGTH: usize = 64;

/// A checksum-validated 12-word English mnemonic.
///
/// The only ways to obtain one are [`SecretPhrase::generate`] and
/// [`SecretPhrase::parse`], so holding a `SecretPhrase` means the words and
/// checksum are valid. `Debug` never prints the words.
#[derive(Clone)]
pub struct SecretPhrase {
    mnemonic: Mnemonic,
}

impl std::fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretPhrase([REDACTED])")
    }
}

impl PartialEq for SecretPhrase {
    fn eq(&self, other: &Self) -> bool {
        *self.expose() == *other.expose()
    }
}

impl Eq for SecretPhrase {}

impl SecretPhrase {
    /// Generate a fresh phrase from 128 bits of OS randomness.
    pub fn generate() -> Result<Self, IdentityError> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_LENGTH]);
        OsRng.fill_bytes(entropy.as_mut());

        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_ref()).map_err(
            |e| IdentityError::GenerationFailed {
                reason: e.to_string(),
            },
        )?;

        Ok(Self { mnemonic })
    }

    /// Parse and validate a phrase typed or stored by a user.
    ///
    /// Runs of whitespace between words are collapsed; words must come from
    /// the English wordlist and the checksum must match.
    pub fn parse(input: &str) -> Result<Self, IdentityError> {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.len() != WORD_COUNT {
            return Err(IdentityError::WrongWordCount {
                expected: WORD_COUNT,
                actual: words.len(),
            });
        }

        let normalized = Zeroizing::new(words.join(" "));
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized).map_err(
            |e| IdentityError::InvalidPhrase {
                reason: e.to_string(),
            },
        )?;

        Ok(Self { mnemonic })
    }

    /// The canonical space-separated words.
    ///
    /// The returned buffer is wrapped in [`Zeroizing`] so the words are
    /// cleared from memory when dropped.
    pub fn expose(&self) -> Zeroizing<String> {
        Zeroizing::new(self.mnemonic.to_string())
    }

    /// The 64-byte BIP-39 seed (PBKDF2-HMAC-SHA512, empty passphrase).
    pub fn to_seed(&self) -> Zeroizing<[u8; SEED_LENGTH]> {
        Zeroizing::new(self.mnemonic.to_seed_normalized(""))
    }
}

/// Check whether `input` is a phrase [`SecretPhrase::generate`] could have produced.
///
/// Never panics; any structural problem (word count, unknown word, checksum)
/// simply yields `false`.
pub fn validate(input: &str) -> bool {
    SecretPhrase::parse(input).is_ok()
}
