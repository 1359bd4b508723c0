//! Identity handles: an Ed25519 signer plus its self-authenticating principal.

use candid::Principal;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use super::phrase::SecretPhrase;

/// Size of Ed25519 private keys in bytes
pub const ED25519_PRIVATE_KEY_SIZE: usize = 32;

/// Size of Ed25519 signatures in bytes
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// DER SubjectPublicKeyInfo header for an Ed25519 key (OID 1.3.101.112).
///
/// Prepending this to the raw 32-byte key gives the encoding that
/// self-authenticating principals are hashed from.
pub const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// An in-memory cryptographic signer and its public identifier.
///
/// Identities are recreated from a [`SecretPhrase`] on every derivation and
/// never mutated. The signing key is zeroized on drop.
pub struct Identity {
    signing_key: SigningKey,
    principal: Principal,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal.to_text())
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

impl Identity {
    /// Derive the identity for a phrase.
    ///
    /// The first 32 bytes of the BIP-39 seed become the Ed25519 secret key,
    /// so the same phrase yields the same principal on every machine.
    pub fn from_phrase(phrase: &SecretPhrase) -> Self {
        let seed = phrase.to_seed();
        let mut secret = Zeroizing::new([0u8; ED25519_PRIVATE_KEY_SIZE]);
        secret.copy_from_slice(&seed[..ED25519_PRIVATE_KEY_SIZE]);
        Self::from_signing_key(SigningKey::from_bytes(&secret))
    }

    /// Wrap an existing signing key.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let principal = Principal::self_authenticating(der_encode(&signing_key.verifying_key()));
        Self {
            signing_key,
            principal,
        }
    }

    /// The stable public identifier of this identity.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Textual form of the principal (dash-separated base32 groups).
    pub fn principal_text(&self) -> String {
        self.principal.to_text()
    }

    /// The Ed25519 verifying key.
    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// DER-encoded public key, as presented to the remote authority.
    pub fn public_key_der(&self) -> Vec<u8> {
        der_encode(&self.public_key())
    }

    /// Sign the given data and return the raw signature bytes.
    pub fn sign(&self, data: &[u8]) -> [u8; ED25519_SIGNATURE_SIZE] {
        let signature: Signature = self.signing_key.sign(data);
        signature.to_bytes()
    }

    /// Verify a signature made by this identity.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(sig_array) = <[u8; ED25519_SIGNATURE_SIZE]>::try_from(signature) else {
            return false;
        };
        self.public_key()
            .verify(data, &Signature::from_bytes(&sig_array))
            .is_ok()
    }
}

fn der_encode(key: &VerifyingKey) -> Vec<u8> {
    let mut der = Vec::with_capacity(ED25519_DER_PREFIX.len() + 32);
    der.extend_from_slice(&ED25519_DER_PREFIX);
    der.extend_from_slice(key.as_bytes());
    der
}
