//! # Key Management
//!
//! This module handles the two keypair types behind a user identity.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  IdentityKeyPair (Ed25519)                                              │
//! │  ─────────────────────────                                              │
//! │  • Derived deterministically from seed[0..32] of the recovery phrase    │
//! │  • Public key is the user's durable, shareable identifier               │
//! │  • Signs arbitrary data; only exists in memory while unlocked           │
//! │                                                                         │
//! │  ExchangeKeyPair (X25519)                                               │
//! │  ────────────────────────                                               │
//! │  • Converted from the identity keypair on demand (see `convert`)        │
//! │  • Receives sealed session keys via Diffie-Hellman                      │
//! │  • Never persisted; recomputed whenever it is needed                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of secret keys in bytes
pub const SECRET_KEY_SIZE: usize = 32;

/// Ed25519 identity keypair
///
/// The private half is zeroized on drop by `ed25519_dalek` itself.
#[derive(ZeroizeOnDrop)]
pub struct IdentityKeyPair {
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl IdentityKeyPair {
    /// Generate a random identity keypair
    ///
    /// Only useful for tests and throwaway identities; user-facing keys
    /// come from a recovery phrase via [`from_seed`](Self::from_seed).
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        Self { secret }
    }

    /// Derive the keypair from 32 bytes of seed material
    ///
    /// Deterministic: the same seed always produces the same keypair.
    pub fn from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Self {
        Self {
            secret: SigningKey::from_bytes(seed),
        }
    }

    /// Get the secret seed bytes
    ///
    /// Only for key conversion and secure storage. Never log or transmit.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// X25519 keypair used for Diffie-Hellman key exchange
#[derive(ZeroizeOnDrop)]
pub struct ExchangeKeyPair {
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl ExchangeKeyPair {
    /// Generate a random exchange keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Create from a 32-byte scalar (already clamped by x25519_dalek)
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the secret scalar bytes
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public.to_bytes()
    }

    /// Perform Diffie-Hellman key exchange with a peer's public key
    ///
    /// Both sides compute the same shared secret:
    /// `our_secret × their_public == their_secret × our_public`.
    pub fn diffie_hellman(&self, their_public: &[u8; PUBLIC_KEY_SIZE]) -> [u8; 32] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

/// Parse a 32-byte public key from a hex string
pub fn public_key_from_hex(hex_str: &str) -> Result<[u8; PUBLIC_KEY_SIZE]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| Error::InvalidKey(format!("Invalid public key hex: {}", e)))?;

    bytes
        .try_into()
        .map_err(|_| Error::InvalidKey("Public key must be 32 bytes".into()))
}

// ============================================================================
// TESTS
// ============================================================================
