//! # Identity Module
//!
//! Deterministic wallet derivation from a recovery phrase.
//!
//! ## Derivation Path
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      WALLET DERIVATION                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Recovery Phrase (12-24 words, checksummed)                             │
//! │        │                                                                │
//! │        ▼  BIP39 PBKDF2 (empty passphrase)                               │
//! │  Seed (64 bytes)                                                        │
//! │        │                                                                │
//! │        ▼  seed[0..32]                                                   │
//! │  IdentityKeyPair (Ed25519)  ──── public key = durable user identifier   │
//! │        │                                                                │
//! │        ▼  one-way conversion, on demand (crypto::convert)               │
//! │  ExchangeKeyPair (X25519)   ──── receives sealed session keys           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recovery is fully deterministic: the same phrase always reproduces the
//! same identity keypair, which is what makes the phrase a complete
//! backup. The wallet holds the only in-memory copy of the private key and
//! exists only while the session is unlocked.

mod profile;
mod recovery;

pub use profile::{avatar_for, validate_name, Profile, MAX_NAME_LENGTH};
pub use recovery::{RecoveryPhrase, GENERATED_WORD_COUNT};

use zeroize::{Zeroizing, ZeroizeOnDrop};

use crate::crypto::convert;
use crate::crypto::keys::{ExchangeKeyPair, IdentityKeyPair};
use crate::crypto::sealing;
use crate::crypto::signing::{sign, Signature};
use crate::error::Result;

/// An unlocked identity: the keypair derived from a recovery phrase.
///
/// Owns the only copy of the private key while the session is unlocked;
/// dropped (and zeroized) on lock.
#[derive(ZeroizeOnDrop)]
pub struct Wallet {
    #[zeroize(skip)] // IdentityKeyPair zeroizes its own secret
    keypair: IdentityKeyPair,
}

impl Wallet {
    /// Create a brand new wallet with a fresh recovery phrase.
    ///
    /// Returns the wallet together with the phrase; the phrase must be
    /// shown to the user once and is otherwise only persisted encrypted.
    pub fn generate() -> Result<(Self, RecoveryPhrase)> {
        let phrase = RecoveryPhrase::generate()?;
        let wallet = Self::from_recovery_phrase(&phrase);
        Ok((wallet, phrase))
    }

    /// Recover a wallet from a validated recovery phrase.
    ///
    /// Deterministic: `from_recovery_phrase(p)` always yields the keypair
    /// originally produced alongside `p`.
    pub fn from_recovery_phrase(phrase: &RecoveryPhrase) -> Self {
        let seed = phrase.to_seed();

        let mut key_seed = Zeroizing::new([0u8; 32]);
        key_seed.copy_from_slice(&seed[..32]);

        Self {
            keypair: IdentityKeyPair::from_seed(&key_seed),
        }
    }

    /// The user's durable, shareable identifier.
    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public_bytes()
    }

    /// Sign arbitrary bytes with the identity key. Deterministic.
    pub fn sign(&self, data: &[u8]) -> Signature {
        sign(&self.keypair, data)
    }

    /// Recompute the Diffie-Hellman keypair for this identity.
    ///
    /// Never persisted; derived on demand from the identity key.
    pub fn exchange_keypair(&self) -> Result<ExchangeKeyPair> {
        let secret = convert::exchange_secret_from_identity(&self.keypair.secret_bytes())?;
        Ok(ExchangeKeyPair::from_bytes(&secret))
    }

    /// Open a sealed blob addressed to this identity.
    pub fn open_sealed(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let exchange = self.exchange_keypair()?;
        sealing::open(&exchange.public_bytes(), &exchange.secret_bytes(), blob)
    }

    /// Get reference to the identity keypair.
    pub fn keypair(&self) -> &IdentityKeyPair {
        &self.keypair
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
