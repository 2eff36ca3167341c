//! # Asymmetric Sealing
//!
//! Sender-anonymous public-key encryption of short secrets (per-file
//! session keys) to a recipient's exchange public key.
//!
//! ## Sealed Box Construction
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SEALED BOX FLOW                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SEAL (anyone who knows the recipient's public key)                     │
//! │  ──────────────────────────────────────────────────                     │
//! │                                                                         │
//! │  1. Generate ephemeral X25519 keypair (fresh per seal)                  │
//! │  2. shared = DH(ephemeral_secret, recipient_public)                     │
//! │  3. (key, nonce) = HKDF(shared, ephemeral_pub ‖ recipient_pub)          │
//! │  4. ct = AES-256-GCM(key, nonce, plaintext)                             │
//! │                                                                         │
//! │  Output: ephemeral_pub(32) ‖ ct                                         │
//! │                                                                         │
//! │  OPEN (recipient only)                                                  │
//! │  ─────────────────────                                                  │
//! │                                                                         │
//! │  1. Split off ephemeral_pub                                             │
//! │  2. shared = DH(recipient_secret, ephemeral_pub)   [same secret]        │
//! │  3. Re-derive (key, nonce), decrypt                                     │
//! │  4. Any bit flip or wrong recipient → AuthenticationFailed              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sender's identity is not embedded anywhere, so a recipient cannot
//! cryptographically attribute a blob to a sender from the blob alone.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::rngs::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::crypto::kdf;
use crate::error::{Error, Result};

/// Size of the ephemeral public key prefixed to every sealed blob
pub const EPHEMERAL_PUBLIC_SIZE: usize = 32;

/// Size of the AES-GCM authentication tag
const TAG_SIZE: usize = 16;

/// Seal `plaintext` to a recipient's exchange public key.
///
/// Output layout: `ephemeral_public(32) ‖ ciphertext+tag`.
pub fn seal(recipient_public: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&X25519PublicKey::from(*recipient_public));

    let (key, nonce) =
        kdf::derive_sealing_keys(shared.as_bytes(), ephemeral_public.as_bytes(), recipient_public)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| Error::InvalidKey(format!("Invalid sealing key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::AuthenticationFailed)?;

    let mut blob = Vec::with_capacity(EPHEMERAL_PUBLIC_SIZE + ciphertext.len());
    blob.extend_from_slice(ephemeral_public.as_bytes());
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a sealed blob with the recipient's exchange keypair.
///
/// Fails closed: a tampered blob, a truncated blob, or a non-matching
/// recipient key all yield [`Error::AuthenticationFailed`] and release no
/// partial plaintext.
pub fn open(
    recipient_public: &[u8; 32],
    recipient_secret: &[u8; 32],
    blob: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < EPHEMERAL_PUBLIC_SIZE + TAG_SIZE {
        return Err(Error::AuthenticationFailed);
    }

    let mut ephemeral_public = [0u8; EPHEMERAL_PUBLIC_SIZE];
    ephemeral_public.copy_from_slice(&blob[..EPHEMERAL_PUBLIC_SIZE]);
    let ciphertext = &blob[EPHEMERAL_PUBLIC_SIZE..];

    let secret = StaticSecret::from(*recipient_secret);
    let shared = secret.diffie_hellman(&X25519PublicKey::from(ephemeral_public));

    let (key, nonce) =
        kdf::derive_sealing_keys(shared.as_bytes(), &ephemeral_public, recipient_public)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| Error::InvalidKey(format!("Invalid sealing key: {}", e)))?;

    let plaintext = cipher
        .decrypt(AesNonce::from_slice(&nonce), ciphertext)
        .map_err(|_| Error::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}

// ============================================================================
// TESTS
// ============================================================================
