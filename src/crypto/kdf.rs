//! # Key Derivation Functions
//!
//! Two derivation paths live here:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KEY DERIVATION PATHS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Password path (slow, memory-hard)                                      │
//! │  ─────────────────────────────────                                      │
//! │                                                                         │
//! │  Argon2id(                                                              │
//! │    password,                                                            │
//! │    salt        = random, per purpose, never reused,                     │
//! │    time cost   = 1 pass,                                                │
//! │    memory cost = 64 MiB,                                                │
//! │    parallelism = 4,                                                     │
//! │  ) → symmetric key                                                      │
//! │                                                                         │
//! │  Protects the encrypted seed blob at rest. Intentionally costs          │
//! │  hundreds of milliseconds; callers must not hold locks across it.       │
//! │                                                                         │
//! │  Shared-secret path (fast)                                              │
//! │  ─────────────────────────                                              │
//! │                                                                         │
//! │  HKDF-SHA256(                                                           │
//! │    ikm  = X25519 shared secret,                                         │
//! │    salt = ephemeral_pub ‖ recipient_pub,  ← binds keys to the exchange  │
//! │    info = versioned domain string,                                      │
//! │  ) → AEAD key + nonce for one sealed box                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Size of a generated salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of a derived symmetric key in bytes (256 bits)
pub const DERIVED_KEY_SIZE: usize = 32;

/// Argon2id time cost (number of passes)
const ARGON2_TIME_COST: u32 = 1;

/// Argon2id memory cost in KiB (64 MiB)
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id lane count
const ARGON2_PARALLELISM: u32 = 4;

/// Domain separation strings for HKDF
///
/// Different `info` strings yield cryptographically independent keys from
/// the same input material. The `-v1` suffix leaves room for upgrades.
pub mod domain {
    /// AEAD key for one sealed session-key box
    pub const SEALED_BOX_KEY: &[u8] = b"sable-sealed-box-key-v1";

    /// AEAD nonce for one sealed session-key box
    pub const SEALED_BOX_NONCE: &[u8] = b"sable-sealed-box-nonce-v1";
}

/// Derive `length` bytes of key material from a password and salt.
///
/// Deterministic: identical `(password, salt)` always yields the same
/// output. Different purposes must use different salts.
pub fn derive(password: &str, salt: &[u8], length: usize) -> Result<Zeroizing<Vec<u8>>> {
    if length == 0 {
        return Err(Error::InvalidArgument("KDF output length must be non-zero".into()));
    }

    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, Some(length))
        .map_err(|e| Error::KeyDerivationFailed(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new(vec![0u8; length]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| Error::KeyDerivationFailed(format!("Argon2 derivation failed: {}", e)))?;

    Ok(key)
}

/// Derive a 256-bit symmetric key from a password and salt.
///
/// Fixed-length convenience over [`derive`], used by the credential path
/// and by password-mode file keys.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; DERIVED_KEY_SIZE]>> {
    let bytes = derive(password, salt, DERIVED_KEY_SIZE)?;
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Generate a cryptographically random salt of `length` bytes.
///
/// Fails with [`Error::RandomnessUnavailable`] only if the OS entropy
/// source fails, which is fatal and non-retryable in practice.
pub fn generate_salt(length: usize) -> Result<Vec<u8>> {
    let mut salt = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| Error::RandomnessUnavailable)?;
    Ok(salt)
}

/// Derive the AEAD key and nonce for one sealed box.
///
/// The salt binds both public keys into the derivation, so a blob sealed
/// to one recipient cannot be replayed against another. The nonce can be
/// derived (rather than transmitted) because the ephemeral key, and hence
/// the shared secret, is fresh for every seal.
pub fn derive_sealing_keys(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<(Zeroizing<[u8; 32]>, [u8; 12])> {
    let mut binding = [0u8; 64];
    binding[..32].copy_from_slice(ephemeral_public);
    binding[32..].copy_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(Some(&binding), shared_secret);

    let mut key = Zeroizing::new([0u8; 32]);
    hkdf.expand(domain::SEALED_BOX_KEY, &mut *key)
        .map_err(|_| Error::KeyDerivationFailed("Failed to derive sealing key".into()))?;

    let mut nonce = [0u8; 12];
    hkdf.expand(domain::SEALED_BOX_NONCE, &mut nonce)
        .map_err(|_| Error::KeyDerivationFailed("Failed to derive sealing nonce".into()))?;

    Ok((key, nonce))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_deterministic() {
        let salt = [7u8; SALT_SIZE];

        let k1 = derive_key("hunter2", &salt).unwrap();
        let k2 = derive_key("hunter2", &salt).unwrap();

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn test_different_salts_different_keys() {
        let k1 = derive_key("hunter2", &[1u8; SALT_SIZE]).unwrap();
        let k2 = derive_key("hunter2", &[2u8; SALT_SIZE]).unwrap();

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn test_different_passwords_different_keys() {
        let salt = [7u8; SALT_SIZE];

        let k1 = derive_key("hunter2", &salt).unwrap();
        let k2 = derive_key("hunter3", &salt).unwrap();

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn test_variable_length_output() {
        let salt = [7u8; SALT_SIZE];

        let k = derive("pw", &salt, 64).unwrap();
        assert_eq!(k.len(), 64);
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = derive("pw", &[7u8; SALT_SIZE], 0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_generate_salt() {
        let s1 = generate_salt(SALT_SIZE).unwrap();
        let s2 = generate_salt(SALT_SIZE).unwrap();

        assert_eq!(s1.len(), SALT_SIZE);
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_sealing_keys_bound_to_public_keys() {
        let shared = [42u8; 32];
        let eph = [1u8; 32];

        let (k1, n1) = derive_sealing_keys(&shared, &eph, &[2u8; 32]).unwrap();
        let (k2, n2) = derive_sealing_keys(&shared, &eph, &[3u8; 32]).unwrap();

        // Different recipients must see independent keys and nonces.
        assert_ne!(*k1, *k2);
        assert_ne!(n1, n2);
    }
}
