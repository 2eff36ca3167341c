//! # Auth Lock ("remember me")
//!
//! Optional on-disk record that lets a trusted local machine skip manual
//! unlock. It stores the raw password (deliberately: only the raw password
//! can drive a true auto-unlock) encrypted under a key compiled into the
//! binary.
//!
//! The embedded key is NOT a secret and NOT a security boundary: anyone
//! with file-system access and a copy of the binary can recover the
//! password. It exists solely to deter casual inspection of the data
//! directory. Users who don't accept that trade simply never enable
//! "remember me".

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Fixed filename of the auth lock record inside the data directory
pub const AUTH_LOCK_FILE: &str = "auth.lock";

/// Build-time obfuscation key. Non-secret by design; see module docs.
const LOCAL_OBFUSCATION_KEY: [u8; 32] = *b"sable.auth.lock.obfuscation.v01!";

/// Size of the AES-GCM nonce
const NONCE_SIZE: usize = 12;

/// On-disk shape of the auth lock record.
///
/// `salt` is present for format compatibility but unused by the current
/// scheme (reserved).
#[derive(Serialize, Deserialize)]
struct AuthLockRecord {
    salt: String,
    encrypted_key: String,
    nonce: String,
}

/// Encrypt and persist `raw_secret` to `<dir>/auth.lock`.
pub fn save(dir: &Path, raw_secret: &str) -> Result<()> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| Error::RandomnessUnavailable)?;

    let cipher = Aes256Gcm::new_from_slice(&LOCAL_OBFUSCATION_KEY)
        .map_err(|e| Error::InvalidKey(format!("Invalid obfuscation key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), raw_secret.as_bytes())
        .map_err(|_| Error::AuthenticationFailed)?;

    let record = AuthLockRecord {
        salt: String::new(),
        encrypted_key: hex::encode(&ciphertext),
        nonce: hex::encode(nonce),
    };

    std::fs::write(dir.join(AUTH_LOCK_FILE), serde_json::to_vec(&record)?)?;
    Ok(())
}

/// Load and decrypt the auth lock record from `<dir>/auth.lock`.
///
/// Returns [`Error::AuthLockNotFound`] if no record exists and
/// [`Error::AuthenticationFailed`] if the record does not decrypt.
pub fn load(dir: &Path) -> Result<Zeroizing<String>> {
    let path = dir.join(AUTH_LOCK_FILE);

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::AuthLockNotFound)
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let record: AuthLockRecord =
        serde_json::from_slice(&bytes).map_err(|_| Error::AuthenticationFailed)?;

    let nonce = hex::decode(&record.nonce).map_err(|_| Error::AuthenticationFailed)?;
    let ciphertext =
        hex::decode(&record.encrypted_key).map_err(|_| Error::AuthenticationFailed)?;

    if nonce.len() != NONCE_SIZE {
        return Err(Error::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(&LOCAL_OBFUSCATION_KEY)
        .map_err(|e| Error::InvalidKey(format!("Invalid obfuscation key: {}", e)))?;

    let plaintext = cipher
        .decrypt(AesNonce::from_slice(&nonce), ciphertext.as_slice())
        .map_err(|_| Error::AuthenticationFailed)?;

    let secret =
        String::from_utf8(plaintext).map_err(|_| Error::AuthenticationFailed)?;

    Ok(Zeroizing::new(secret))
}

/// Delete the auth lock record. Idempotent: no error if absent.
pub fn clear(dir: &Path) -> Result<()> {
    match std::fs::remove_file(dir.join(AUTH_LOCK_FILE)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Whether an auth lock record exists.
pub fn exists(dir: &Path) -> bool {
    dir.join(AUTH_LOCK_FILE).exists()
}

// ============================================================================
// TESTS
// ============================================================================
