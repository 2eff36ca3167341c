//! # Account Manager
//!
//! Orchestrates the wallet, KDF, credential store, and record store into a
//! stateful identity session.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ACCOUNT LIFECYCLE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │                 init_account                                            │
//! │  Uninitialized ──────────────────────────────┐                          │
//! │   (no record)                                │                          │
//! │       ▲                                      ▼                          │
//! │       │ reset                            Unlocked                       │
//! │       │                                (Wallet in memory)               │
//! │       │                                  │       ▲                      │
//! │       │                             lock │       │ unlock /             │
//! │       │                                  ▼       │ unlock_auto          │
//! │       └────────────────────────────── Locked ────┘                      │
//! │                                  (record only, no Wallet)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The in-memory wallet is a single `RwLock<Option<Wallet>>`. Readers
//! (`sign`, `open_sealed`, `is_locked`) share the lock; mutators
//! (`init_account`, `unlock`, `lock`, `reset`, `change_password`)
//! serialize on it. The KDF is intentionally slow, so it always runs
//! *before* the exclusive lock is taken; concurrent readers never wait on
//! a key derivation.
//!
//! ## Failure Discipline
//!
//! Mutating operations build the complete replacement record before the
//! single store write, so persisted state is never half-updated. Every
//! unlock failure past "no account exists" is reported as
//! [`Error::InvalidPassword`]: wrong password and corrupted blob are
//! deliberately indistinguishable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::convert;
use crate::crypto::kdf;
use crate::crypto::sealing;
use crate::crypto::signing::{self, Signature};
use crate::error::{Error, Result};
use crate::identity::{Profile, RecoveryPhrase, Wallet};
use crate::storage::{auth_lock, AccountRecord, AccountStore};

/// Size of the AES-GCM nonce prefixed to the encrypted seed blob
const SEED_NONCE_SIZE: usize = 12;

/// Stateful identity session over a record store and a data directory.
///
/// Construct one per process and pass it explicitly to every consumer.
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
    data_dir: PathBuf,
    wallet: RwLock<Option<Wallet>>,
}

impl AccountManager {
    /// Create an account manager over a record store.
    ///
    /// `data_dir` is the application data directory holding the optional
    /// `auth.lock` record.
    pub fn new(store: Arc<dyn AccountStore>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            wallet: RwLock::new(None),
        }
    }

    // ========================================================================
    // STATE INSPECTION
    // ========================================================================

    /// Whether no wallet is currently held in memory.
    pub fn is_locked(&self) -> bool {
        self.wallet.read().is_none()
    }

    /// Whether a persisted account record exists.
    pub fn has_account(&self) -> Result<bool> {
        Ok(self.store.get_account()?.is_some())
    }

    /// The unlocked identity's public key.
    pub fn public_key(&self) -> Result<[u8; 32]> {
        let guard = self.wallet.read();
        let wallet = guard.as_ref().ok_or(Error::WalletLocked)?;
        Ok(wallet.public_key())
    }

    /// The data directory this manager was constructed with.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ========================================================================
    // LIFECYCLE TRANSITIONS
    // ========================================================================

    /// Create (or replace) the account from a recovery phrase.
    ///
    /// Validates the phrase, derives the wallet, encrypts the phrase under
    /// a fresh salt and the password, persists the account record, and
    /// only then installs the wallet. Any prior account row is replaced,
    /// and any stale auth lock is cleared since it encodes a previous
    /// password.
    pub fn init_account(
        &self,
        phrase: &str,
        password: &str,
        name: &str,
    ) -> Result<AccountRecord> {
        let recovery = RecoveryPhrase::from_phrase(phrase)?;
        let wallet = Wallet::from_recovery_phrase(&recovery);
        let public_key = wallet.public_key();
        let profile = Profile::new(name, &public_key)?;

        // Expensive work happens before the exclusive lock.
        let salt = kdf::generate_salt(kdf::SALT_SIZE)?;
        let key = kdf::derive_key(password, &salt)?;
        let encrypted_seed = encrypt_phrase(&key, &recovery.phrase())?;

        let record = AccountRecord {
            public_key: hex::encode(public_key),
            name: profile.name,
            avatar: profile.avatar,
            encrypted_seed,
            salt: hex::encode(&salt),
            created_at: chrono::Utc::now().timestamp(),
        };

        let mut guard = self.wallet.write();
        self.store.put_account(&record)?;
        auth_lock::clear(&self.data_dir)?;
        *guard = Some(wallet);

        tracing::info!(public_key = %record.public_key, "Account initialized");
        Ok(record)
    }

    /// Unlock the account with a password.
    ///
    /// On failure the session stays locked. Wrong password and corrupted
    /// stored data both surface as [`Error::InvalidPassword`].
    pub fn unlock(&self, password: &str) -> Result<()> {
        let record = self.store.get_account()?.ok_or(Error::NoAccount)?;

        let salt = hex::decode(&record.salt).map_err(|_| Error::InvalidPassword)?;
        let key = kdf::derive_key(password, &salt)?;

        let phrase = decrypt_phrase(&key, &record.encrypted_seed)?;
        let recovery =
            RecoveryPhrase::from_phrase(&phrase).map_err(|_| Error::InvalidPassword)?;
        let wallet = Wallet::from_recovery_phrase(&recovery);

        // The recovered identity must be the one the record was written
        // for; a mismatch means the row was corrupted or swapped.
        if hex::encode(wallet.public_key()) != record.public_key {
            return Err(Error::InvalidPassword);
        }

        *self.wallet.write() = Some(wallet);
        tracing::info!("Account unlocked");
        Ok(())
    }

    /// Unlock using the persisted auth lock record ("remember me").
    pub fn unlock_auto(&self) -> Result<()> {
        let password = auth_lock::load(&self.data_dir)?;
        self.unlock(&password)
    }

    /// Enable or disable password-less unlock on this machine.
    ///
    /// Enabling writes the raw password to the locally-obfuscated
    /// `auth.lock` record; see [`crate::storage::auth_lock`] for what that
    /// does and does not protect against.
    pub fn set_auto_unlock(&self, password: &str, enabled: bool) -> Result<()> {
        if enabled {
            auth_lock::save(&self.data_dir, password)
        } else {
            auth_lock::clear(&self.data_dir)
        }
    }

    /// Lock the session: discard the in-memory wallet and the auth lock.
    ///
    /// Persisted account data is untouched.
    pub fn lock(&self) -> Result<()> {
        *self.wallet.write() = None;
        auth_lock::clear(&self.data_dir)?;
        tracing::info!("Account locked");
        Ok(())
    }

    /// Destroy the account: wallet, account record, and auth lock.
    pub fn reset(&self) -> Result<()> {
        let mut guard = self.wallet.write();
        *guard = None;
        self.store.delete_account()?;
        auth_lock::clear(&self.data_dir)?;

        tracing::info!("Account reset");
        Ok(())
    }

    /// Re-encrypt the stored recovery phrase under a new password.
    ///
    /// Requires successful decryption under `old`. The replacement record
    /// is fully constructed before the single store write, so the old
    /// blob is never left half-replaced. The auth lock is cleared because
    /// it encodes the old password.
    pub fn change_password(&self, old: &str, new: &str) -> Result<()> {
        let record = self.store.get_account()?.ok_or(Error::NoAccount)?;

        let old_salt = hex::decode(&record.salt).map_err(|_| Error::InvalidPassword)?;
        let old_key = kdf::derive_key(old, &old_salt)?;
        let phrase = decrypt_phrase(&old_key, &record.encrypted_seed)?;

        let new_salt = kdf::generate_salt(kdf::SALT_SIZE)?;
        let new_key = kdf::derive_key(new, &new_salt)?;
        let encrypted_seed = encrypt_phrase(&new_key, &phrase)?;

        let new_record = AccountRecord {
            encrypted_seed,
            salt: hex::encode(&new_salt),
            ..record
        };

        let _guard = self.wallet.write();
        self.store.put_account(&new_record)?;
        auth_lock::clear(&self.data_dir)?;

        tracing::info!("Account password changed");
        Ok(())
    }

    /// Decrypt and return the recovery phrase.
    ///
    /// Always re-validates the password (an unlocked session is not
    /// trusted for this) and mutates no state.
    pub fn export_mnemonic(&self, password: &str) -> Result<Zeroizing<String>> {
        let record = self.store.get_account()?.ok_or(Error::NoAccount)?;

        let salt = hex::decode(&record.salt).map_err(|_| Error::InvalidPassword)?;
        let key = kdf::derive_key(password, &salt)?;

        decrypt_phrase(&key, &record.encrypted_seed)
    }

    // ========================================================================
    // CRYPTOGRAPHIC OPERATIONS
    // ========================================================================

    /// Sign arbitrary bytes with the unlocked identity.
    pub fn sign(&self, data: &[u8]) -> Result<Signature> {
        let guard = self.wallet.read();
        let wallet = guard.as_ref().ok_or(Error::WalletLocked)?;
        Ok(wallet.sign(data))
    }

    /// Open a sealed blob addressed to the unlocked identity.
    pub fn open_sealed(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let guard = self.wallet.read();
        let wallet = guard.as_ref().ok_or(Error::WalletLocked)?;
        wallet.open_sealed(blob)
    }

    /// Seal a secret (typically a stream key) to a recipient identified
    /// by their identity public key. Stateless and sender-anonymous; does
    /// not require an unlocked session.
    pub fn seal_for(recipient_identity_public: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
        let exchange_public = convert::exchange_public_from_identity(recipient_identity_public)?;
        sealing::seal(&exchange_public, plaintext)
    }

    /// Verify a signature. Stateless; needs no secret and works in any
    /// lock state.
    pub fn verify(data: &[u8], signature: &Signature, public_key: &[u8; 32]) -> Result<()> {
        signing::verify(public_key, data, signature)
    }
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("data_dir", &self.data_dir)
            .field("locked", &self.is_locked())
            .finish()
    }
}

// ============================================================================
// SEED BLOB ENCODING
// ============================================================================

/// Encrypt the recovery phrase into base64(`nonce ‖ ciphertext`).
fn encrypt_phrase(key: &[u8; 32], phrase: &str) -> Result<String> {
    let mut nonce = [0u8; SEED_NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| Error::RandomnessUnavailable)?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::InvalidKey(format!("Invalid seed key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), phrase.as_bytes())
        .map_err(|_| Error::AuthenticationFailed)?;

    let mut blob = Vec::with_capacity(SEED_NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(blob))
}

/// Decrypt base64(`nonce ‖ ciphertext`) back into the recovery phrase.
///
/// Every failure mode maps to [`Error::InvalidPassword`]; see module docs.
fn decrypt_phrase(key: &[u8; 32], encoded: &str) -> Result<Zeroizing<String>> {
    let blob = BASE64.decode(encoded).map_err(|_| Error::InvalidPassword)?;
    if blob.len() < SEED_NONCE_SIZE {
        return Err(Error::InvalidPassword);
    }

    let (nonce, ciphertext) = blob.split_at(SEED_NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::InvalidKey(format!("Invalid seed key: {}", e)))?;

    let plaintext = cipher
        .decrypt(AesNonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::InvalidPassword)?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|_| Error::InvalidPassword)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    const TEST_PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn manager() -> (AccountManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Database::open(None).unwrap());
        (AccountManager::new(store, dir.path()), dir)
    }

    #[test]
    fn test_init_unlock_lifecycle() {
        let (mgr, _dir) = manager();

        assert!(!mgr.has_account().unwrap());
        assert!(mgr.is_locked());

        let record = mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        assert!(!mgr.is_locked());
        assert_eq!(record.name, "Alice");

        // Public key in the record matches the wallet's.
        assert_eq!(hex::encode(mgr.public_key().unwrap()), record.public_key);

        mgr.lock().unwrap();
        assert!(mgr.is_locked());

        // Wrong password fails and the state stays locked.
        let result = mgr.unlock("wrong");
        assert!(matches!(result, Err(Error::InvalidPassword)));
        assert!(mgr.is_locked());

        mgr.unlock("pw1").unwrap();
        assert!(!mgr.is_locked());
        assert_eq!(hex::encode(mgr.public_key().unwrap()), record.public_key);
    }

    #[test]
    fn test_init_rejects_bad_phrase() {
        let (mgr, _dir) = manager();

        let result = mgr.init_account("definitely not a phrase", "pw", "Alice");
        assert!(matches!(result, Err(Error::InvalidPhrase(_))));
        assert!(!mgr.has_account().unwrap());
    }

    #[test]
    fn test_unlock_without_account() {
        let (mgr, _dir) = manager();

        let result = mgr.unlock("pw");
        assert!(matches!(result, Err(Error::NoAccount)));
    }

    #[test]
    fn test_change_password() {
        let (mgr, _dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        mgr.lock().unwrap();

        mgr.change_password("pw1", "pw2").unwrap();

        assert!(matches!(mgr.unlock("pw1"), Err(Error::InvalidPassword)));
        mgr.unlock("pw2").unwrap();
    }

    #[test]
    fn test_change_password_requires_old_password() {
        let (mgr, _dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();

        let result = mgr.change_password("wrong", "pw2");
        assert!(matches!(result, Err(Error::InvalidPassword)));

        // The stored blob is unchanged.
        mgr.lock().unwrap();
        mgr.unlock("pw1").unwrap();
    }

    #[test]
    fn test_export_mnemonic_revalidates_password() {
        let (mgr, _dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();

        // Session is unlocked, but a wrong password must still fail.
        assert!(matches!(
            mgr.export_mnemonic("wrong"),
            Err(Error::InvalidPassword)
        ));

        let phrase = mgr.export_mnemonic("pw1").unwrap();
        assert_eq!(&**phrase, TEST_PHRASE);
        assert!(!mgr.is_locked());
    }

    #[test]
    fn test_sign_and_open_require_unlock() {
        let (mgr, _dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();

        let signature = mgr.sign(b"payload").unwrap();
        let public_key = mgr.public_key().unwrap();
        AccountManager::verify(b"payload", &signature, &public_key).unwrap();

        mgr.lock().unwrap();
        assert!(matches!(mgr.sign(b"payload"), Err(Error::WalletLocked)));
        assert!(matches!(mgr.open_sealed(b"blob"), Err(Error::WalletLocked)));

        // Verification is stateless and still works while locked.
        AccountManager::verify(b"payload", &signature, &public_key).unwrap();
    }

    #[test]
    fn test_seal_for_and_open_sealed() {
        let (mgr, _dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();

        let recipient = mgr.public_key().unwrap();
        let stream_key = [0x5A; 32];

        let blob = AccountManager::seal_for(&recipient, &stream_key).unwrap();
        let opened = mgr.open_sealed(&blob).unwrap();

        assert_eq!(&*opened, &stream_key);
    }

    #[test]
    fn test_reset_destroys_everything() {
        let (mgr, dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        mgr.set_auto_unlock("pw1", true).unwrap();

        mgr.reset().unwrap();

        assert!(mgr.is_locked());
        assert!(!mgr.has_account().unwrap());
        assert!(!auth_lock::exists(dir.path()));
        assert!(matches!(mgr.unlock("pw1"), Err(Error::NoAccount)));
    }

    #[test]
    fn test_auto_unlock() {
        let (mgr, dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        mgr.set_auto_unlock("pw1", true).unwrap();

        // Simulate an app restart: fresh manager over the same store dir.
        let restarted = AccountManager {
            store: mgr.store.clone(),
            data_dir: dir.path().to_path_buf(),
            wallet: RwLock::new(None),
        };
        restarted.unlock_auto().unwrap();
        assert!(!restarted.is_locked());

        // Explicit lock clears the auth lock record.
        restarted.lock().unwrap();
        assert!(!auth_lock::exists(dir.path()));
        assert!(matches!(
            restarted.unlock_auto(),
            Err(Error::AuthLockNotFound)
        ));
    }

    #[test]
    fn test_disable_auto_unlock() {
        let (mgr, dir) = manager();
        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();

        mgr.set_auto_unlock("pw1", true).unwrap();
        assert!(auth_lock::exists(dir.path()));

        mgr.set_auto_unlock("pw1", false).unwrap();
        assert!(!auth_lock::exists(dir.path()));
    }

    #[test]
    fn test_init_replaces_prior_account() {
        let (mgr, _dir) = manager();

        mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        let first_key = mgr.public_key().unwrap();

        let (_, phrase) = Wallet::generate().unwrap();
        mgr.init_account(&phrase.phrase(), "pw2", "Bob").unwrap();

        let second_key = mgr.public_key().unwrap();
        assert_ne!(first_key, second_key);

        // Only the new account exists; the old password is useless.
        mgr.lock().unwrap();
        assert!(matches!(mgr.unlock("pw1"), Err(Error::InvalidPassword)));
        mgr.unlock("pw2").unwrap();
    }

    #[test]
    fn test_corrupted_blob_is_indistinguishable_from_wrong_password() {
        let (mgr, _dir) = manager();
        let record = mgr.init_account(TEST_PHRASE, "pw1", "Alice").unwrap();
        mgr.lock().unwrap();

        // Corrupt one ciphertext byte and write the record back.
        let mut blob = BASE64.decode(&record.encrypted_seed).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let corrupted = AccountRecord {
            encrypted_seed: BASE64.encode(blob),
            ..record
        };
        mgr.store.put_account(&corrupted).unwrap();

        // Correct password, corrupt data: same error as a wrong password.
        let result = mgr.unlock("pw1");
        assert!(matches!(result, Err(Error::InvalidPassword)));
    }
}
