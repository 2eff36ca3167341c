//! # Error Handling
//!
//! This module provides the error types for Sable Core.
//!
//! Errors are grouped by domain (identity, crypto, stream cipher, storage)
//! and deliberately coarse at the security boundaries: a failed unlock is
//! always [`Error::InvalidPassword`], whether the password was wrong or the
//! stored blob was corrupted, and a failed sealed-box open is always
//! [`Error::AuthenticationFailed`]. Distinguishing the two would hand an
//! attacker probing the credential store an oracle.

use thiserror::Error;

/// Result type alias for Sable Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Sable Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Identity / Account Errors
    // ========================================================================

    /// The recovery phrase failed validation (word list or checksum)
    #[error("Invalid recovery phrase: {0}")]
    InvalidPhrase(String),

    /// Wrong password, or the stored credential blob failed authentication.
    /// The two cases are intentionally indistinguishable.
    #[error("Invalid password")]
    InvalidPassword,

    /// The operation requires an unlocked wallet
    #[error("Wallet is locked")]
    WalletLocked,

    /// No account record has been created yet
    #[error("No account exists")]
    NoAccount,

    // ========================================================================
    // Crypto Errors
    // ========================================================================

    /// Authenticated decryption failed (tampered ciphertext or wrong key)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Invalid key material (wrong length or malformed point)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    VerificationFailed,

    /// The system entropy source failed. Fatal, non-retryable in practice.
    #[error("System randomness source unavailable")]
    RandomnessUnavailable,

    // ========================================================================
    // Stream Cipher Errors
    // ========================================================================

    /// The encrypted stream is malformed (e.g. shorter than its IV header)
    #[error("Corrupt cipher stream: {0}")]
    CorruptStream(String),

    /// A seek resolved to a negative logical offset
    #[error("Seek to a negative offset")]
    InvalidOffset,

    /// An argument was out of range for the operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // Storage Errors
    // ========================================================================

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// No auth lock record exists on disk
    #[error("Auth lock not found")]
    AuthLockNotFound,

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Bridge into `std::io::Error` so the stream cipher can surface crate
/// errors through the `Read`/`Seek` trait methods.
impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io) => io,
            Error::InvalidOffset | Error::InvalidArgument(_) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
            }
            Error::CorruptStream(_) => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
