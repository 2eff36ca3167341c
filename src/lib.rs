//! # Sable Core
//!
//! Cryptographic identity and confidentiality core for the Sable P2P
//! file-sharing client. Every user is a keypair derived from a recoverable
//! phrase; files shared privately are decryptable only by their designated
//! recipient, even though the content-addressed blob network underneath is
//! public and untrusted.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SABLE CORE MODULES                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────── account ─────────────────────────────┐   │
//! │  │  AccountManager: locked/unlocked session, sign, seal, unseal     │   │
//! │  └──────┬──────────────────────┬──────────────────────┬────────────┘   │
//! │         │                      │                      │                 │
//! │         ▼                      ▼                      ▼                 │
//! │  ┌────────────┐         ┌────────────┐         ┌────────────┐          │
//! │  │  identity  │         │   crypto   │         │  storage   │          │
//! │  │            │         │            │         │            │          │
//! │  │ - Recovery │         │ - KDF      │         │ - Record   │          │
//! │  │   phrase   │         │ - Convert  │         │   store    │          │
//! │  │ - Wallet   │         │ - Sealing  │         │ - Auth     │          │
//! │  │ - Profile  │         │ - Stream   │         │   lock     │          │
//! │  └────────────┘         └────────────┘         └────────────┘          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Flow
//!
//! ```text
//! password ──► Argon2id ──► unlocks encrypted seed blob
//!                                   │
//!                                   ▼
//! recovery phrase ──► BIP39 seed ──► Ed25519 identity keypair
//!                                   │
//!                                   ▼ one-way conversion
//!                          X25519 exchange keypair
//!                                   │
//!                 ┌─────────────────┴──────────────────┐
//!                 ▼                                    ▼
//!        sealed session keys              AES-256-CTR stream keys
//!        (private file sharing)           (file-body encryption,
//!                                          seekable decryption)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use sable_core::{AccountManager, Database, Wallet};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Database::open(Some("records.db"))?);
//! let manager = AccountManager::new(store, "/var/lib/sable");
//!
//! let (_, phrase) = Wallet::generate()?;
//! manager.init_account(&phrase.phrase(), "password", "Alice")?;
//!
//! let signature = manager.sign(b"announcement")?;
//! ```
//!
//! This crate never initiates network calls: callers hand it byte streams
//! to encrypt or decrypt, and a record store to persist small blobs in.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod account;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use account::AccountManager;
pub use crypto::{SeekableCipherStream, Signature};
pub use error::{Error, Result};
pub use identity::{RecoveryPhrase, Wallet};
pub use storage::{AccountRecord, AccountStore, Database};
