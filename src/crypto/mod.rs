//! # Cryptography Module
//!
//! All cryptographic primitives used by Sable Core.
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | Ed25519 | Identity signing | Fast, small keys, widely audited |
//! | X25519 | Key exchange | Same curve family, converted from identity |
//! | AES-256-GCM | Authenticated encryption | AEAD for seed blob and sealed boxes |
//! | AES-256-CTR | File bodies | Seekable keystream for ranged playback |
//! | Argon2id | Password KDF | Memory-hard, tunable cost |
//! | HKDF-SHA256 | Sub-key derivation | Industry standard, well-analyzed |
//! | BIP39 | Recovery phrase | User-friendly backup, standard |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: secret keys and buffers are zeroized on drop
//! 2. **Constant-Time Operations**: dalek primitives throughout
//! 3. **Secure Random**: `rand::rngs::OsRng` for all randomness
//! 4. **No Key Reuse**: fresh IVs per file, fresh ephemerals per seal

pub mod convert;
pub mod kdf;
pub mod keys;
pub mod sealing;
pub mod signing;
pub mod stream;

pub use keys::{public_key_from_hex, ExchangeKeyPair, IdentityKeyPair, PUBLIC_KEY_SIZE};
pub use sealing::{open, seal};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};
pub use stream::{
    decrypt_stream, derive_stream_key, encrypt_stream, generate_stream_key,
    SeekableCipherStream, IV_SIZE, STREAM_KEY_SIZE,
};
