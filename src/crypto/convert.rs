//! # Ed25519 → X25519 Key Conversion
//!
//! Pure, deterministic conversion of an identity (signing) keypair into a
//! Diffie-Hellman keypair on the Montgomery curve, so a single recovery
//! phrase yields an identity that can both sign and receive sealed keys.
//!
//! The secret conversion follows the standard construction: hash the
//! Ed25519 seed with SHA-512, take the first 32 bytes, and clamp them into
//! a valid X25519 scalar. The public conversion is the birational map from
//! the Edwards point to its Montgomery u-coordinate. Both halves are
//! consistent: converting the public key equals deriving the public key of
//! the converted secret.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Convert an Ed25519 secret seed into an X25519 secret scalar.
///
/// Errors only on input of the wrong length.
pub fn exchange_secret_from_identity(identity_secret: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    if identity_secret.len() != 32 {
        return Err(Error::InvalidKey(format!(
            "Identity secret must be 32 bytes, got {}",
            identity_secret.len()
        )));
    }

    let digest = Sha512::digest(identity_secret);

    let mut scalar = Zeroizing::new([0u8; 32]);
    scalar.copy_from_slice(&digest[..32]);

    // RFC 7748 clamping: clear the low 3 bits, clear the top bit,
    // set the second-highest bit.
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;

    Ok(scalar)
}

/// Convert an Ed25519 public key into an X25519 public key.
///
/// Decompresses the Edwards point and maps it to the Montgomery curve.
/// Errors on input of the wrong length or a point that does not
/// decompress.
pub fn exchange_public_from_identity(identity_public: &[u8]) -> Result<[u8; 32]> {
    if identity_public.len() != 32 {
        return Err(Error::InvalidKey(format!(
            "Identity public key must be 32 bytes, got {}",
            identity_public.len()
        )));
    }

    let edwards_point = CompressedEdwardsY::from_slice(identity_public)
        .map_err(|_| Error::InvalidKey("Invalid Edwards point encoding".into()))?
        .decompress()
        .ok_or_else(|| Error::InvalidKey("Failed to decompress Edwards point".into()))?;

    Ok(edwards_point.to_montgomery().to_bytes())
}

// ============================================================================
// TESTS
// ============================================================================
