//! # Account Profile
//!
//! Display metadata persisted alongside the account record: a name and a
//! generated avatar reference. Both are public, non-secret values.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length for the account name
pub const MAX_NAME_LENGTH: usize = 64;

/// Profile metadata stored in the account record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Human-readable account name
    pub name: String,

    /// Avatar reference (URI resolved by the UI layer)
    pub avatar: String,
}

impl Profile {
    /// Create a profile, generating the avatar from the public key.
    pub fn new(name: &str, public_key: &[u8; 32]) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            avatar: avatar_for(public_key),
        })
    }
}

/// Validate an account name (non-empty, bounded length).
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument("Account name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "Account name too long: max {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Deterministic identicon reference for a public key.
///
/// The UI resolves the `identicon:` scheme locally; nothing is fetched
/// over the network for it.
pub fn avatar_for(public_key: &[u8; 32]) -> String {
    format!("identicon:{}", hex::encode(&public_key[..16]))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_creation() {
        let profile = Profile::new("Alice", &[7u8; 32]).unwrap();
        assert_eq!(profile.name, "Alice");
        assert!(profile.avatar.starts_with("identicon:"));
    }

    #[test]
    fn test_avatar_is_deterministic() {
        assert_eq!(avatar_for(&[7u8; 32]), avatar_for(&[7u8; 32]));
        assert_ne!(avatar_for(&[7u8; 32]), avatar_for(&[8u8; 32]));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Profile::new("", &[0u8; 32]).is_err());
        assert!(Profile::new("   ", &[0u8; 32]).is_err());
    }

    #[test]
    fn test_oversized_name_rejected() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(Profile::new(&long, &[0u8; 32]).is_err());
    }
}
