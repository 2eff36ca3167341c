//! # Recovery Phrase (BIP39)
//!
//! BIP39 mnemonic phrases for identity backup and recovery.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RECOVERY PHRASE LIFECYCLE                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Generation                                                             │
//! │  ──────────                                                             │
//! │  256 bits of OS entropy + SHA-256 checksum → 24 words from the          │
//! │  standard 2048-word English list.                                       │
//! │                                                                         │
//! │  Recovery                                                               │
//! │  ────────                                                               │
//! │  Phrase is canonicalized (lowercase, single spaces), checked against    │
//! │  the word list and the embedded checksum. 12-24 word phrases            │
//! │  (128-256 bits of entropy) are accepted.                                │
//! │                                                                         │
//! │  Seed Derivation                                                        │
//! │  ───────────────                                                        │
//! │  PBKDF2-HMAC-SHA512(words, "mnemonic" + passphrase, 2048 iters)         │
//! │  → 64-byte seed. The wallet consumes seed[0..32]. Standard empty        │
//! │  passphrase extension.                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Warning
//!
//! The phrase fully recovers the user's identity. Show it once, never log
//! it, never store it in plaintext. At rest it only exists inside the
//! password-encrypted seed blob.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroizing, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Number of words in a freshly generated phrase (256-bit entropy)
pub const GENERATED_WORD_COUNT: usize = 24;

/// Entropy size in bytes for a generated phrase
const ENTROPY_BYTES: usize = 32;

/// A validated BIP39 recovery phrase
#[derive(ZeroizeOnDrop)]
pub struct RecoveryPhrase {
    #[zeroize(skip)] // bip39::Mnemonic doesn't implement Zeroize
    mnemonic: Mnemonic,
}

impl RecoveryPhrase {
    /// Generate a new random 24-word recovery phrase.
    pub fn generate() -> Result<Self> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        OsRng
            .try_fill_bytes(&mut *entropy)
            .map_err(|_| Error::RandomnessUnavailable)?;

        let mnemonic = Mnemonic::from_entropy(&*entropy)
            .map_err(|e| Error::InvalidPhrase(format!("Failed to generate mnemonic: {}", e)))?;

        Ok(Self { mnemonic })
    }

    /// Parse and validate a recovery phrase.
    ///
    /// The input is canonicalized first: lowercased, surrounding
    /// whitespace stripped, inner whitespace collapsed to single spaces.
    /// Word-list membership and the embedded checksum are then verified.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let canonical = Self::canonicalize(phrase);

        let mnemonic = Mnemonic::parse_normalized(&canonical)
            .map_err(|e| Error::InvalidPhrase(e.to_string()))?;

        Ok(Self { mnemonic })
    }

    /// Canonical form: normalized lowercase, space-joined.
    pub fn canonicalize(phrase: &str) -> String {
        phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of words in this phrase
    pub fn word_count(&self) -> usize {
        self.mnemonic.word_count()
    }

    /// The phrase as a single space-joined string.
    ///
    /// Only for display to the user and for at-rest encryption. Never log.
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.mnemonic.to_string())
    }

    /// Derive the 64-byte BIP39 seed with the empty passphrase extension.
    pub fn to_seed(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.mnemonic.to_seed(""))
    }

    /// Validate a phrase without keeping it around. Useful for UI checks
    /// before submission.
    pub fn validate(phrase: &str) -> Result<()> {
        Self::from_phrase(phrase)?;
        Ok(())
    }

    /// Check whether a single word is in the BIP39 wordlist.
    pub fn is_valid_word(word: &str) -> bool {
        let word_lower = word.to_lowercase();
        Language::English
            .word_list()
            .iter()
            .any(|w| *w == word_lower)
    }

    /// Wordlist entries starting with `prefix`, for autocomplete. Capped
    /// at 10 suggestions.
    pub fn suggest_words(prefix: &str) -> Vec<&'static str> {
        if prefix.is_empty() {
            return vec![];
        }

        let prefix_lower = prefix.to_lowercase();
        let mut suggestions = Vec::new();

        for word in Language::English.word_list().iter() {
            if word.starts_with(&prefix_lower) {
                suggestions.push(*word);
                if suggestions.len() >= 10 {
                    break;
                }
            }
        }

        suggestions
    }
}

// Prevent accidental logging
impl std::fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoveryPhrase([REDACTED])")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE_12: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_recovery_phrase() {
        let phrase = RecoveryPhrase::generate().unwrap();
        assert_eq!(phrase.word_count(), GENERATED_WORD_COUNT);
    }

    #[test]
    fn test_parse_valid_12_word_phrase() {
        let phrase = RecoveryPhrase::from_phrase(TEST_PHRASE_12).unwrap();
        assert_eq!(phrase.word_count(), 12);
    }

    #[test]
    fn test_canonicalization_accepts_messy_input() {
        let messy = "  Abandon ABANDON abandon\tabandon abandon abandon abandon abandon abandon abandon abandon about ";
        let phrase = RecoveryPhrase::from_phrase(messy).unwrap();
        assert_eq!(&*phrase.phrase(), TEST_PHRASE_12);
    }

    #[test]
    fn test_parse_invalid_word_fails() {
        let invalid = TEST_PHRASE_12.replace("about", "notaword");
        assert!(matches!(
            RecoveryPhrase::from_phrase(&invalid),
            Err(Error::InvalidPhrase(_))
        ));
    }

    #[test]
    fn test_bad_checksum_fails() {
        // Valid words, invalid checksum (last word swapped).
        let bad = TEST_PHRASE_12.replace("about", "abandon");
        assert!(matches!(
            RecoveryPhrase::from_phrase(&bad),
            Err(Error::InvalidPhrase(_))
        ));
    }

    #[test]
    fn test_wrong_word_count_fails() {
        assert!(RecoveryPhrase::from_phrase("abandon abandon abandon").is_err());
    }

    #[test]
    fn test_seed_derivation_deterministic() {
        let p1 = RecoveryPhrase::from_phrase(TEST_PHRASE_12).unwrap();
        let p2 = RecoveryPhrase::from_phrase(TEST_PHRASE_12).unwrap();

        assert_eq!(*p1.to_seed(), *p2.to_seed());
    }

    #[test]
    fn test_different_phrases_different_seeds() {
        let p1 = RecoveryPhrase::generate().unwrap();
        let p2 = RecoveryPhrase::generate().unwrap();

        assert_ne!(*p1.to_seed(), *p2.to_seed());
    }

    #[test]
    fn test_round_trip_through_string() {
        let original = RecoveryPhrase::generate().unwrap();
        let restored = RecoveryPhrase::from_phrase(&original.phrase()).unwrap();

        assert_eq!(*original.to_seed(), *restored.to_seed());
    }

    #[test]
    fn test_is_valid_word() {
        assert!(RecoveryPhrase::is_valid_word("abandon"));
        assert!(RecoveryPhrase::is_valid_word("ZOO"));
        assert!(!RecoveryPhrase::is_valid_word("notaword"));
    }

    #[test]
    fn test_suggest_words() {
        let suggestions = RecoveryPhrase::suggest_words("ab");
        assert!(suggestions.contains(&"abandon"));
        assert!(suggestions.contains(&"ability"));
        assert!(RecoveryPhrase::suggest_words("").is_empty());
    }

    #[test]
    fn test_debug_redacts() {
        let phrase = RecoveryPhrase::generate().unwrap();
        let debug = format!("{:?}", phrase);
        assert!(debug.contains("REDACTED"));
    }
}
