//! # Credentials
//!
//! Subscription keys in this deployment are exactly 32 characters. An empty
//! key is also accepted: it means "browse the catalog without a key", which
//! works because the languages resource is anonymous.

use crate::error::SessionError;

pub const KEY_LENGTH: usize = 32;

/// Stands in for an empty key so the translator client can still be built.
pub const PLACEHOLDER_KEY: &str = "00000000000000000000000000000000";

/// Accepts `""` or a key of exactly [`KEY_LENGTH`] characters.
pub fn validate_key(key: &str) -> Result<(), SessionError> {
    let length = key.chars().count();
    if length == 0 || length == KEY_LENGTH {
        Ok(())
    } else {
        Err(SessionError::InvalidCredential { length })
    }
}

/// The key the translator client is built with: the placeholder when the
/// user left the field empty, the user's key otherwise.
pub fn effective_key(key: &str) -> &str {
    if key.is_empty() { PLACEHOLDER_KEY } else { key }
}

/// Masks all but the last four characters for display and logs.
pub fn redact(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_a_valid_key() {
        assert_eq!(PLACEHOLDER_KEY.chars().count(), KEY_LENGTH);
        assert!(validate_key(PLACEHOLDER_KEY).is_ok());
    }

    #[test]
    fn test_validate_key_accepts_empty_and_exact_length() {
        assert!(validate_key("").is_ok());
        assert!(validate_key(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_key_rejects_every_other_length() {
        for len in (1..=64).filter(|&l| l != KEY_LENGTH) {
            let key = "k".repeat(len);
            assert_eq!(
                validate_key(&key),
                Err(SessionError::InvalidCredential { length: len }),
                "length {len} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_key_counts_characters_not_bytes() {
        // 32 two-byte characters
        let key = "é".repeat(32);
        assert_eq!(key.len(), 64);
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_effective_key_substitutes_placeholder() {
        assert_eq!(effective_key(""), PLACEHOLDER_KEY);
        let real = "f".repeat(32);
        assert_eq!(effective_key(&real), real);
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact(""), "");
        assert_eq!(redact("abc"), "***");
        assert_eq!(redact("abcdefgh"), "****efgh");
    }
}
