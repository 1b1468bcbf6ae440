//! Hashing helpers for session token storage.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
///
/// Session rows never store raw token identifiers, only this digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_distinguishes_jtis() {
        let a = sha256_hex("550e8400-e29b-41d4-a716-446655440000");
        let b = sha256_hex("550e8400-e29b-41d4-a716-446655440001");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
