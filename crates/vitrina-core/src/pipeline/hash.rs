//! Content hashing for content-addressed storage keys.

use blake3::Hasher as Blake3Hasher;

/// BLAKE3 content hashing.
pub struct Hasher;

impl Hasher {
    /// Hash an in-memory buffer, returning lowercase hex.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_and_stable() {
        let a = Hasher::content_hash_from_bytes(b"listing photo");
        let b = Hasher::content_hash_from_bytes(b"listing photo");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, Hasher::content_hash_from_bytes(b"other photo"));
    }
}
