//! SHA-256 content digests.
//!
//! The digest serves two roles in the protocol: it is the integrity value
//! the receiver recomputes after decryption, and it is what the sender's
//! signature conceptually commits to. It travels hex-encoded in the clear.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::{Error, Result};

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// A SHA-256 digest over plaintext content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDigest(#[serde(with = "digest_hex")] pub [u8; DIGEST_SIZE]);

impl ContentDigest {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Encode as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::SerializationError(format!("Invalid digest hex: {}", e)))?;
        let bytes: [u8; DIGEST_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::SerializationError("Digest must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }
}

/// Hash content with SHA-256
///
/// Deterministic: identical byte sequences always produce identical
/// digests.
pub fn hash(content: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(content);
    ContentDigest(hasher.finalize().into())
}

/// Serde helper for digest bytes as hex
mod digest_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid digest length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash(b"hello world"), hash(b"hello world"));
    }

    #[test]
    fn test_hash_differs_on_different_content() {
        assert_ne!(hash(b"hello world"), hash(b"hello worlD"));
        assert_ne!(hash(b""), hash(b"x"));
    }

    #[test]
    fn test_hex_round_trip() {
        let digest = hash(b"some content");
        let restored = ContentDigest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, restored);
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            hash(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
