//! # Detached Signatures
//!
//! Ed25519 signatures over raw file content. The signature is computed
//! over the plaintext bytes only, so verification is completely
//! independent of the encryption layer: a package whose ciphertext was
//! mangled can still carry a valid signature over the original content,
//! and a forged signature fails even when decryption succeeds.
//!
//! `verify` never returns an error. Malformed keys, malformed
//! signatures, and honest mismatches all collapse to `false`, which is
//! the only answer a verifier needs.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};

use crate::crypto::keys::{PublicKey, SigningKeyPair};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// A detached Ed25519 signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "sig_base64")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Raw signature bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

/// Sign content with our private signing key
pub fn sign(content: &[u8], keys: &SigningKeyPair) -> Signature {
    let signature = keys.signing_key().sign(content);
    Signature(signature.to_bytes())
}

/// Verify a signature against content and a sender's public key
///
/// Returns `false` for any failure, including an unparseable public key.
pub fn verify(content: &[u8], signature: &Signature, sender: &PublicKey) -> bool {
    let verifying_key = match sender.verifying_key() {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(content, &signature).is_ok()
}

/// Serde helper for base64-encoded signatures
mod sig_base64 {
    use super::SIGNATURE_SIZE;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; SIGNATURE_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; SIGNATURE_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyPair, SUPPORTED_KEY_BITS};

    #[test]
    fn test_sign_and_verify() {
        let keys = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let content = b"hello world";

        let signature = sign(content, &keys.signing);
        assert!(verify(content, &signature, &keys.public_keys()));
    }

    #[test]
    fn test_verify_rejects_altered_content() {
        let keys = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let signature = sign(b"hello world", &keys.signing);

        assert!(!verify(b"hello w0rld", &signature, &keys.public_keys()));
    }

    #[test]
    fn test_verify_rejects_wrong_signer() {
        let alice = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let mallory = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();

        let signature = sign(b"hello world", &mallory.signing);
        assert!(!verify(b"hello world", &signature, &alice.public_keys()));
    }

    #[test]
    fn test_verify_never_panics_on_garbage_key() {
        let keys = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let signature = sign(b"hello world", &keys.signing);

        // All-ones is not a valid curve point for the verifying key
        let bogus = PublicKey::from_bytes([0xFF; 32], [0u8; 32]);
        assert!(!verify(b"hello world", &signature, &bogus));
    }

    #[test]
    fn test_verify_rejects_corrupted_signature() {
        let keys = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let mut signature = sign(b"hello world", &keys.signing);
        signature.0[0] ^= 0x01;

        assert!(!verify(b"hello world", &signature, &keys.public_keys()));
    }

    #[test]
    fn test_signature_serde_round_trip() {
        let keys = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let signature = sign(b"payload", &keys.signing);

        let json = serde_json::to_string(&signature).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(signature, back);
    }
}
