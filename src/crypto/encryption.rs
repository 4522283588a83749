//! # Bulk Symmetric Encryption
//!
//! AES-256-CTR for file bodies. The stream cipher is deliberately
//! unauthenticated at this layer: tamper detection lives one level up,
//! where the decrypted bytes are compared against the signed content
//! digest. A flipped ciphertext byte therefore decrypts to garbage that
//! the digest check catches, instead of aborting the whole decryption.
//!
//! Each transfer gets a fresh random key and a fresh random IV; neither
//! is ever reused across packages.

use aes::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of a symmetric key in bytes (AES-256)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Size of the CTR initialization vector in bytes
pub const IV_SIZE: usize = 16;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

// ============================================================================
// KEY AND IV TYPES
// ============================================================================

/// A per-transfer symmetric key, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(pub(crate) [u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct a key from raw bytes (e.g. after unsealing)
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SYMMETRIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            Error::DecryptionFailed(format!(
                "symmetric key must be {} bytes, got {}",
                SYMMETRIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Raw key bytes, for sealing to a recipient
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        write!(f, "SymmetricKey([redacted])")
    }
}

/// An initialization vector for CTR mode
///
/// Not secret, but never reused with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iv(#[serde(with = "iv_base64")] pub [u8; IV_SIZE]);

impl Iv {
    /// Generate a fresh random IV
    pub fn random() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstruct an IV from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; IV_SIZE] = bytes.try_into().map_err(|_| {
            Error::DecryptionFailed(format!("IV must be {} bytes, got {}", IV_SIZE, bytes.len()))
        })?;
        Ok(Self(bytes))
    }
}

// ============================================================================
// BULK OPERATIONS
// ============================================================================

/// Encrypt file content with a fresh random IV
///
/// Returns the ciphertext and the IV used. Infallible: CTR mode accepts
/// any input length, including empty.
pub fn encrypt_bulk(content: &[u8], key: &SymmetricKey) -> (Vec<u8>, Iv) {
    let iv = Iv::random();
    let mut buffer = content.to_vec();
    let mut cipher = Aes256Ctr::new((&key.0).into(), (&iv.0).into());
    cipher.apply_keystream(&mut buffer);
    (buffer, iv)
}

/// Decrypt file content
///
/// Infallible by construction: a wrong key or tampered ciphertext yields
/// garbage bytes, which the caller's digest comparison rejects.
pub fn decrypt_bulk(ciphertext: &[u8], key: &SymmetricKey, iv: &Iv) -> Vec<u8> {
    let mut buffer = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new((&key.0).into(), (&iv.0).into());
    cipher.apply_keystream(&mut buffer);
    buffer
}

/// Serde helper for base64-encoded IVs
mod iv_base64 {
    use super::IV_SIZE;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; IV_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; IV_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("IV must be 16 bytes"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
