//! # Hybrid Encryption Pipeline
//!
//! The full package construction and its inverse:
//!
//! ```text
//! hybrid_encrypt                       hybrid_decrypt
//! ==============                       ==============
//! fresh symmetric key                  open sealed key
//!   |                                    |
//! encrypt content (AES-CTR)           decrypt content (AES-CTR)
//!   |                                    |
//! seal key for recipient              verify signature   (independent)
//!   |                                  recompute digest   (independent)
//! digest + sign plaintext               |
//!   |                                  assemble verdict
//! EncryptedPackage                     DecryptionResult
//! ```
//!
//! Decryption distinguishes two failure shapes. A hard failure (wrong
//! private key, malformed package) yields no content at all. A soft
//! failure (signature mismatch, digest mismatch) still yields the
//! decrypted bytes plus per-check verdicts, leaving the disposition to
//! the operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::digest::{self, ContentDigest};
use crate::crypto::encryption::{self, Iv, SymmetricKey};
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::crypto::sealing;
use crate::crypto::signing::{self, Signature};
use crate::error::{Error, Result};

// ============================================================================
// PACKAGE TYPES
// ============================================================================

/// Descriptive metadata carried alongside the ciphertext
///
/// Informational only; none of these fields are covered by the signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Original file name
    pub file_name: String,
    /// Plaintext size in bytes
    pub file_size: u64,
    /// When the package was created (RFC 3339 on the wire)
    pub timestamp: DateTime<Utc>,
}

/// Everything a recipient needs to decrypt and verify one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPackage {
    /// File body encrypted with the per-transfer symmetric key
    #[serde(with = "bytes_base64")]
    pub encrypted_file: Vec<u8>,

    /// The symmetric key, sealed to the recipient's public key
    #[serde(with = "bytes_base64")]
    pub encrypted_sym_key: Vec<u8>,

    /// CTR initialization vector
    pub iv: Iv,

    /// Sender's signature over the plaintext content
    pub signature: Signature,

    /// SHA-256 digest of the plaintext content
    pub file_hash: ContentDigest,

    /// Descriptive metadata
    #[serde(flatten)]
    pub metadata: FileMetadata,
}

/// Outcome of a decryption attempt
///
/// `success` reflects only whether usable bytes were produced. Integrity
/// and signature verdicts are reported separately so a tampered-but-
/// decryptable package is distinguishable from an undecryptable one.
#[derive(Debug, Clone)]
pub struct DecryptionResult {
    /// Whether decryption produced content at all
    pub success: bool,
    /// The decrypted bytes, when available (possibly corrupted)
    pub file_content: Option<Vec<u8>>,
    /// Whether the sender's signature checked out
    pub signature_valid: bool,
    /// Whether the recomputed digest matched the packaged one
    pub integrity_valid: bool,
    /// Human-readable summary of the verdicts
    pub message: String,
}

impl DecryptionResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            file_content: None,
            signature_valid: false,
            integrity_valid: false,
            message: message.into(),
        }
    }

    /// True when both the signature and the digest checked out
    pub fn fully_verified(&self) -> bool {
        self.success && self.signature_valid && self.integrity_valid
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Encrypt, seal, digest, and sign a file for one recipient
pub fn hybrid_encrypt(
    content: &[u8],
    metadata: FileMetadata,
    recipient: &PublicKey,
    sender_keys: &KeyPair,
) -> Result<EncryptedPackage> {
    let sym_key = SymmetricKey::generate();
    let (encrypted_file, iv) = encryption::encrypt_bulk(content, &sym_key);

    let encrypted_sym_key = sealing::seal(sym_key.as_bytes(), recipient)
        .map_err(|e| Error::EncryptionFailed(format!("key wrap failed: {}", e)))?;

    let file_hash = digest::hash(content);
    let signature = signing::sign(content, &sender_keys.signing);

    debug!(
        file_name = %metadata.file_name,
        file_size = metadata.file_size,
        "Built encrypted package"
    );

    Ok(EncryptedPackage {
        encrypted_file,
        encrypted_sym_key,
        iv,
        signature,
        file_hash,
        metadata,
    })
}

/// Decrypt a package and verify it against the sender's public key
///
/// Hard failures (unrecoverable key, malformed sealed blob) come back as
/// a result with `success: false` and no content. Verification failures
/// leave `success: true` and surface through the per-check flags.
pub fn hybrid_decrypt(
    package: &EncryptedPackage,
    own_keys: &KeyPair,
    sender: &PublicKey,
) -> DecryptionResult {
    let sym_key_bytes = match sealing::open(&package.encrypted_sym_key, own_keys) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Key unwrap failed: {}", e);
            return DecryptionResult::failure(format!("Could not recover file key: {}", e));
        }
    };

    let sym_key = match SymmetricKey::from_slice(&sym_key_bytes) {
        Ok(key) => key,
        Err(e) => return DecryptionResult::failure(format!("Recovered key is unusable: {}", e)),
    };

    let file_content = encryption::decrypt_bulk(&package.encrypted_file, &sym_key, &package.iv);

    // The two checks are independent: each runs over the decrypted bytes
    // regardless of the other's verdict.
    let signature_valid = signing::verify(&file_content, &package.signature, sender);
    let integrity_valid = digest::hash(&file_content) == package.file_hash;

    DecryptionResult {
        success: true,
        file_content: Some(file_content),
        signature_valid,
        integrity_valid,
        message: verification_message(signature_valid, integrity_valid).to_string(),
    }
}

/// One of four fixed verdict summaries
pub fn verification_message(signature_valid: bool, integrity_valid: bool) -> &'static str {
    match (signature_valid, integrity_valid) {
        (true, true) => "File verified: content intact and signature valid",
        (false, true) => "Warning: signature invalid - sender cannot be authenticated",
        (true, false) => "Warning: content altered in transit - integrity check failed",
        (false, false) => "Warning: signature invalid and content altered in transit",
    }
}

/// Serde helper for base64-encoded byte vectors
mod bytes_base64 {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Build metadata for a file about to be packaged
pub fn metadata_for(file_name: &str, content: &[u8]) -> FileMetadata {
    FileMetadata {
        file_name: file_name.to_string(),
        file_size: content.len() as u64,
        timestamp: Utc::now(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
