//! # Asymmetric Key Wrap
//!
//! Seals a small plaintext (the per-transfer symmetric key) for a
//! recipient so that only the holder of the matching private key can
//! recover it.
//!
//! ## Construction
//!
//! ```text
//! seal(plaintext, recipient_public):
//!   1. Generate ephemeral X25519 keypair
//!   2. ECDH: ephemeral_secret × recipient_public → shared_secret
//!   3. HKDF-SHA256(shared_secret, salt = ephemeral_public,
//!                  info = "sealdrop-key-wrap-v1") → wrap_key
//!   4. AES-256-GCM(wrap_key, random nonce, plaintext)
//!
//!   blob = ephemeral_public (32) || nonce (12) || ciphertext + tag
//! ```
//!
//! `open` inverts the steps with the recipient's private key. A wrong
//! private key fails the AEAD tag check, so a wrapped key can never
//! silently decrypt to garbage.
//!
//! ## Plaintext bound
//!
//! This operation wraps symmetric keys only, never file bodies. The bound
//! is enforced rather than documented away: bulk content routed through
//! `seal` is a protocol violation, and [`Error::EncryptionFailed`] makes
//! it loud.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};

use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{Error, Result};

/// Maximum plaintext length `seal` accepts, in bytes
pub const MAX_SEAL_PLAINTEXT: usize = 128;

/// Size of the AEAD nonce inside a sealed blob
const SEAL_NONCE_SIZE: usize = 12;

/// Size of the AEAD authentication tag
const SEAL_TAG_SIZE: usize = 16;

/// Minimum length of a well-formed sealed blob
const MIN_SEALED_LEN: usize = 32 + SEAL_NONCE_SIZE + SEAL_TAG_SIZE;

/// HKDF context label; versioned so a future wrap change cannot collide
const WRAP_INFO: &[u8] = b"sealdrop-key-wrap-v1";

/// Derive the AES wrap key from the ECDH shared secret
fn derive_wrap_key(shared_secret: &[u8; 32], ephemeral_public: &[u8; 32]) -> Result<[u8; 32]> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared_secret);
    let mut key = [0u8; 32];
    hkdf.expand(WRAP_INFO, &mut key)
        .map_err(|_| Error::EncryptionFailed("HKDF expansion failed".into()))?;
    Ok(key)
}

/// Seal a small plaintext for a recipient
///
/// Returns the opaque blob `ephemeral_public || nonce || ciphertext`.
/// Fails with [`Error::EncryptionFailed`] when the plaintext exceeds
/// [`MAX_SEAL_PLAINTEXT`].
pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>> {
    if plaintext.len() > MAX_SEAL_PLAINTEXT {
        return Err(Error::EncryptionFailed(format!(
            "seal plaintext is {} bytes; limit is {} (seal wraps keys, not content)",
            plaintext.len(),
            MAX_SEAL_PLAINTEXT
        )));
    }

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral);

    let their_public = X25519PublicKey::from(recipient.sealing);
    let shared_secret = ephemeral.diffie_hellman(&their_public).to_bytes();

    let wrap_key = derive_wrap_key(&shared_secret, ephemeral_public.as_bytes())?;

    let mut nonce = [0u8; SEAL_NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new_from_slice(&wrap_key)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid wrap key: {}", e)))?;
    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::EncryptionFailed("key wrap encryption failed".into()))?;

    let mut blob = Vec::with_capacity(32 + SEAL_NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(ephemeral_public.as_bytes());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a sealed blob with our own private key
///
/// Fails with [`Error::DecryptionFailed`] when the blob is malformed or
/// was sealed for a different key. Callers treat this as "unusable, try
/// alternate recovery", never as a fatal fault.
pub fn open(blob: &[u8], own_keys: &KeyPair) -> Result<Vec<u8>> {
    if blob.len() < MIN_SEALED_LEN {
        return Err(Error::DecryptionFailed(format!(
            "sealed blob too short: {} bytes",
            blob.len()
        )));
    }

    let ephemeral_public: [u8; 32] = blob[0..32]
        .try_into()
        .map_err(|_| Error::DecryptionFailed("malformed sealed blob".into()))?;
    let nonce = &blob[32..32 + SEAL_NONCE_SIZE];
    let ciphertext = &blob[32 + SEAL_NONCE_SIZE..];

    let shared_secret = own_keys.sealing.diffie_hellman(&ephemeral_public);
    let wrap_key = derive_wrap_key(&shared_secret, &ephemeral_public)
        .map_err(|_| Error::DecryptionFailed("HKDF expansion failed".into()))?;

    let cipher = Aes256Gcm::new_from_slice(&wrap_key)
        .map_err(|e| Error::DecryptionFailed(format!("Invalid wrap key: {}", e)))?;

    cipher
        .decrypt(AesNonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::DecryptionFailed("wrong key or corrupted sealed key".into()))
}

// ============================================================================
// TESTS
// ============================================================================
