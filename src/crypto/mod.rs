//! # Cryptographic Primitives
//!
//! Everything key-shaped lives here, layered so each module has one job:
//!
//! ```text
//! +----------------------------------------------------------+
//! |                        hybrid                            |
//! |        package construction and verification             |
//! +------------+------------+------------+-------------------+
//! |  sealing   | encryption |  signing   |      digest       |
//! |  key wrap  |  AES-CTR   |  Ed25519   |     SHA-256       |
//! +------------+------------+------------+-------------------+
//! |                         keys                             |
//! |        identity keypairs and public key exchange         |
//! +----------------------------------------------------------+
//! ```
//!
//! The load-bearing boundary: `sealing` wraps symmetric keys only, and
//! `encryption` carries file bodies only. `hybrid` is the sole module
//! that composes the two.

pub mod digest;
pub mod encryption;
pub mod hybrid;
pub mod keys;
pub mod sealing;
pub mod signing;

pub use digest::{hash, ContentDigest, DIGEST_SIZE};
pub use encryption::{
    decrypt_bulk, encrypt_bulk, Iv, SymmetricKey, IV_SIZE, SYMMETRIC_KEY_SIZE,
};
pub use hybrid::{
    hybrid_decrypt, hybrid_encrypt, metadata_for, verification_message, DecryptionResult,
    EncryptedPackage, FileMetadata,
};
pub use keys::{KeyPair, PublicKey, SealingKeyPair, SigningKeyPair, SUPPORTED_KEY_BITS};
pub use sealing::{open, seal, MAX_SEAL_PLAINTEXT};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};
