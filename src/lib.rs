//! # SealDrop Core
//!
//! Client-side library for exchanging files through an untrusted relay.
//! The relay routes opaque packages and answers public key lookups; it
//! never sees plaintext, private keys, or unwrapped symmetric keys.
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                         transfer                             |
//! |     SendTransfer / ReceiveTransfer state machines            |
//! +------------------------------+-------------------------------+
//! |            crypto            |           transport           |
//! |   keys, sealing, AES-CTR,    |   Transport + OperatorPrompt  |
//! |   Ed25519, SHA-256, hybrid   |   traits over the relay       |
//! +------------------------------+-------------------------------+
//! |                          error                               |
//! |          unified Error enum with stable codes                |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Protocol sketch
//!
//! Sending: generate a fresh symmetric key, encrypt the file body with
//! it, seal the key to the recipient's public key, then digest and sign
//! the plaintext. Receiving: unseal the key, decrypt, and run the
//! signature and integrity checks independently, so a recipient learns
//! exactly which guarantee failed.
//!
//! ## Example
//!
//! ```no_run
//! use sealdrop_core::crypto::{hybrid_encrypt, hybrid_decrypt, metadata_for, KeyPair};
//!
//! # fn main() -> sealdrop_core::Result<()> {
//! let alice = KeyPair::generate(256)?;
//! let bob = KeyPair::generate(256)?;
//!
//! let content = b"meet at noon";
//! let package = hybrid_encrypt(
//!     content,
//!     metadata_for("plan.txt", content),
//!     &bob.public_keys(),
//!     &alice,
//! )?;
//!
//! let result = hybrid_decrypt(&package, &bob, &alice.public_keys());
//! assert!(result.fully_verified());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod crypto;
pub mod error;
pub mod transfer;
pub mod transport;

pub use crypto::{DecryptionResult, EncryptedPackage, KeyPair, PublicKey};
pub use error::{Error, Result};
pub use transfer::{ReceiveTransfer, SendTransfer, DEFAULT_MAX_FILE_SIZE};
pub use transport::{OperatorPrompt, Transport};

use crate::crypto::keys::SUPPORTED_KEY_BITS;

/// Tunable limits shared by new transfers
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Largest plaintext a transfer will accept, in bytes
    pub max_file_size: usize,
    /// Key strength requested from [`KeyPair::generate`]
    pub key_strength_bits: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            key_strength_bits: SUPPORTED_KEY_BITS,
        }
    }
}

impl TransferConfig {
    /// Start a sending transfer using this config's limits
    pub fn send_to(&self, recipient: impl Into<String>) -> SendTransfer {
        SendTransfer::new(recipient).with_max_file_size(self.max_file_size)
    }
}
