//! # Transport Abstraction
//!
//! The transfer state machines never talk to a relay directly. They call
//! through [`Transport`], an async trait covering the three remote
//! operations a transfer needs: key lookup, package delivery, and
//! outcome reporting. Interactive decisions (supplying a private key,
//! ruling on a corruption warning) go through [`OperatorPrompt`].
//!
//! The relay is untrusted by design. Nothing sensitive crosses this
//! boundary: packages are already encrypted, keys are public halves
//! only, and outcome reports carry verdict flags rather than content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::hybrid::EncryptedPackage;
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::Result;

// ============================================================================
// WIRE TYPES
// ============================================================================

/// Answer to a public key lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLookup {
    /// Whether the peer is known to the relay
    pub found: bool,
    /// The peer's public key, when found
    pub public_key: Option<PublicKey>,
}

impl KeyLookup {
    /// A successful lookup
    pub fn found(public_key: PublicKey) -> Self {
        Self {
            found: true,
            public_key: Some(public_key),
        }
    }

    /// A lookup that matched no peer
    pub fn not_found() -> Self {
        Self {
            found: false,
            public_key: None,
        }
    }
}

/// Relay acknowledgement of a delivered package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Transfer the receipt belongs to
    pub transfer_id: String,
    /// Whether the recipient's client confirmed receipt
    pub acknowledged: bool,
}

/// Final verdict reported back after a decryption attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    /// Transfer the outcome belongs to
    pub transfer_id: String,
    /// Whether decryption produced usable content
    pub success: bool,
    /// Signature check verdict
    pub signature_valid: bool,
    /// Integrity check verdict
    pub integrity_valid: bool,
    /// Whether the operator accepted the content despite a failed check
    pub forced: bool,
    /// Human-readable summary
    pub message: String,
}

/// Operator ruling on an integrity warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityDecision {
    /// Accept the possibly-corrupted content anyway
    Continue,
    /// Discard the content and abort the transfer
    Cancel,
}

// ============================================================================
// TRAITS
// ============================================================================

/// Remote operations a transfer needs from the relay
#[async_trait]
pub trait Transport: Send + Sync {
    /// Look up a peer's public key by identifier
    async fn lookup_public_key(&self, peer: &str) -> Result<KeyLookup>;

    /// Deliver an encrypted package to a peer
    async fn deliver(&self, peer: &str, package: &EncryptedPackage) -> Result<DeliveryReceipt>;

    /// Report the outcome of a received transfer
    async fn report_outcome(&self, transfer_id: &str, outcome: &TransferOutcome) -> Result<()>;
}

/// Interactive decisions that only a human operator can make
pub trait OperatorPrompt: Send + Sync {
    /// Ask for the private keypair needed to decrypt
    ///
    /// `None` means the operator declined or has no key available.
    fn request_private_key(&self) -> Option<KeyPair>;

    /// Ask whether to keep content that failed an integrity check
    fn confirm_integrity_override(&self) -> IntegrityDecision;
}

// ============================================================================
// TESTS
// ============================================================================
