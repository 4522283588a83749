//! # Error Handling
//!
//! Error types for the sealdrop core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Key Errors                                                        │
//! │  │   ├── KeyGenerationFailed   - Unsupported strength / RNG failure    │
//! │  │   └── InvalidKey            - Malformed key material                │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - Hybrid encryption aborted             │
//! │  │   ├── DecryptionFailed      - Key unwrap / ciphertext rejected      │
//! │  │   └── SigningFailed         - Signature creation failed             │
//! │  │                                                                      │
//! │  ├── Transport Errors                                                  │
//! │  │   ├── LookupFailed          - Peer public key not found             │
//! │  │   ├── DeliveryFailed        - Package could not be delivered        │
//! │  │   └── ReportFailed          - Outcome report not accepted           │
//! │  │                                                                      │
//! │  ├── Transfer Errors                                                   │
//! │  │   ├── FileTooLarge          - Exceeds configured in-memory limit    │
//! │  │   ├── MissingPrivateKey     - Operator supplied no private key      │
//! │  │   ├── InvalidTransition     - Operation not valid in current state  │
//! │  │   └── OperatorCancelled     - Operator aborted after warning        │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      └── SerializationError    - Wire encoding/decoding failed         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation policy
//!
//! Cryptographic primitive failures never escape `hybrid_decrypt` as raised
//! faults; they are folded into `DecryptionResult` fields. `Error` values
//! surface only where the caller can act on them: transport lookups,
//! delivery, and contract violations (calling an operation before its
//! preconditions hold).

use thiserror::Error;

/// Result type alias for sealdrop core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sealdrop core
///
/// Errors are categorized by domain so callers can distinguish recoverable
/// conditions (retry a lookup, re-prompt for a key) from contract
/// violations.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Key Errors (100-199)
    // ========================================================================

    /// Key generation failed (unsupported strength or RNG failure)
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Malformed key material
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// Encryption failed; no partial package was produced
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key or corrupted ciphertext)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Signature creation failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    // ========================================================================
    // Transport Errors (300-399)
    // ========================================================================

    /// Peer public key lookup failed or returned not-found
    #[error("Public key lookup failed: {0}")]
    LookupFailed(String),

    /// Package delivery failed
    #[error("Failed to deliver package: {0}")]
    DeliveryFailed(String),

    /// Outcome report was not accepted by the transport
    #[error("Failed to report outcome: {0}")]
    ReportFailed(String),

    // ========================================================================
    // Transfer Errors (400-499)
    // ========================================================================

    /// File exceeds the configured in-memory size limit
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the offered file in bytes
        size: usize,
        /// Configured maximum in bytes
        limit: usize,
    },

    /// The operator did not supply a private key
    #[error("No private key available. Supply one before decrypting.")]
    MissingPrivateKey,

    /// Operation attempted in a state that does not permit it
    ///
    /// This is a contract violation by the caller, not a recoverable
    /// transfer outcome.
    #[error("Invalid transfer state transition: {0}")]
    InvalidTransition(String),

    /// Operator cancelled the transfer after an integrity warning
    #[error("Transfer cancelled by the operator.")]
    OperatorCancelled,

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Wire encoding or decoding failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the stable numeric code for this error
    ///
    /// Codes are grouped by category:
    /// - 100-199: Keys
    /// - 200-299: Crypto
    /// - 300-399: Transport
    /// - 400-499: Transfer
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Keys (100-199)
            Error::KeyGenerationFailed(_) => 100,
            Error::InvalidKey(_) => 101,

            // Crypto (200-299)
            Error::EncryptionFailed(_) => 200,
            Error::DecryptionFailed(_) => 201,
            Error::SigningFailed(_) => 202,

            // Transport (300-399)
            Error::LookupFailed(_) => 300,
            Error::DeliveryFailed(_) => 301,
            Error::ReportFailed(_) => 302,

            // Transfer (400-499)
            Error::FileTooLarge { .. } => 400,
            Error::MissingPrivateKey => 401,
            Error::InvalidTransition(_) => 402,
            Error::OperatorCancelled => 403,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can be resolved by retrying the operation or by
    /// operator action; the transfer state machine stays where it was.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::LookupFailed(_)
                | Error::DeliveryFailed(_)
                | Error::ReportFailed(_)
                | Error::MissingPrivateKey
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
