//! # Transfer State Machines
//!
//! Per-transfer context objects for the two sides of a file exchange.
//! Each transfer owns its own state; nothing here is global, so any
//! number of sends and receives can run concurrently without touching
//! each other.
//!
//! ```text
//! SENDER                              RECEIVER
//! ======                              ========
//! Idle                                Idle
//!  | load_file                         | offer
//! Ready                               PackageOffered
//!  | resolve_recipient                 | resolve_sender_key
//! RecipientKeyResolved                ResolvingSenderKey
//!  | encrypt_and_send                  | decrypt
//! Encrypting --> Sent                 Decrypting
//!  |               |                   |-- clean --> Reported
//!  v               v                   |-- warning --> IntegrityWarning
//! Failed        Completed              |                |-- continue --> Reported
//!  (retryable)                         |                '-- cancel ----> Cancelled
//!                                      '-- hard fail --> Reported
//! ```
//!
//! Failed sender transfers keep their inputs and can retry; Cancelled
//! and Reported are terminal.

pub mod receiver;
pub mod sender;

pub use receiver::{DecryptOutcome, ReceiveTransfer, ReceiverState};
pub use sender::{SendTransfer, SenderState};

/// Default cap on plaintext file size: 16 MiB
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;
