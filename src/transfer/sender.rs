//! Sending side of a transfer.
//!
//! A [`SendTransfer`] walks one file from selection to delivery. Every
//! remote step can fail without losing work: lookup failures leave the
//! transfer retryable in place, and encryption or delivery failures park
//! it in `Failed` with the file and resolved key intact so
//! `encrypt_and_send` can be called again.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crypto::hybrid::{self, EncryptedPackage};
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{Error, Result};
use crate::transfer::DEFAULT_MAX_FILE_SIZE;
use crate::transport::Transport;

// ============================================================================
// STATE
// ============================================================================

/// Lifecycle states of a sending transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Nothing loaded yet
    Idle,
    /// File loaded and validated
    Ready,
    /// Recipient's public key resolved
    RecipientKeyResolved,
    /// Package construction in progress
    Encrypting,
    /// Package handed to the relay, awaiting acknowledgement
    Sent,
    /// Recipient acknowledged delivery
    Completed,
    /// A step failed; inputs retained for retry
    Failed,
}

impl SenderState {
    /// Whether the transfer has finished for good
    ///
    /// Only `Completed` qualifies. `Failed` keeps the loaded file and any
    /// resolved key so `encrypt_and_send` can be retried; callers polling
    /// this must treat `Failed` as waiting for intervention, not done.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SenderState::Completed)
    }

    /// Stable label for logs and UIs
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderState::Idle => "idle",
            SenderState::Ready => "ready",
            SenderState::RecipientKeyResolved => "recipient_key_resolved",
            SenderState::Encrypting => "encrypting",
            SenderState::Sent => "sent",
            SenderState::Completed => "completed",
            SenderState::Failed => "failed",
        }
    }
}

// ============================================================================
// TRANSFER
// ============================================================================

/// One outbound file transfer
#[derive(Debug)]
pub struct SendTransfer {
    /// Unique id, generated at creation and quoted in every receipt
    transfer_id: String,
    state: SenderState,
    recipient: String,
    file_name: Option<String>,
    file_content: Option<Vec<u8>>,
    recipient_key: Option<PublicKey>,
    failure_cause: Option<String>,
    max_file_size: usize,
}

impl SendTransfer {
    /// Start a transfer addressed to `recipient`
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            transfer_id: Uuid::new_v4().to_string(),
            state: SenderState::Idle,
            recipient: recipient.into(),
            file_name: None,
            file_content: None,
            recipient_key: None,
            failure_cause: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Override the file size cap
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// This transfer's id
    pub fn transfer_id(&self) -> &str {
        &self.transfer_id
    }

    /// Current state
    pub fn state(&self) -> SenderState {
        self.state
    }

    /// The addressed recipient
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Why the last step failed, when in `Failed`
    pub fn failure_cause(&self) -> Option<&str> {
        self.failure_cause.as_deref()
    }

    /// Load and validate the file to send
    ///
    /// Replacing a previously loaded file is allowed until key
    /// resolution; after that the transfer is committed to its content.
    pub fn load_file(&mut self, file_name: impl Into<String>, content: Vec<u8>) -> Result<()> {
        match self.state {
            SenderState::Idle | SenderState::Ready => {}
            other => {
                return Err(Error::InvalidTransition(format!(
                    "cannot load a file while {}",
                    other.as_str()
                )))
            }
        }

        let size = content.len();
        if size > self.max_file_size {
            return Err(Error::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        self.file_name = Some(file_name.into());
        self.file_content = Some(content);
        self.state = SenderState::Ready;
        debug!(transfer_id = %self.transfer_id, size, "File loaded");
        Ok(())
    }

    /// Resolve the recipient's public key through the relay
    ///
    /// A failed or empty lookup leaves the transfer in `Ready` so it can
    /// be retried once the recipient registers.
    pub async fn resolve_recipient(&mut self, transport: &dyn Transport) -> Result<()> {
        if self.state != SenderState::Ready {
            return Err(Error::InvalidTransition(format!(
                "cannot resolve recipient while {}",
                self.state.as_str()
            )));
        }

        let lookup = transport.lookup_public_key(&self.recipient).await?;
        let public_key = match lookup.public_key.filter(|_| lookup.found) {
            Some(key) => key,
            None => {
                warn!(transfer_id = %self.transfer_id, recipient = %self.recipient, "Recipient not registered");
                return Err(Error::LookupFailed(format!(
                    "no public key registered for '{}'",
                    self.recipient
                )));
            }
        };

        debug!(
            transfer_id = %self.transfer_id,
            fingerprint = %public_key.fingerprint(),
            "Recipient key resolved"
        );
        self.recipient_key = Some(public_key);
        self.state = SenderState::RecipientKeyResolved;
        Ok(())
    }

    /// Encrypt the loaded file and hand it to the relay
    ///
    /// Callable from `RecipientKeyResolved` or, for retries, `Failed`.
    /// On success the transfer ends in `Sent`, or directly in
    /// `Completed` when the receipt carries an acknowledgement.
    pub async fn encrypt_and_send(
        &mut self,
        transport: &dyn Transport,
        own_keys: &KeyPair,
    ) -> Result<()> {
        match self.state {
            SenderState::RecipientKeyResolved | SenderState::Failed => {}
            other => {
                return Err(Error::InvalidTransition(format!(
                    "cannot send while {}",
                    other.as_str()
                )))
            }
        }

        self.state = SenderState::Encrypting;
        let package = match self.build_package(own_keys) {
            Ok(package) => package,
            Err(e) => {
                self.fail(e.to_string());
                return Err(e);
            }
        };

        let receipt = match transport.deliver(&self.recipient, &package).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.fail(format!("delivery failed: {}", e));
                return Err(Error::DeliveryFailed(e.to_string()));
            }
        };

        self.state = SenderState::Sent;
        info!(transfer_id = %self.transfer_id, recipient = %self.recipient, "Package sent");

        if receipt.acknowledged {
            self.state = SenderState::Completed;
            info!(transfer_id = %self.transfer_id, "Delivery acknowledged");
        }
        Ok(())
    }

    /// Record a delivery acknowledgement that arrived out of band
    pub fn confirm_delivery(&mut self) -> Result<()> {
        if self.state != SenderState::Sent {
            return Err(Error::InvalidTransition(format!(
                "cannot confirm delivery while {}",
                self.state.as_str()
            )));
        }
        self.state = SenderState::Completed;
        Ok(())
    }

    fn build_package(&self, own_keys: &KeyPair) -> Result<EncryptedPackage> {
        let file_name = self
            .file_name
            .as_deref()
            .ok_or_else(|| Error::InvalidTransition("no file loaded".into()))?;
        let content = self
            .file_content
            .as_deref()
            .ok_or_else(|| Error::InvalidTransition("no file loaded".into()))?;
        let recipient_key = self
            .recipient_key
            .as_ref()
            .ok_or_else(|| Error::InvalidTransition("recipient key not resolved".into()))?;

        hybrid::hybrid_encrypt(
            content,
            hybrid::metadata_for(file_name, content),
            recipient_key,
            own_keys,
        )
    }

    fn fail(&mut self, cause: String) {
        warn!(transfer_id = %self.transfer_id, cause = %cause, "Send step failed");
        self.failure_cause = Some(cause);
        // File and resolved key stay in place for retry
        self.state = SenderState::Failed;
    }
}

// ============================================================================
// TESTS
// ============================================================================
