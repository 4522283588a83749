//! Receiving side of a transfer.
//!
//! A [`ReceiveTransfer`] takes an offered package through key
//! resolution, decryption, verification, and outcome reporting. The one
//! interactive branch is the integrity warning: when decryption works
//! but a check fails, the transfer parks in `IntegrityWarning` holding
//! the suspect content until the operator either forces continuation or
//! cancels. Cancelling wipes the content and reports nothing; forcing
//! reports exactly once with the `forced` flag set.

use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::crypto::hybrid::{self, DecryptionResult, EncryptedPackage};
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{Error, Result};
use crate::transport::{IntegrityDecision, OperatorPrompt, TransferOutcome, Transport};

// ============================================================================
// STATE
// ============================================================================

/// Lifecycle states of a receiving transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// No package yet
    Idle,
    /// A package arrived and awaits processing
    PackageOffered,
    /// Fetching the sender's public key
    ResolvingSenderKey,
    /// Decryption and verification in progress
    Decrypting,
    /// Decryption worked but a check failed; awaiting operator ruling
    IntegrityWarning,
    /// Operator discarded suspect content; nothing was reported
    Cancelled,
    /// Outcome reported to the relay
    Reported,
}

impl ReceiverState {
    /// Whether the transfer has finished for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReceiverState::Cancelled | ReceiverState::Reported)
    }

    /// Stable label for logs and UIs
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiverState::Idle => "idle",
            ReceiverState::PackageOffered => "package_offered",
            ReceiverState::ResolvingSenderKey => "resolving_sender_key",
            ReceiverState::Decrypting => "decrypting",
            ReceiverState::IntegrityWarning => "integrity_warning",
            ReceiverState::Cancelled => "cancelled",
            ReceiverState::Reported => "reported",
        }
    }
}

/// What `decrypt` left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The verdict was reported; the transfer is terminal
    Reported,
    /// A check failed; the transfer awaits an operator decision
    AwaitingDecision,
}

// ============================================================================
// TRANSFER
// ============================================================================

/// One inbound file transfer
pub struct ReceiveTransfer {
    transfer_id: String,
    state: ReceiverState,
    sender: String,
    package: Option<EncryptedPackage>,
    keys: Option<KeyPair>,
    sender_key: Option<PublicKey>,
    result: Option<DecryptionResult>,
    cause: Option<String>,
    force_authorized: bool,
}

impl ReceiveTransfer {
    /// Start an empty receiving context
    pub fn new() -> Self {
        Self {
            transfer_id: String::new(),
            state: ReceiverState::Idle,
            sender: String::new(),
            package: None,
            keys: None,
            sender_key: None,
            result: None,
            cause: None,
            force_authorized: false,
        }
    }

    /// This transfer's id (empty until a package is offered)
    pub fn transfer_id(&self) -> &str {
        &self.transfer_id
    }

    /// Current state
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// The claimed sender of the offered package
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// The decryption verdict, once one exists
    pub fn result(&self) -> Option<&DecryptionResult> {
        self.result.as_ref()
    }

    /// Why the transfer ended early, when it did
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Accept a package offered by the relay
    ///
    /// Delivery is at-least-once, so offering a known transfer id again
    /// is a no-op whether the transfer is mid-flight or already settled;
    /// relay retries can neither restart nor duplicate it. A different
    /// id while this context is busy is refused.
    pub fn offer(
        &mut self,
        transfer_id: impl Into<String>,
        sender: impl Into<String>,
        package: EncryptedPackage,
    ) -> Result<()> {
        let transfer_id = transfer_id.into();
        if self.state != ReceiverState::Idle && self.transfer_id == transfer_id {
            debug!(transfer_id = %transfer_id, state = %self.state.as_str(), "Duplicate offer ignored");
            return Ok(());
        }

        if self.state != ReceiverState::Idle {
            return Err(Error::InvalidTransition(format!(
                "already handling transfer '{}' ({})",
                self.transfer_id,
                self.state.as_str()
            )));
        }

        self.transfer_id = transfer_id;
        self.sender = sender.into();
        self.package = Some(package);
        self.state = ReceiverState::PackageOffered;
        info!(transfer_id = %self.transfer_id, sender = %self.sender, "Package offered");
        Ok(())
    }

    /// Provide the private keypair for decryption
    pub fn set_private_key(&mut self, keys: KeyPair) {
        self.keys = Some(keys);
    }

    /// Ensure a private keypair is available, asking the operator if not
    ///
    /// Declining leaves the transfer exactly where it was; the package
    /// stays offered and the prompt can be retried.
    pub fn ensure_private_key(&mut self, prompt: &dyn OperatorPrompt) -> Result<()> {
        if self.keys.is_some() {
            return Ok(());
        }
        match prompt.request_private_key() {
            Some(keys) => {
                self.keys = Some(keys);
                Ok(())
            }
            None => {
                warn!(transfer_id = %self.transfer_id, "Operator supplied no private key");
                Err(Error::MissingPrivateKey)
            }
        }
    }

    /// Resolve the claimed sender's public key through the relay
    ///
    /// Failure returns the transfer to `PackageOffered` with the package
    /// intact, so resolution can be retried.
    pub async fn resolve_sender_key(&mut self, transport: &dyn Transport) -> Result<()> {
        if self.state != ReceiverState::PackageOffered {
            return Err(Error::InvalidTransition(format!(
                "cannot resolve sender key while {}",
                self.state.as_str()
            )));
        }

        self.state = ReceiverState::ResolvingSenderKey;
        let lookup = match transport.lookup_public_key(&self.sender).await {
            Ok(lookup) => lookup,
            Err(e) => {
                self.state = ReceiverState::PackageOffered;
                return Err(e);
            }
        };

        let public_key = match lookup.public_key.filter(|_| lookup.found) {
            Some(key) => key,
            None => {
                self.state = ReceiverState::PackageOffered;
                return Err(Error::LookupFailed(format!(
                    "no public key registered for sender '{}'",
                    self.sender
                )));
            }
        };

        debug!(
            transfer_id = %self.transfer_id,
            fingerprint = %public_key.fingerprint(),
            "Sender key resolved"
        );
        self.sender_key = Some(public_key);
        Ok(())
    }

    /// Pre-authorize continuing past a failed check
    ///
    /// With this set, `decrypt` reports a flawed-but-decryptable package
    /// immediately instead of stopping at `IntegrityWarning`.
    pub fn authorize_force(&mut self) {
        self.force_authorized = true;
    }

    /// Decrypt the offered package, verify it, and report the verdict
    ///
    /// Three exits: an intact or hard-failed decryption reports at once
    /// and returns [`DecryptOutcome::Reported`]; an integrity failure
    /// without prior authorization parks the transfer in
    /// `IntegrityWarning` and returns [`DecryptOutcome::AwaitingDecision`].
    /// An invalid signature over intact content reports immediately with
    /// the verdict flag down; only broken content needs a decision.
    pub async fn decrypt(&mut self, transport: &dyn Transport) -> Result<DecryptOutcome> {
        if self.state != ReceiverState::ResolvingSenderKey {
            return Err(Error::InvalidTransition(format!(
                "cannot decrypt while {}",
                self.state.as_str()
            )));
        }
        // Precondition failures bail before the state moves on
        let result = {
            let keys = self.keys.as_ref().ok_or(Error::MissingPrivateKey)?;
            let sender_key = self
                .sender_key
                .as_ref()
                .ok_or_else(|| Error::InvalidTransition("sender key not resolved".into()))?;
            let package = self
                .package
                .as_ref()
                .ok_or_else(|| Error::InvalidTransition("no package offered".into()))?;
            hybrid::hybrid_decrypt(package, keys, sender_key)
        };
        self.state = ReceiverState::Decrypting;

        if !result.success {
            self.result = Some(result);
            self.report(transport, false).await?;
            return Ok(DecryptOutcome::Reported);
        }

        // A signature verdict alone never blocks: it is reported as-is.
        // Only an integrity failure holds content back for a decision.
        if result.integrity_valid || self.force_authorized {
            let forced = !result.integrity_valid;
            self.result = Some(result);
            self.report(transport, forced).await?;
            return Ok(DecryptOutcome::Reported);
        }

        warn!(
            transfer_id = %self.transfer_id,
            signature_valid = result.signature_valid,
            "Integrity check failed, awaiting operator decision"
        );
        self.result = Some(result);
        self.state = ReceiverState::IntegrityWarning;
        Ok(DecryptOutcome::AwaitingDecision)
    }

    /// The pending verdict while in `IntegrityWarning`
    pub fn warning(&self) -> Option<&DecryptionResult> {
        if self.state == ReceiverState::IntegrityWarning {
            self.result.as_ref()
        } else {
            None
        }
    }

    /// Accept suspect content despite the failed check
    ///
    /// Reuses the verdict already computed; nothing is decrypted twice
    /// and exactly one outcome is reported.
    pub async fn force_continue(&mut self, transport: &dyn Transport) -> Result<()> {
        if self.state != ReceiverState::IntegrityWarning {
            return Err(Error::InvalidTransition(format!(
                "nothing to force while {}",
                self.state.as_str()
            )));
        }
        self.report(transport, true).await
    }

    /// Discard suspect content
    ///
    /// The decrypted bytes are wiped and no outcome report is sent; the
    /// sender learns nothing about what the operator saw.
    pub fn cancel(&mut self) -> Result<()> {
        if self.state != ReceiverState::IntegrityWarning {
            return Err(Error::InvalidTransition(format!(
                "nothing to cancel while {}",
                self.state.as_str()
            )));
        }

        if let Some(result) = self.result.as_mut() {
            if let Some(content) = result.file_content.as_mut() {
                content.zeroize();
            }
            result.file_content = None;
        }
        self.cause = Some("operator cancelled after integrity warning".into());
        self.state = ReceiverState::Cancelled;
        info!(transfer_id = %self.transfer_id, "Transfer cancelled, content discarded");
        Ok(())
    }

    /// Settle an `IntegrityWarning` by asking the operator
    pub async fn resolve_warning(
        &mut self,
        transport: &dyn Transport,
        prompt: &dyn OperatorPrompt,
    ) -> Result<()> {
        match prompt.confirm_integrity_override() {
            IntegrityDecision::Continue => self.force_continue(transport).await,
            IntegrityDecision::Cancel => self.cancel(),
        }
    }

    /// Send the outcome report and mark the transfer terminal
    ///
    /// Reporting is fire-and-forget: a relay that will not take the
    /// report cannot hold the transfer open.
    async fn report(&mut self, transport: &dyn Transport, forced: bool) -> Result<()> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| Error::InvalidTransition("no verdict to report".into()))?;

        let outcome = TransferOutcome {
            transfer_id: self.transfer_id.clone(),
            success: result.success,
            signature_valid: result.signature_valid,
            integrity_valid: result.integrity_valid,
            forced,
            message: result.message.clone(),
        };

        if let Err(e) = transport.report_outcome(&self.transfer_id, &outcome).await {
            warn!(transfer_id = %self.transfer_id, "Outcome report failed: {}", e);
        }
        self.state = ReceiverState::Reported;
        info!(
            transfer_id = %self.transfer_id,
            success = outcome.success,
            forced = outcome.forced,
            "Transfer reported"
        );
        Ok(())
    }
}

impl Default for ReceiveTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReceiveTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print private key material
        f.debug_struct("ReceiveTransfer")
            .field("transfer_id", &self.transfer_id)
            .field("state", &self.state)
            .field("sender", &self.sender)
            .field("has_package", &self.package.is_some())
            .field("has_private_key", &self.keys.is_some())
            .field("force_authorized", &self.force_authorized)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SUPPORTED_KEY_BITS;
    use crate::transport::{DeliveryReceipt, KeyLookup};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockTransport {
        sender_key: Option<PublicKey>,
        fail_report: bool,
        reports: Mutex<Vec<TransferOutcome>>,
    }

    impl MockTransport {
        fn with_sender(key: PublicKey) -> Self {
            Self {
                sender_key: Some(key),
                fail_report: false,
                reports: Mutex::new(Vec::new()),
            }
        }

        fn reports(&self) -> Vec<TransferOutcome> {
            self.reports.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn lookup_public_key(&self, _peer: &str) -> Result<KeyLookup> {
            Ok(match &self.sender_key {
                Some(key) => KeyLookup::found(key.clone()),
                None => KeyLookup::not_found(),
            })
        }

        async fn deliver(
            &self,
            _peer: &str,
            _package: &EncryptedPackage,
        ) -> Result<DeliveryReceipt> {
            unimplemented!("receiver tests never deliver")
        }

        async fn report_outcome(&self, _transfer_id: &str, outcome: &TransferOutcome) -> Result<()> {
            if self.fail_report {
                return Err(Error::ReportFailed("relay unreachable".into()));
            }
            self.reports.lock().unwrap().push(outcome.clone());
            Ok(())
        }
    }

    struct ScriptedPrompt {
        keys: Mutex<Option<KeyPair>>,
        decision: IntegrityDecision,
    }

    impl OperatorPrompt for ScriptedPrompt {
        fn request_private_key(&self) -> Option<KeyPair> {
            self.keys.lock().unwrap().take()
        }

        fn confirm_integrity_override(&self) -> IntegrityDecision {
            self.decision
        }
    }

    fn package_for(
        content: &[u8],
        sender: &KeyPair,
        recipient: &KeyPair,
    ) -> EncryptedPackage {
        hybrid::hybrid_encrypt(
            content,
            hybrid::metadata_for("note.txt", content),
            &recipient.public_keys(),
            sender,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_clean_receive_reports_success() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut transfer = ReceiveTransfer::new();
        transfer
            .offer("t-1", "alice", package_for(b"hello world", &sender, &recipient))
            .unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();

        let outcome = transfer.decrypt(&transport).await.unwrap();
        assert_eq!(outcome, DecryptOutcome::Reported);
        assert_eq!(transfer.state(), ReceiverState::Reported);

        let reports = transport.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].success);
        assert!(reports[0].signature_valid);
        assert!(reports[0].integrity_valid);
        assert!(!reports[0].forced);
        assert_eq!(
            transfer.result().unwrap().file_content.as_deref(),
            Some(b"hello world".as_slice())
        );
    }

    #[tokio::test]
    async fn test_corrupted_package_waits_for_decision() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut pkg = package_for(b"hello world", &sender, &recipient);
        pkg.encrypted_file[0] ^= 0xFF;

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-2", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();

        let outcome = transfer.decrypt(&transport).await.unwrap();
        assert_eq!(outcome, DecryptOutcome::AwaitingDecision);
        assert_eq!(transfer.state(), ReceiverState::IntegrityWarning);
        // Nothing reported while the decision is pending
        assert!(transport.reports().is_empty());

        let warning = transfer.warning().unwrap();
        assert!(!warning.integrity_valid);
        assert!(warning.file_content.is_some());
    }

    #[tokio::test]
    async fn test_force_continue_reports_exactly_once() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut pkg = package_for(b"hello world", &sender, &recipient);
        pkg.encrypted_file[0] ^= 0xFF;

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-3", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();
        transfer.decrypt(&transport).await.unwrap();

        transfer.force_continue(&transport).await.unwrap();
        assert_eq!(transfer.state(), ReceiverState::Reported);

        let reports = transport.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].forced);
        assert!(reports[0].success);
        assert!(!reports[0].integrity_valid);

        // A second attempt is an invalid transition, not a second report
        assert!(transfer.force_continue(&transport).await.is_err());
        assert_eq!(transport.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_wipes_content_and_reports_nothing() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut pkg = package_for(b"hello world", &sender, &recipient);
        pkg.encrypted_file[0] ^= 0xFF;

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-4", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();
        transfer.decrypt(&transport).await.unwrap();

        transfer.cancel().unwrap();
        assert_eq!(transfer.state(), ReceiverState::Cancelled);
        assert!(transfer.state().is_terminal());
        assert!(transport.reports().is_empty());
        assert!(transfer.result().unwrap().file_content.is_none());
        assert!(transfer.cause().unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_preauthorized_force_skips_warning() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut pkg = package_for(b"hello world", &sender, &recipient);
        pkg.encrypted_file[0] ^= 0xFF;

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-5", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.authorize_force();
        transfer.resolve_sender_key(&transport).await.unwrap();

        let outcome = transfer.decrypt(&transport).await.unwrap();
        assert_eq!(outcome, DecryptOutcome::Reported);
        assert!(transport.reports()[0].forced);
    }

    #[tokio::test]
    async fn test_bad_signature_over_intact_content_reports_without_warning() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let forger = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        // Package built by the forger but claimed to come from the sender
        let pkg = package_for(b"hello world", &forger, &recipient);

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-12", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();

        let outcome = transfer.decrypt(&transport).await.unwrap();
        assert_eq!(outcome, DecryptOutcome::Reported);

        let reports = transport.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].success);
        assert!(!reports[0].signature_valid);
        assert!(reports[0].integrity_valid);
        assert!(!reports[0].forced);
    }

    #[tokio::test]
    async fn test_wrong_key_hard_failure_reports_failure() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let intruder = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut transfer = ReceiveTransfer::new();
        transfer
            .offer("t-6", "alice", package_for(b"hello world", &sender, &recipient))
            .unwrap();
        transfer.set_private_key(intruder);
        transfer.resolve_sender_key(&transport).await.unwrap();

        let outcome = transfer.decrypt(&transport).await.unwrap();
        assert_eq!(outcome, DecryptOutcome::Reported);

        let reports = transport.reports();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].success);
        assert!(!reports[0].forced);
    }

    #[tokio::test]
    async fn test_duplicate_offer_is_ignored() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let pkg = package_for(b"hello world", &sender, &recipient);

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-7", "alice", pkg.clone()).unwrap();
        transfer.offer("t-7", "alice", pkg.clone()).unwrap();
        assert_eq!(transfer.state(), ReceiverState::PackageOffered);

        let err = transfer.offer("t-8", "alice", pkg).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_redelivery_after_terminal_state_is_ignored() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());
        let pkg = package_for(b"hello world", &sender, &recipient);

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-13", "alice", pkg.clone()).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();
        transfer.decrypt(&transport).await.unwrap();
        assert_eq!(transfer.state(), ReceiverState::Reported);

        // At-least-once delivery: the relay may resend after the
        // transfer settled. Still a no-op, still exactly one report.
        transfer.offer("t-13", "alice", pkg).unwrap();
        assert_eq!(transfer.state(), ReceiverState::Reported);
        assert_eq!(transport.reports().len(), 1);
    }

    #[test]
    fn test_debug_output_redacts_private_key() {
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let secret_hex = hex::encode(recipient.sealing.public_bytes());

        let mut transfer = ReceiveTransfer::new();
        transfer.set_private_key(recipient);

        let printed = format!("{:?}", transfer);
        assert!(printed.contains("has_private_key: true"));
        assert!(!printed.contains(&secret_hex));
    }

    #[tokio::test]
    async fn test_missing_private_key_leaves_package_offered() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();

        let mut transfer = ReceiveTransfer::new();
        transfer
            .offer("t-9", "alice", package_for(b"hi", &sender, &recipient))
            .unwrap();

        let declining = ScriptedPrompt {
            keys: Mutex::new(None),
            decision: IntegrityDecision::Cancel,
        };
        let err = transfer.ensure_private_key(&declining).unwrap_err();
        assert!(matches!(err, Error::MissingPrivateKey));
        assert!(err.is_recoverable());
        assert_eq!(transfer.state(), ReceiverState::PackageOffered);

        // A later prompt with a key succeeds
        let supplying = ScriptedPrompt {
            keys: Mutex::new(Some(recipient)),
            decision: IntegrityDecision::Cancel,
        };
        transfer.ensure_private_key(&supplying).unwrap();
    }

    #[tokio::test]
    async fn test_resolve_warning_follows_operator_decision() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let transport = MockTransport::with_sender(sender.public_keys());

        let mut pkg = package_for(b"hello world", &sender, &recipient);
        pkg.encrypted_file[0] ^= 0xFF;

        let mut transfer = ReceiveTransfer::new();
        transfer.offer("t-10", "alice", pkg).unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();
        transfer.decrypt(&transport).await.unwrap();

        let prompt = ScriptedPrompt {
            keys: Mutex::new(None),
            decision: IntegrityDecision::Continue,
        };
        transfer.resolve_warning(&transport, &prompt).await.unwrap();
        assert_eq!(transfer.state(), ReceiverState::Reported);
        assert!(transport.reports()[0].forced);
    }

    #[tokio::test]
    async fn test_failed_report_still_terminates() {
        let sender = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let recipient = KeyPair::generate(SUPPORTED_KEY_BITS).unwrap();
        let mut transport = MockTransport::with_sender(sender.public_keys());
        transport.fail_report = true;

        let mut transfer = ReceiveTransfer::new();
        transfer
            .offer("t-11", "alice", package_for(b"hello world", &sender, &recipient))
            .unwrap();
        transfer.set_private_key(recipient);
        transfer.resolve_sender_key(&transport).await.unwrap();

        transfer.decrypt(&transport).await.unwrap();
        assert_eq!(transfer.state(), ReceiverState::Reported);
    }
}
