//! # Key Management
//!
//! Identity keypairs and their shareable public halves.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (Ed25519)                                       │   │
//! │  │  ─────────────────────────                                       │   │
//! │  │  • Authenticity proofs over file content                        │   │
//! │  │  • Private key: 32 bytes (secret)                               │   │
//! │  │  • Public key: 32 bytes (shared freely)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SealingKeyPair (X25519)                                        │   │
//! │  │  ────────────────────────                                        │   │
//! │  │  • Wrapping the per-transfer symmetric key for a recipient      │   │
//! │  │  • Private key: 32 bytes (secret)                               │   │
//! │  │  • Public key: 32 bytes (published to the key registry)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  KeyPair = SigningKeyPair + SealingKeyPair (one identity)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A keypair is generated once per identity. Regenerating it invalidates
//! every package sealed or signed under the old keys, so callers must treat
//! generation as a session-scoped event, never a per-transfer one.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// The only asymmetric key strength the curve stack supports, in bits.
pub const SUPPORTED_KEY_BITS: u32 = 256;

/// Combined keypair holding both identity key halves
///
/// Private halves are zeroized on drop and are never serialized; only
/// [`PublicKey`] crosses the transport.
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    /// Ed25519 keypair for signing
    pub signing: SigningKeyPair,
    /// X25519 keypair for sealing the symmetric key
    pub sealing: SealingKeyPair,
}

impl KeyPair {
    /// Generate a new random keypair at the requested strength
    ///
    /// Uses the operating system's secure random number generator. The
    /// curve stack supports exactly one strength; any other request fails
    /// with [`Error::KeyGenerationFailed`] rather than silently producing
    /// weaker keys.
    pub fn generate(bits: u32) -> Result<Self> {
        if bits != SUPPORTED_KEY_BITS {
            return Err(Error::KeyGenerationFailed(format!(
                "unsupported key strength: {} bits (only {} supported)",
                bits, SUPPORTED_KEY_BITS
            )));
        }

        Ok(Self {
            signing: SigningKeyPair::generate(),
            sealing: SealingKeyPair::generate(),
        })
    }

    /// Get the public keys for sharing with peers
    pub fn public_keys(&self) -> PublicKey {
        PublicKey {
            signing: self.signing.public_bytes(),
            sealing: self.sealing.public_bytes(),
        }
    }
}

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private signing key (secret)
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        Self { secret }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(bytes),
        }
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// X25519 keypair used to wrap symmetric keys
#[derive(ZeroizeOnDrop)]
pub struct SealingKeyPair {
    /// Private key (secret)
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    /// Public key (derived from secret)
    public: X25519PublicKey,
}

impl SealingKeyPair {
    /// Generate a new random sealing keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Perform Diffie-Hellman key agreement with a peer's public key
    pub fn diffie_hellman(&self, their_public: &[u8; 32]) -> [u8; 32] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

/// Public keys that can be safely shared with peers
///
/// Contains only public information; serialized with hex-encoded fields so
/// it round-trips losslessly through any text transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKey {
    /// Ed25519 public key for signature verification (32 bytes)
    #[serde(with = "hex_bytes")]
    pub signing: [u8; 32],

    /// X25519 public key for sealing (32 bytes)
    #[serde(with = "hex_bytes")]
    pub sealing: [u8; 32],
}

impl PublicKey {
    /// Create a PublicKey from raw bytes
    pub fn from_bytes(signing: [u8; 32], sealing: [u8; 32]) -> Self {
        Self { signing, sealing }
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.signing)
            .map_err(|e| Error::InvalidKey(format!("Invalid signing public key: {}", e)))
    }

    /// Encode as hex string (for display and registry storage)
    pub fn to_hex(&self) -> String {
        format!("{}{}", hex::encode(self.signing), hex::encode(self.sealing))
    }

    /// Decode from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != 128 {
            return Err(Error::InvalidKey(
                "Public key hex must be 128 characters".into(),
            ));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::InvalidKey(format!("Invalid hex: {}", e)))?;

        let signing: [u8; 32] = bytes[0..32]
            .try_into()
            .map_err(|_| Error::InvalidKey("Invalid signing key length".into()))?;

        let sealing: [u8; 32] = bytes[32..64]
            .try_into()
            .map_err(|_| Error::InvalidKey("Invalid sealing key length".into()))?;

        Ok(Self { signing, sealing })
    }

    /// SHA-256 fingerprint of both key halves, hex-encoded
    ///
    /// Stable per key; registries store it so operators can compare keys
    /// out of band without pasting full key material.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.signing);
        hasher.update(self.sealing);
        hex::encode(hasher.finalize())
    }
}

/// Serde helper for serializing byte arrays as hex
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid length"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
