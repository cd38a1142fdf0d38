//! # Key Material
//!
//! A [`KeyMaterial`] holds the secrets of one client and exposes the
//! operations that use them. There are two variants:
//!
//! - [`SymKeyMaterial`]: the client shares one symmetric command key with the
//!   controller
//! - [`PubKeyMaterial`]: the client owns an Ed25519 keypair, signs every
//!   message it protects, verifies peers against a [`PubKeyStore`], and
//!   derives its command key from ECDH with the controller's public key
//!
//! Both variants protect topic messages under a caller supplied topic key;
//! topic keys are never stored inside key material.
//!
//! ## Concurrency
//!
//! Each variant guards its state with a single reader-writer lock. Message
//! and command operations take a read lock, key rotation and public key
//! store mutations take the write lock, so a [`KeyMaterial`] can be shared
//! between threads as is.
//!
//! ## Persistence
//!
//! A [`KeyMaterial`] serializes to a tagged JSON snapshot (see
//! [`snapshot`]) that can be reloaded without knowing the variant up front.

mod public;
pub mod snapshot;
mod store;
mod symmetric;

pub use public::{PubKeyMaterial, SIGNED_MESSAGE_VERSION};
pub use snapshot::{KeyType, SnapshotError};
pub use store::{PubKeyStore, PubKeyStoreError};
pub use symmetric::SymKeyMaterial;

use crate::crypto::{CryptoError, Id, ValidationError};

/// Errors that can occur while using key material
#[derive(Debug, thiserror::Error)]
pub enum KeyMaterialError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("public key store error: {0}")]
    Store(#[from] PubKeyStoreError),
    #[error("signed message too short: got {got} bytes, need at least {min}")]
    MalformedSignedMessage { got: usize, min: usize },
    #[error("unsupported signed message version: {0}")]
    UnsupportedVersion(u8),
    #[error("signer public key not found: {0}")]
    SignerNotFound(Id),
    #[error("invalid signature")]
    InvalidSignature,
}

/// Key material of a single client
///
/// # Examples
///
/// ```ignore
/// let material = KeyMaterial::from(SymKeyMaterial::random());
/// let topic_key = random_key();
///
/// let protected = material.protect_message(b"22.5C", &topic_key)?;
/// let payload = material.unprotect_message(&protected, &topic_key)?;
///
/// let snapshot = material.to_json()?;
/// let restored = KeyMaterial::from_json(&snapshot)?;
/// ```
#[derive(Debug)]
pub enum KeyMaterial {
    Symmetric(SymKeyMaterial),
    PublicKey(PubKeyMaterial),
}

impl From<SymKeyMaterial> for KeyMaterial {
    fn from(material: SymKeyMaterial) -> Self {
        KeyMaterial::Symmetric(material)
    }
}

impl From<PubKeyMaterial> for KeyMaterial {
    fn from(material: PubKeyMaterial) -> Self {
        KeyMaterial::PublicKey(material)
    }
}

impl KeyMaterial {
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyMaterial::Symmetric(_) => KeyType::Symmetric,
            KeyMaterial::PublicKey(_) => KeyType::PublicKey,
        }
    }

    /// Protect `payload` for publication under `topic_key`
    pub fn protect_message(
        &self,
        payload: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        match self {
            KeyMaterial::Symmetric(m) => m.protect_message(payload, topic_key),
            KeyMaterial::PublicKey(m) => m.protect_message(payload, topic_key),
        }
    }

    /// Recover the payload of a message received under `topic_key`
    pub fn unprotect_message(
        &self,
        protected: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        match self {
            KeyMaterial::Symmetric(m) => m.unprotect_message(protected, topic_key),
            KeyMaterial::PublicKey(m) => m.unprotect_message(protected, topic_key),
        }
    }

    /// Recover a command sent by the controller
    pub fn unprotect_command(&self, protected: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        match self {
            KeyMaterial::Symmetric(m) => m.unprotect_command(protected),
            KeyMaterial::PublicKey(m) => m.unprotect_command(protected),
        }
    }

    /// Replace the live secret with a copy of `key`
    ///
    /// For symmetric material `key` is the new command key, for public key
    /// material it is the new 64-byte Ed25519 private key.
    pub fn set_key(&self, key: &[u8]) -> Result<(), KeyMaterialError> {
        match self {
            KeyMaterial::Symmetric(m) => m.set_key(key),
            KeyMaterial::PublicKey(m) => m.set_key(key),
        }
    }

    pub fn as_symmetric(&self) -> Option<&SymKeyMaterial> {
        match self {
            KeyMaterial::Symmetric(m) => Some(m),
            KeyMaterial::PublicKey(_) => None,
        }
    }

    pub fn as_pub_key(&self) -> Option<&PubKeyMaterial> {
        match self {
            KeyMaterial::PublicKey(m) => Some(m),
            KeyMaterial::Symmetric(_) => None,
        }
    }

    /// Serialize to a JSON snapshot
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        snapshot::to_json(self)
    }

    /// Load key material of either variant from a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        snapshot::from_json(json)
    }
}
