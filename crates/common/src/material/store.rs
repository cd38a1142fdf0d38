use std::collections::BTreeMap;

use crate::crypto::{CryptoError, Id, PublicKey, ValidationError};

/// Errors raised by [`PubKeyStore`] operations
#[derive(Debug, thiserror::Error)]
pub enum PubKeyStoreError {
    #[error("signer public key not found: {0}")]
    NotFound(Id),
    #[error("invalid ID: {0}")]
    InvalidId(#[from] ValidationError),
    #[error("invalid public key: {0}")]
    InvalidKey(#[from] CryptoError),
}

/// Registry of the Ed25519 public keys a client trusts, keyed by signer ID
///
/// Holds at most one key per ID. The store itself is not synchronized; it
/// lives inside [`PubKeyMaterial`](super::PubKeyMaterial), whose lock guards
/// every access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubKeyStore {
    keys: BTreeMap<Id, PublicKey>,
}

impl PubKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the key for `id`, replacing any key already stored for it
    pub fn add(&mut self, id: &[u8], key: &[u8]) -> Result<(), PubKeyStoreError> {
        let id = Id::try_from(id)?;
        let key = PublicKey::try_from(key)?;
        self.insert(id, key);
        Ok(())
    }

    pub fn insert(&mut self, id: Id, key: PublicKey) {
        if self.keys.insert(id, key).is_some() {
            tracing::debug!("replaced public key for {}", id);
        } else {
            tracing::debug!("added public key for {}", id);
        }
    }

    pub fn get(&self, id: &Id) -> Result<PublicKey, PubKeyStoreError> {
        self.keys
            .get(id)
            .copied()
            .ok_or(PubKeyStoreError::NotFound(*id))
    }

    /// Snapshot of every stored key
    pub fn all(&self) -> BTreeMap<Id, PublicKey> {
        self.keys.clone()
    }

    /// Remove the key for `id`
    ///
    /// # Errors
    ///
    /// Returns [`PubKeyStoreError::NotFound`] if no key is stored for `id`.
    pub fn remove(&mut self, id: &Id) -> Result<(), PubKeyStoreError> {
        match self.keys.remove(id) {
            Some(_) => {
                tracing::debug!("removed public key for {}", id);
                Ok(())
            }
            None => Err(PubKeyStoreError::NotFound(*id)),
        }
    }

    pub fn reset(&mut self) {
        tracing::debug!("clearing {} public keys", self.keys.len());
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
