use parking_lot::RwLock;

use crate::crypto::{derive_sym_key, protect_sym_key, unprotect_sym_key, SymKey};

use super::KeyMaterialError;

/// Key material sharing one symmetric command key with the controller
///
/// Messages are protected with the topic key alone; the stored key is only
/// used to unprotect commands.
#[derive(Debug)]
pub struct SymKeyMaterial {
    key: RwLock<SymKey>,
}

impl SymKeyMaterial {
    /// Create key material from a copy of `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not `KEY_LEN` bytes or is all zeros.
    pub fn new(key: &[u8]) -> Result<Self, KeyMaterialError> {
        Ok(Self::from(SymKey::from_slice(key)?))
    }

    /// Create key material whose command key is derived from `password`
    pub fn from_password(password: &str) -> Result<Self, KeyMaterialError> {
        Ok(Self::from(derive_sym_key(password)?))
    }

    pub fn random() -> Self {
        Self::from(SymKey::generate())
    }

    pub fn protect_message(
        &self,
        payload: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        Ok(protect_sym_key(payload, topic_key)?)
    }

    pub fn unprotect_message(
        &self,
        protected: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        Ok(unprotect_sym_key(protected, topic_key)?)
    }

    pub fn unprotect_command(&self, protected: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        let key = self.key.read();
        Ok(unprotect_sym_key(protected, &key)?)
    }

    /// Replace the command key with a copy of `key`
    ///
    /// The previous key is wiped once replaced.
    pub fn set_key(&self, key: &[u8]) -> Result<(), KeyMaterialError> {
        let key = SymKey::from_slice(key)?;
        *self.key.write() = key;
        tracing::info!("rotated symmetric command key");
        Ok(())
    }

    /// Copy of the current command key
    pub fn key(&self) -> SymKey {
        self.key.read().clone()
    }
}

impl From<SymKey> for SymKeyMaterial {
    fn from(key: SymKey) -> Self {
        Self {
            key: RwLock::new(key),
        }
    }
}
