//! Public key material
//!
//! Messages protected by public key material carry a signature from their
//! sender. Before sealing under the topic key, the plaintext is framed as:
//!
//! ```text
//! [ version: 1 byte ][ signer id: 16 bytes ][ signature: 64 bytes ][ payload ]
//! ```
//!
//! The signature covers `version || signer id || payload`. Receivers look the
//! signer up in their [`PubKeyStore`] and reject the message unless the
//! signature verifies.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::crypto::{
    derive_shared_key, ed25519_private_key_from_password, protect_sym_key, unprotect_sym_key,
    validate_curve25519_pub_key, Id, PublicKey, SecretKey, Signature, X25519PublicKey,
    CURVE25519_KEY_LEN, ID_LEN, SIGNATURE_LEN,
};

use super::store::{PubKeyStore, PubKeyStoreError};
use super::KeyMaterialError;

/// Version byte of the signed message layout
pub const SIGNED_MESSAGE_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + ID_LEN + SIGNATURE_LEN;

#[derive(Debug)]
struct PubKeyMaterialInner {
    signer_id: Id,
    private_key: SecretKey,
    c2_public_key: [u8; CURVE25519_KEY_LEN],
    pub_keys: PubKeyStore,
}

/// Key material backed by an Ed25519 keypair
///
/// Holds the client's ID and private key, the controller's X25519 public key
/// and the store of peer public keys used to verify incoming messages.
#[derive(Debug)]
pub struct PubKeyMaterial {
    inner: RwLock<PubKeyMaterialInner>,
}

fn signed_bytes(signer_id: &Id, payload: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(1 + ID_LEN + payload.len());
    msg.push(SIGNED_MESSAGE_VERSION);
    msg.extend_from_slice(signer_id.as_bytes());
    msg.extend_from_slice(payload);
    msg
}

impl PubKeyMaterial {
    /// Create key material from existing keys, copying all inputs
    ///
    /// # Arguments
    /// * `signer_id` - The `ID_LEN` byte ID of this client
    /// * `private_key` - The 64-byte Ed25519 private key of this client
    /// * `c2_public_key` - The controller's Curve25519 public key
    pub fn new(
        signer_id: &[u8],
        private_key: &[u8],
        c2_public_key: &[u8],
    ) -> Result<Self, KeyMaterialError> {
        let private_key = SecretKey::try_from(private_key)?;
        Self::with_private_key(signer_id, private_key, c2_public_key)
    }

    /// Create key material whose private key is derived from `password`
    pub fn from_password(
        signer_id: &[u8],
        password: &str,
        c2_public_key: &[u8],
    ) -> Result<Self, KeyMaterialError> {
        let private_key = ed25519_private_key_from_password(password)?;
        Self::with_private_key(signer_id, private_key, c2_public_key)
    }

    /// Create key material with a freshly generated private key
    pub fn random(signer_id: &[u8], c2_public_key: &[u8]) -> Result<Self, KeyMaterialError> {
        Self::with_private_key(signer_id, SecretKey::generate(), c2_public_key)
    }

    pub(crate) fn with_private_key(
        signer_id: &[u8],
        private_key: SecretKey,
        c2_public_key: &[u8],
    ) -> Result<Self, KeyMaterialError> {
        let signer_id = Id::try_from(signer_id)?;
        validate_curve25519_pub_key(c2_public_key)?;
        let mut c2 = [0; CURVE25519_KEY_LEN];
        c2.copy_from_slice(c2_public_key);

        Ok(Self {
            inner: RwLock::new(PubKeyMaterialInner {
                signer_id,
                private_key,
                c2_public_key: c2,
                pub_keys: PubKeyStore::new(),
            }),
        })
    }

    pub fn signer_id(&self) -> Id {
        self.inner.read().signer_id
    }

    /// The Ed25519 public key peers register to verify this client
    pub fn public_key(&self) -> PublicKey {
        self.inner.read().private_key.public()
    }

    pub fn c2_public_key(&self) -> [u8; CURVE25519_KEY_LEN] {
        self.inner.read().c2_public_key
    }

    pub(crate) fn private_key(&self) -> SecretKey {
        self.inner.read().private_key.clone()
    }

    /// Copy out the full state under a single read lock
    pub(crate) fn export(
        &self,
    ) -> (
        Id,
        SecretKey,
        [u8; CURVE25519_KEY_LEN],
        BTreeMap<Id, PublicKey>,
    ) {
        let inner = self.inner.read();
        (
            inner.signer_id,
            inner.private_key.clone(),
            inner.c2_public_key,
            inner.pub_keys.all(),
        )
    }

    /// Sign `payload` and seal it under `topic_key`
    pub fn protect_message(
        &self,
        payload: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        let inner = self.inner.read();
        let signature = inner
            .private_key
            .sign(&signed_bytes(&inner.signer_id, payload));

        let mut signed = Vec::with_capacity(HEADER_LEN + payload.len());
        signed.push(SIGNED_MESSAGE_VERSION);
        signed.extend_from_slice(inner.signer_id.as_bytes());
        signed.extend_from_slice(&signature.to_bytes());
        signed.extend_from_slice(payload);

        Ok(protect_sym_key(&signed, topic_key)?)
    }

    /// Open a message sealed under `topic_key` and verify its signer
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Decryption fails (too short, replay window, authentication)
    /// - The decrypted frame is malformed or of an unknown version
    /// - The signer is not in the public key store
    /// - The signature does not verify
    pub fn unprotect_message(
        &self,
        protected: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyMaterialError> {
        let signed = unprotect_sym_key(protected, topic_key)?;
        if signed.len() < HEADER_LEN {
            return Err(KeyMaterialError::MalformedSignedMessage {
                got: signed.len(),
                min: HEADER_LEN,
            });
        }
        if signed[0] != SIGNED_MESSAGE_VERSION {
            return Err(KeyMaterialError::UnsupportedVersion(signed[0]));
        }

        let (signer_id, rest) = signed[1..].split_at(ID_LEN);
        let (signature, payload) = rest.split_at(SIGNATURE_LEN);
        let signer_id = Id::try_from(signer_id)?;
        let signature = Signature::from_slice(signature)
            .map_err(|_| KeyMaterialError::InvalidSignature)?;

        let public_key = match self.inner.read().pub_keys.get(&signer_id) {
            Ok(key) => key,
            Err(PubKeyStoreError::NotFound(id)) => {
                tracing::debug!("no public key registered for signer {}", id);
                return Err(KeyMaterialError::SignerNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };

        public_key
            .verify(&signed_bytes(&signer_id, payload), &signature)
            .map_err(|_| KeyMaterialError::InvalidSignature)?;

        Ok(payload.to_vec())
    }

    /// Recover a command protected with the ECDH key shared with the controller
    pub fn unprotect_command(&self, protected: &[u8]) -> Result<Vec<u8>, KeyMaterialError> {
        let inner = self.inner.read();
        let shared = inner
            .private_key
            .to_x25519()
            .diffie_hellman(&X25519PublicKey::from(inner.c2_public_key));
        let key = derive_shared_key(shared.as_bytes())?;

        Ok(unprotect_sym_key(protected, &key)?)
    }

    /// Replace the private key with a copy of `key`
    ///
    /// The signer ID, controller key and public key store are unaffected.
    pub fn set_key(&self, key: &[u8]) -> Result<(), KeyMaterialError> {
        let private_key = SecretKey::try_from(key)?;
        let mut inner = self.inner.write();
        inner.private_key = private_key;
        tracing::info!("rotated private key of signer {}", inner.signer_id);
        Ok(())
    }

    /// Register the public key of signer `id`, replacing any previous one
    pub fn add_pub_key(&self, id: &[u8], key: &[u8]) -> Result<(), KeyMaterialError> {
        Ok(self.inner.write().pub_keys.add(id, key)?)
    }

    pub fn get_pub_key(&self, id: &[u8]) -> Result<PublicKey, KeyMaterialError> {
        let id = Id::try_from(id)?;
        Ok(self.inner.read().pub_keys.get(&id)?)
    }

    /// Snapshot of every registered public key
    pub fn get_pub_keys(&self) -> BTreeMap<Id, PublicKey> {
        self.inner.read().pub_keys.all()
    }

    /// Remove the public key of signer `id`
    ///
    /// # Errors
    ///
    /// Fails if no key is registered for `id`, including when it was
    /// already removed.
    pub fn remove_pub_key(&self, id: &[u8]) -> Result<(), KeyMaterialError> {
        let id = Id::try_from(id)?;
        Ok(self.inner.write().pub_keys.remove(&id)?)
    }

    pub fn reset_pub_keys(&self) {
        self.inner.write().pub_keys.reset();
    }
}
