//! SHA3-256 hashing, IDs and shared key derivation

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use super::secret::SymKey;
use super::validate::{validate_id, ValidationError};
use super::{CryptoError, HASH_LEN, ID_LEN, KEY_LEN};

/// Size of a SHA3-256 digest in bytes
pub const SHA3_256_SIZE: usize = 32;

/// Identifier of a client or peer
///
/// IDs are normally derived from a human readable alias with
/// [`hash_id_alias`], but any `ID_LEN` bytes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id([u8; ID_LEN]);

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = ValidationError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        validate_id(bytes)?;
        let mut buff = [0; ID_LEN];
        buff.copy_from_slice(bytes);
        Ok(Id(buff))
    }
}

impl TryFrom<String> for Id {
    type Error = anyhow::Error;
    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Id::from_hex(&hex)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_hex()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Id {
    /// Parse an ID from a hexadecimal string
    pub fn from_hex(hex: &str) -> Result<Self, anyhow::Error> {
        let mut buff = [0; ID_LEN];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|e| anyhow::anyhow!("ID hex decode error: {}", e))?;
        Ok(Id(buff))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

pub fn sha3_sum256(data: &[u8]) -> [u8; SHA3_256_SIZE] {
    let mut out = [0; SHA3_256_SIZE];
    out.copy_from_slice(&Sha3_256::digest(data));
    out
}

/// Derive the ID of a client from its human readable alias
pub fn hash_id_alias(alias: &str) -> Id {
    let mut id = [0; ID_LEN];
    id.copy_from_slice(&sha3_sum256(alias.as_bytes())[..ID_LEN]);
    Id(id)
}

/// Derive the topic hash under which a topic key is indexed
pub fn hash_topic(topic: &str) -> [u8; HASH_LEN] {
    let mut hash = [0; HASH_LEN];
    hash.copy_from_slice(&sha3_sum256(topic.as_bytes())[..HASH_LEN]);
    hash
}

/// Turn an X25519 shared secret into a symmetric key
///
/// # Errors
///
/// Returns an error if the hashed secret is all zeros, which cannot happen
/// for a real digest.
pub fn derive_shared_key(shared_secret: &[u8]) -> Result<SymKey, CryptoError> {
    let digest = zeroize::Zeroizing::new(sha3_sum256(shared_secret));
    SymKey::from_slice(&digest[..KEY_LEN])
}
