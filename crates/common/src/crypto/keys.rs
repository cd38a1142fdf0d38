use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::error::CryptoError;
use super::hash::Id;
use super::secret::SymKey;
use super::validate::{validate_ed25519_priv_key, validate_ed25519_pub_key};
use super::{ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN, ID_LEN};

/// Size of the seed an Ed25519 private key is expanded from
pub const SEED_SIZE: usize = 32;

/// Generate a random symmetric key
///
/// # Panics
///
/// Panics if the operating system cannot provide entropy.
pub fn random_key() -> SymKey {
    SymKey::generate()
}

/// Generate a random ID
///
/// # Panics
///
/// Panics if the operating system cannot provide entropy.
pub fn random_id() -> Id {
    let mut buff = [0; ID_LEN];
    getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
    Id::from(buff)
}

/// Ed25519 public key identifying a client
///
/// This key serves two purposes:
/// - **Signature verification**: peers register it to verify messages the
///   client signs
/// - **Key agreement**: converted to X25519, it lets the controller derive a
///   per-client command key
///
/// Only length and all-zero checks happen at construction. Whether the bytes
/// are a valid curve point is checked when the key is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; ED25519_PUBLIC_KEY_LEN]);

impl TryFrom<&[u8]> for PublicKey {
    type Error = CryptoError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        validate_ed25519_pub_key(bytes)?;
        let mut buff = [0; ED25519_PUBLIC_KEY_LEN];
        buff.copy_from_slice(bytes);
        Ok(PublicKey(buff))
    }
}

impl PublicKey {
    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes =
            hex::decode(hex).map_err(|e| anyhow::anyhow!("public key hex decode error: {}", e))?;
        Self::try_from(bytes.as_slice())
    }

    pub fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_LEN] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert Ed25519 public key to X25519 (Montgomery curve) for ECDH
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not decompress to an Edwards point.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_x25519(&self) -> Result<X25519PublicKey, CryptoError> {
        let edwards_point = CompressedEdwardsY(self.0)
            .decompress()
            .ok_or(CryptoError::InvalidPoint)?;

        let montgomery_point = edwards_point.to_montgomery();
        Ok(X25519PublicKey::from(montgomery_point.to_bytes()))
    }

    /// Verify an Ed25519 signature on a message.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The public key bytes are not a valid point
    /// - The signature verification fails
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &ed25519_dalek::Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        let verifying_key = VerifyingKey::from_bytes(&self.0)?;
        verifying_key.verify_strict(msg, signature)
    }
}

/// Ed25519 private key of a client
///
/// Serialized as the 64-byte `seed || public key` form so that keys
/// generated by other implementations load unchanged. The signing key is
/// wiped when dropped.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::generate();
/// let signature = secret_key.sign(b"hello");
/// secret_key.public().verify(b"hello", &signature)?;
/// ```
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&self.public()).finish()
    }
}

impl From<[u8; SEED_SIZE]> for SecretKey {
    fn from(seed: [u8; SEED_SIZE]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = CryptoError;
    /// Parse a 64-byte `seed || public key` private key
    ///
    /// Fails if the embedded public key does not match the seed.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        validate_ed25519_priv_key(bytes)?;
        let mut buff = Zeroizing::new([0; ED25519_PRIVATE_KEY_LEN]);
        buff.copy_from_slice(bytes);
        let signing_key = SigningKey::from_keypair_bytes(&buff)
            .map_err(|e| anyhow::anyhow!("invalid ed25519 keypair: {}", e))?;
        Ok(Self(signing_key))
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }
}

impl Eq for SecretKey {}

impl SecretKey {
    /// Generate a new random secret key using a cryptographically secure RNG
    ///
    /// # Panics
    ///
    /// Panics if the operating system cannot provide entropy.
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
        getrandom::getrandom(&mut seed[..]).expect("failed to generate random bytes");
        Self(SigningKey::from_bytes(&seed))
    }

    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().to_bytes())
    }

    /// Convert secret key to its 64-byte `seed || public key` form
    pub fn to_bytes(&self) -> Zeroizing<[u8; ED25519_PRIVATE_KEY_LEN]> {
        Zeroizing::new(self.0.to_keypair_bytes())
    }

    /// Convert Ed25519 secret key to X25519 (Montgomery curve) for ECDH
    ///
    /// The scalar bytes of the expanded Ed25519 key become the X25519 private
    /// key, which clamps them.
    pub fn to_x25519(&self) -> StaticSecret {
        StaticSecret::from(self.0.to_scalar_bytes())
    }

    /// Sign a message with this secret key using Ed25519.
    pub fn sign(&self, msg: &[u8]) -> ed25519_dalek::Signature {
        self.0.sign(msg)
    }
}
