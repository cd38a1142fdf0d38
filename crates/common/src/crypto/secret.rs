//! Symmetric encryption using AES-SIV
//!
//! Topic keys and symmetric command keys are both [`SymKey`]s. Encryption is
//! deterministic and misuse resistant: AES-CMAC-SIV derives the IV from the
//! key, the associated data and the plaintext, so no nonce has to be managed
//! by constrained clients.

use std::ops::Deref;

use aes_siv::aead::KeyInit;
use aes_siv::siv::Aes256Siv;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::error::CryptoError;
use super::validate::validate_sym_key;
use super::{KEY_LEN, TAG_LEN};

/// A 256-bit symmetric key
///
/// The key bytes are wiped when the value is dropped. Construction through
/// [`SymKey::from_slice`] rejects keys of the wrong length or made only of
/// zeros.
///
/// # Examples
///
/// ```ignore
/// let key = SymKey::generate();
/// let ciphertext = encrypt(&key, b"ad", b"payload")?;
/// let plaintext = decrypt(&key, b"ad", &ciphertext)?;
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymKey([u8; KEY_LEN]);

impl std::fmt::Debug for SymKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymKey(..)")
    }
}

impl Deref for SymKey {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<&[u8]> for SymKey {
    type Error = CryptoError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl SymKey {
    /// Generate a new random key using a cryptographically secure RNG
    ///
    /// # Panics
    ///
    /// Panics if the operating system cannot provide entropy.
    pub fn generate() -> Self {
        let mut buff = [0; KEY_LEN];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a key from a byte slice, copying it
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly `KEY_LEN` bytes or is all zeros.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        validate_sym_key(data)?;
        let mut buff = [0; KEY_LEN];
        buff.copy_from_slice(data);
        Ok(Self(buff))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn cipher(key: &[u8]) -> Result<Aes256Siv, CryptoError> {
    validate_sym_key(key)?;

    // the same key feeds both CMAC and CTR, the security bound difference is negligible
    let mut double_key = Zeroizing::new([0u8; 2 * KEY_LEN]);
    double_key[..KEY_LEN].copy_from_slice(key);
    double_key[KEY_LEN..].copy_from_slice(key);

    Aes256Siv::new_from_slice(&double_key[..])
        .map_err(|_| CryptoError::from(anyhow::anyhow!("failed to initialize AES-SIV cipher")))
}

/// Encrypt `plaintext`, authenticating `ad` alongside it
///
/// The output is `tag (16 bytes) || ciphertext`, exactly [`TAG_LEN`] bytes
/// longer than the plaintext.
///
/// # Errors
///
/// Returns an error if the key fails validation.
pub fn encrypt(key: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher = cipher(key)?;
    cipher
        .encrypt([ad], plaintext)
        .map_err(|_| CryptoError::from(anyhow::anyhow!("encrypt error")))
}

/// Decrypt and authenticate a ciphertext produced by [`encrypt`]
///
/// Tag comparison is constant time. Nothing is returned unless the tag
/// verifies against both the ciphertext and `ad`.
///
/// # Errors
///
/// Returns an error if:
/// - The key fails validation
/// - The ciphertext is shorter than the tag
/// - Authentication fails (wrong key, altered ciphertext or altered `ad`)
pub fn decrypt(key: &[u8], ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher = cipher(key)?;
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::TooShortCipher {
            got: ciphertext.len(),
            min: TAG_LEN,
        });
    }

    cipher
        .decrypt([ad], ciphertext)
        .map_err(|_| CryptoError::Authentication)
}
