//! Password based key derivation using Argon2i
//!
//! Derivation is deliberately deterministic: the same password always yields
//! the same key, which is what lets a client be re-provisioned from its
//! password alone. The cost parameters are part of the protocol and must not
//! change without versioning.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::error::CryptoError;
use super::keys::{SecretKey, SEED_SIZE};
use super::secret::SymKey;
use super::validate::validate_password;
use super::KEY_LEN;

/// Argon2 time cost (iterations)
pub const KDF_TIME_COST: u32 = 1;
/// Argon2 memory cost in KiB (64 MiB)
pub const KDF_MEMORY_COST: u32 = 64 * 1024;
/// Argon2 parallelism (lanes)
pub const KDF_LANES: u32 = 4;

/// Fixed protocol salt
///
/// Argon2 requires at least 8 bytes of salt. This constant is public and the
/// same for every client, it adds no secrecy.
const KDF_SALT: &[u8; 16] = b"sealpost-kdf-v1\0";

fn derive(password: &str, out: &mut [u8]) -> Result<(), CryptoError> {
    validate_password(password.as_bytes())?;

    let params = Params::new(KDF_MEMORY_COST, KDF_TIME_COST, KDF_LANES, Some(out.len()))
        .map_err(|e| CryptoError::Kdf(format!("argon2 params invalid: {}", e)))?;
    Argon2::new(Algorithm::Argon2i, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), KDF_SALT, out)
        .map_err(|e| CryptoError::Kdf(format!("argon2 derivation failed: {}", e)))
}

/// Derive a symmetric key from a password
///
/// # Errors
///
/// Returns an error if the password is not valid UTF-8 or shorter than
/// [`PASSWORD_MIN_LEN`](super::PASSWORD_MIN_LEN) bytes.
pub fn derive_sym_key(password: &str) -> Result<SymKey, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    derive(password, key.as_mut_slice())?;
    SymKey::from_slice(key.as_slice())
}

/// Derive an Ed25519 private key from a password
///
/// The derived bytes are used as the Ed25519 seed.
pub fn ed25519_private_key_from_password(password: &str) -> Result<SecretKey, CryptoError> {
    let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
    derive(password, seed.as_mut_slice())?;
    Ok(SecretKey::from(*seed))
}
