//! Timestamped message protection
//!
//! Protection seals a payload under a symmetric key, binding the current
//! time as associated data. Unprotection checks the frame length, then the
//! replay window, and only then authenticates and decrypts.
//!
//! # Wire Format
//!
//! ```text
//! [ timestamp: 8 bytes LE unix seconds ][ siv tag: 16 bytes ][ ciphertext ]
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use super::error::CryptoError;
use super::hash::derive_shared_key;
use super::secret::{decrypt, encrypt};
use super::validate::validate_timestamp_at;
use super::{MAX_DELAY, TAG_LEN, TIMESTAMP_LEN};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Protect `payload` under `key`, stamped with the current time
///
/// # Errors
///
/// Returns an error if the key fails validation.
pub fn protect_sym_key(payload: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    protect_sym_key_at(payload, key, unix_now())
}

/// Protect `payload` under `key`, stamped with an explicit unix timestamp
pub fn protect_sym_key_at(
    payload: &[u8],
    key: &[u8],
    timestamp: u64,
) -> Result<Vec<u8>, CryptoError> {
    let timestamp = timestamp.to_le_bytes();
    let ciphertext = encrypt(key, &timestamp, payload)?;

    let mut protected = Vec::with_capacity(TIMESTAMP_LEN + ciphertext.len());
    protected.extend_from_slice(&timestamp);
    protected.extend_from_slice(&ciphertext);

    let expected = TIMESTAMP_LEN + payload.len() + TAG_LEN;
    if protected.len() != expected {
        return Err(CryptoError::InvalidProtectedLen {
            expected,
            got: protected.len(),
        });
    }

    Ok(protected)
}

/// Recover the payload of a frame produced by [`protect_sym_key`]
///
/// # Errors
///
/// Returns an error if:
/// - The frame cannot hold a timestamp, a tag and at least one byte
/// - The timestamp is in the future or older than [`MAX_DELAY`]
/// - Authentication fails
pub fn unprotect_sym_key(protected: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    unprotect_sym_key_at(protected, key, SystemTime::now())
}

/// Like [`unprotect_sym_key`], checking the replay window against `now`
pub fn unprotect_sym_key_at(
    protected: &[u8],
    key: &[u8],
    now: SystemTime,
) -> Result<Vec<u8>, CryptoError> {
    if protected.len() <= TIMESTAMP_LEN + TAG_LEN {
        return Err(CryptoError::TooShortCipher {
            got: protected.len(),
            min: TIMESTAMP_LEN + TAG_LEN + 1,
        });
    }

    let (timestamp, ciphertext) = protected.split_at(TIMESTAMP_LEN);
    let mut ts = [0; TIMESTAMP_LEN];
    ts.copy_from_slice(timestamp);

    if let Err(e) = validate_timestamp_at(&ts, now, MAX_DELAY) {
        tracing::warn!(
            "rejecting protected frame with timestamp {}: {}",
            u64::from_le_bytes(ts),
            e
        );
        return Err(e.into());
    }

    decrypt(key, timestamp, ciphertext)
}

/// Protect a command for a single client without a stored shared key
///
/// The command key is the truncated hash of the X25519 shared secret between
/// `secret_key` and `client_public_key`. The client recovers the same key from
/// its own private key and the sender's public key.
pub fn protect_command_pub_key(
    command: &[u8],
    client_public_key: &X25519PublicKey,
    secret_key: &StaticSecret,
) -> Result<Vec<u8>, CryptoError> {
    let shared = secret_key.diffie_hellman(client_public_key);
    let key = derive_shared_key(shared.as_bytes())?;
    protect_sym_key(command, &key)
}
