//! Input validation
//!
//! Every check returns a descriptive error rather than a boolean so callers
//! can surface exactly what was wrong with an operator-supplied value.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{
    CURVE25519_KEY_LEN, ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN, HASH_LEN, ID_LEN,
    KEY_LEN, MAX_DELAY, MAX_DELAY_KEY_TRANSITION, MAX_TOPIC_LEN, NAME_MAX_LEN, NAME_MIN_LEN,
    PASSWORD_MIN_LEN, TIMESTAMP_LEN,
};

/// Errors describing why a key, ID or string was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {what} length, expected {expected}, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid {what}, all zeros")]
    AllZero { what: &'static str },
    #[error("{what} is not a valid UTF-8 string")]
    InvalidUtf8 { what: &'static str },
    #[error("name length is invalid, names are between {min} and {max} characters, got {got}")]
    NameLength { min: usize, max: usize, got: usize },
    #[error("topic cannot be empty")]
    EmptyTopic,
    #[error("topic too long, expected {max} chars maximum, got {got}")]
    TopicTooLong { max: usize, got: usize },
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Freshness failures of a protected message timestamp
///
/// The two cases point at different problems: a timestamp in the future
/// means the clocks disagree, a stale one means a delayed or replayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp received is in the future")]
    InFuture,
    #[error("timestamp too old")]
    TooOld,
}

fn check_len(what: &'static str, bytes: &[u8], expected: usize) -> Result<(), ValidationError> {
    if bytes.len() != expected {
        return Err(ValidationError::InvalidLength {
            what,
            expected,
            got: bytes.len(),
        });
    }
    Ok(())
}

fn check_not_zero(what: &'static str, bytes: &[u8]) -> Result<(), ValidationError> {
    if bytes.iter().all(|b| *b == 0) {
        return Err(ValidationError::AllZero { what });
    }
    Ok(())
}

/// Check that a symmetric key has the expected length and is not all zeros
pub fn validate_sym_key(key: &[u8]) -> Result<(), ValidationError> {
    check_len("symmetric key", key, KEY_LEN)?;
    check_not_zero("symmetric key", key)
}

/// Check that an Ed25519 private key (seed || public key) is well formed
pub fn validate_ed25519_priv_key(key: &[u8]) -> Result<(), ValidationError> {
    check_len("private key", key, ED25519_PRIVATE_KEY_LEN)?;
    check_not_zero("private key", key)
}

/// Check that an Ed25519 public key has the expected length and is not all zeros
pub fn validate_ed25519_pub_key(key: &[u8]) -> Result<(), ValidationError> {
    check_len("public key", key, ED25519_PUBLIC_KEY_LEN)?;
    check_not_zero("public key", key)
}

/// Check that a Curve25519 public key has the expected length and is not all zeros
pub fn validate_curve25519_pub_key(key: &[u8]) -> Result<(), ValidationError> {
    check_len("curve25519 public key", key, CURVE25519_KEY_LEN)?;
    check_not_zero("curve25519 public key", key)
}

pub fn validate_id(id: &[u8]) -> Result<(), ValidationError> {
    check_len("ID", id, ID_LEN)
}

pub fn validate_topic_hash(topic_hash: &[u8]) -> Result<(), ValidationError> {
    check_len("topic hash", topic_hash, HASH_LEN)
}

/// Check that a name is valid UTF-8 and within the allowed length bounds
///
/// Names are hashed before they ever reach the wire, so the bounds are
/// liberal.
pub fn validate_name(name: &[u8]) -> Result<(), ValidationError> {
    if std::str::from_utf8(name).is_err() {
        return Err(ValidationError::InvalidUtf8 { what: "name" });
    }
    if name.len() < NAME_MIN_LEN || name.len() > NAME_MAX_LEN {
        return Err(ValidationError::NameLength {
            min: NAME_MIN_LEN,
            max: NAME_MAX_LEN,
            got: name.len(),
        });
    }
    Ok(())
}

/// Check that a topic is neither empty nor longer than [`MAX_TOPIC_LEN`]
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    if topic.is_empty() {
        return Err(ValidationError::EmptyTopic);
    }
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ValidationError::TopicTooLong {
            max: MAX_TOPIC_LEN,
            got: topic.len(),
        });
    }
    Ok(())
}

/// Check that a password is valid UTF-8 and at least [`PASSWORD_MIN_LEN`] bytes
pub fn validate_password(password: &[u8]) -> Result<(), ValidationError> {
    if std::str::from_utf8(password).is_err() {
        return Err(ValidationError::InvalidUtf8 { what: "password" });
    }
    if password.len() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    Ok(())
}

/// Check that a little-endian timestamp lies within `[now - MAX_DELAY, now]`
pub fn validate_timestamp(timestamp: &[u8; TIMESTAMP_LEN]) -> Result<(), TimestampError> {
    validate_timestamp_at(timestamp, SystemTime::now(), MAX_DELAY)
}

/// Check that a little-endian timestamp lies within
/// `[now - MAX_DELAY_KEY_TRANSITION, now]`
pub fn validate_timestamp_key(timestamp: &[u8; TIMESTAMP_LEN]) -> Result<(), TimestampError> {
    validate_timestamp_at(timestamp, SystemTime::now(), MAX_DELAY_KEY_TRANSITION)
}

/// Check a timestamp against an explicit `now` and window
pub fn validate_timestamp_at(
    timestamp: &[u8; TIMESTAMP_LEN],
    now: SystemTime,
    max_delay: Duration,
) -> Result<(), TimestampError> {
    let ts = Duration::from_secs(u64::from_le_bytes(*timestamp));
    // a clock before the epoch can only make every frame look like it is from the future
    let now = now.duration_since(UNIX_EPOCH).unwrap_or_default();

    if ts > now {
        return Err(TimestampError::InFuture);
    }
    if ts < now.saturating_sub(max_delay) {
        return Err(TimestampError::TooOld);
    }
    Ok(())
}
