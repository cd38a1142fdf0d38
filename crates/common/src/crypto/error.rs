use super::validate::{TimestampError, ValidationError};

/// Errors that can occur while encrypting, decrypting or deriving keys
///
/// Authentication failures never say whether the key was wrong or the
/// ciphertext was altered.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("crypto error: {0}")]
    Default(#[from] anyhow::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error("ciphertext too short: got {got} bytes, need at least {min}")]
    TooShortCipher { got: usize, min: usize },
    #[error("invalid length of protected message, expected {expected}, got {got}")]
    InvalidProtectedLen { expected: usize, got: usize },
    #[error("message authentication failed")]
    Authentication,
    #[error("public key is not a valid edwards point")]
    InvalidPoint,
    #[error("key derivation failed: {0}")]
    Kdf(String),
}
