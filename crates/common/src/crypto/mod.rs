//! Cryptographic primitives for Sealpost
//!
//! This module provides everything the key material types build on:
//!
//! - **Symmetric encryption**: AES-SIV over 32-byte keys, with the protection
//!   timestamp bound in as associated data
//! - **Identity & Signing**: Ed25519 keypairs identifying clients
//! - **Key Agreement**: ECDH over X25519, using Ed25519 keys converted to
//!   their Montgomery form
//! - **Hashing**: SHA3-256, truncated to produce IDs and topic hashes
//! - **Password derivation**: Argon2i with fixed cost parameters
//!
//! # Wire Format
//!
//! Every protected message or command has the layout:
//!
//! ```text
//! [ timestamp: 8 bytes LE ][ siv tag: 16 bytes ][ ciphertext: len(payload) ]
//! ```
//!
//! The timestamp is authenticated but not encrypted. Receivers reject frames
//! whose timestamp is in the future or older than [`MAX_DELAY`].
//!
//! # Password Derivation
//!
//! The same password always yields the same key so that a client can be
//! recovered from its password alone. No per-user salt is mixed in; callers
//! are responsible for choosing passwords with enough entropy.
//!
//! Argon2 needs a salt of at least 8 bytes, so a fixed public protocol salt
//! stands in for the empty one. Keys derived here therefore differ from
//! those of peers that run Argon2i with an empty salt, and passwords shared
//! with such peers must be re-provisioned as raw keys.

use std::time::Duration;

mod error;
mod hash;
mod kdf;
mod keys;
mod protect;
mod secret;
mod validate;

pub use ed25519_dalek::Signature;
pub use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519SecretKey};

pub use error::CryptoError;
pub use hash::{derive_shared_key, hash_id_alias, hash_topic, sha3_sum256, Id};
pub use kdf::{derive_sym_key, ed25519_private_key_from_password};
pub use keys::{random_id, random_key, PublicKey, SecretKey};
pub use protect::{
    protect_command_pub_key, protect_sym_key, protect_sym_key_at, unprotect_sym_key,
    unprotect_sym_key_at,
};
pub use secret::{decrypt, encrypt, SymKey};
pub use validate::{
    validate_curve25519_pub_key, validate_ed25519_priv_key, validate_ed25519_pub_key, validate_id,
    validate_name, validate_password, validate_sym_key, validate_timestamp,
    validate_timestamp_at, validate_timestamp_key, validate_topic, validate_topic_hash,
    TimestampError, ValidationError,
};

/// Length of client and peer IDs in bytes
pub const ID_LEN: usize = 16;
/// Length of topic hashes in bytes
pub const HASH_LEN: usize = 16;
/// Length of symmetric keys in bytes
pub const KEY_LEN: usize = 32;
/// Length of the AES-SIV authentication tag in bytes
pub const TAG_LEN: usize = 16;
/// Length of the timestamp prefix of protected messages in bytes
pub const TIMESTAMP_LEN: usize = 8;
/// Maximum length of a topic in bytes
pub const MAX_TOPIC_LEN: usize = 256;
/// Minimum length of a name in bytes
pub const NAME_MIN_LEN: usize = 1;
/// Maximum length of a name in bytes
pub const NAME_MAX_LEN: usize = 255;
/// Minimum length of a password in bytes
pub const PASSWORD_MIN_LEN: usize = 16;
/// Size of an Ed25519 private key (seed || public key) in bytes
pub const ED25519_PRIVATE_KEY_LEN: usize = 64;
/// Size of an Ed25519 public key in bytes
pub const ED25519_PUBLIC_KEY_LEN: usize = 32;
/// Size of a Curve25519 public key in bytes
pub const CURVE25519_KEY_LEN: usize = 32;
/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_LEN: usize = 64;

/// How far in the past a protected message timestamp may lie
pub const MAX_DELAY: Duration = Duration::from_secs(10 * 60);
/// How far in the past a key transition timestamp may lie
pub const MAX_DELAY_KEY_TRANSITION: Duration = Duration::from_secs(60 * 60);
