/**
 * Cryptographic types and operations.
 *  - Symmetric keys, Ed25519 keys and X25519 agreement
 *  - Timestamped message protection
 *  - Hashing, validation and password derivation
 */
pub mod crypto;
/**
 * Per-client key material.
 * Symmetric and public key variants behind one
 *  interface, with the public key store and
 *  JSON snapshots.
 */
pub mod material;

pub mod prelude {
    pub use crate::crypto::{
        hash_id_alias, hash_topic, random_key, CryptoError, Id, PublicKey, SecretKey, SymKey,
    };
    pub use crate::material::{
        KeyMaterial, KeyMaterialError, KeyType, PubKeyMaterial, SnapshotError, SymKeyMaterial,
    };
}
