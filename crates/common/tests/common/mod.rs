//! Shared test utilities for key material integration tests
#![allow(dead_code)]

use std::sync::Once;

use common::crypto::{hash_id_alias, Id, SecretKey, X25519PublicKey, X25519SecretKey};
use common::material::PubKeyMaterial;

static TRACING: Once = Once::new();

/// Install a test subscriber once, filtered by `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The controller side of a deployment: one Ed25519 keypair whose X25519
/// form is shared with every client at provisioning time
pub struct Controller {
    pub secret_key: SecretKey,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            secret_key: SecretKey::generate(),
        }
    }

    pub fn curve_public_key(&self) -> X25519PublicKey {
        self.secret_key.public().to_x25519().unwrap()
    }

    pub fn curve_secret_key(&self) -> X25519SecretKey {
        self.secret_key.to_x25519()
    }
}

/// A provisioned public key client with its ID and private key
pub struct Client {
    pub id: Id,
    pub secret_key: SecretKey,
    pub material: PubKeyMaterial,
}

impl Client {
    pub fn new(alias: &str, controller: &Controller) -> Self {
        let id = hash_id_alias(alias);
        let secret_key = SecretKey::generate();
        let material = PubKeyMaterial::new(
            id.as_bytes(),
            &secret_key.to_bytes()[..],
            controller.curve_public_key().as_bytes(),
        )
        .unwrap();
        Self {
            id,
            secret_key,
            material,
        }
    }

    /// Register `other` as a trusted signer
    pub fn trust(&self, other: &Client) {
        self.material
            .add_pub_key(other.id.as_bytes(), &other.secret_key.public().to_bytes())
            .unwrap();
    }
}
