//! Snapshots must reload into material that behaves like the original
mod common;

use ::common::crypto::{protect_command_pub_key, protect_sym_key, random_key};
use ::common::material::{KeyMaterial, KeyType, SymKeyMaterial};

fn reload(material: &KeyMaterial) -> KeyMaterial {
    let json = material.to_json().unwrap();
    KeyMaterial::from_json(&json).unwrap()
}

#[test]
fn test_symmetric_snapshot_behaves_like_original() {
    common::init_tracing();

    let command_key = random_key();
    let original = KeyMaterial::from(SymKeyMaterial::new(&command_key).unwrap());
    let restored = reload(&original);
    assert_eq!(restored.key_type(), KeyType::Symmetric);

    let topic_key = random_key();
    let protected = original.protect_message(b"payload", &topic_key).unwrap();
    assert_eq!(
        restored.unprotect_message(&protected, &topic_key).unwrap(),
        b"payload"
    );
    let protected = restored.protect_message(b"payload", &topic_key).unwrap();
    assert_eq!(
        original.unprotect_message(&protected, &topic_key).unwrap(),
        b"payload"
    );

    let command = protect_sym_key(b"reboot", &command_key).unwrap();
    assert_eq!(restored.unprotect_command(&command).unwrap(), b"reboot");

    // a rotated key is what gets persisted
    let rotated = random_key();
    original.set_key(&rotated).unwrap();
    let restored = reload(&original);
    assert_eq!(restored.as_symmetric().unwrap().key(), rotated);
}

#[test]
fn test_pub_key_snapshot_behaves_like_original() {
    common::init_tracing();

    let controller = common::Controller::new();
    let client = common::Client::new("sensor-1", &controller);
    let peer = common::Client::new("sensor-2", &controller);
    client.trust(&client);
    client.trust(&peer);
    peer.trust(&client);

    let original = KeyMaterial::from(client.material);
    let restored = reload(&original);
    assert_eq!(restored.key_type(), KeyType::PublicKey);

    let (before, after) = (original.as_pub_key().unwrap(), restored.as_pub_key().unwrap());
    assert_eq!(after.signer_id(), before.signer_id());
    assert_eq!(after.public_key(), before.public_key());
    assert_eq!(after.c2_public_key(), before.c2_public_key());
    assert_eq!(after.get_pub_keys(), before.get_pub_keys());

    let topic_key = random_key();

    // messages signed by the restored material verify against the old key
    let protected = restored.protect_message(b"reading", &topic_key).unwrap();
    assert_eq!(
        peer.material
            .unprotect_message(&protected, &topic_key)
            .unwrap(),
        b"reading"
    );
    assert_eq!(
        original.unprotect_message(&protected, &topic_key).unwrap(),
        b"reading"
    );

    // the restored store still trusts the peer
    let protected = peer.material.protect_message(b"hello", &topic_key).unwrap();
    assert_eq!(
        restored.unprotect_message(&protected, &topic_key).unwrap(),
        b"hello"
    );

    let command = protect_command_pub_key(
        b"open valve",
        &before.public_key().to_x25519().unwrap(),
        &controller.curve_secret_key(),
    )
    .unwrap();
    assert_eq!(restored.unprotect_command(&command).unwrap(), b"open valve");

    // store changes are persisted as well
    after.remove_pub_key(peer.id.as_bytes()).unwrap();
    let reloaded = reload(&restored);
    assert_eq!(reloaded.as_pub_key().unwrap().get_pub_keys().len(), 1);
    assert!(reloaded.unprotect_message(&protected, &topic_key).is_err());
}

#[test]
fn test_snapshot_is_tagged_json() {
    let controller = common::Controller::new();
    let client = common::Client::new("sensor-1", &controller);
    let material = KeyMaterial::from(client.material);

    let value: serde_json::Value = serde_json::from_str(&material.to_json().unwrap()).unwrap();
    assert_eq!(value["keyType"], 1);
    assert_eq!(value["keyData"]["signerId"], client.id.to_hex());
    assert_eq!(
        value["keyData"]["c2PublicKey"],
        hex::encode(controller.curve_public_key().as_bytes())
    );
}
