//! JSON snapshots of key material
//!
//! A snapshot is a tagged envelope:
//!
//! ```json
//! { "keyType": 0, "keyData": { "key": "<hex>" } }
//! ```
//!
//! `keyType` selects the variant ([`KeyType`]) and `keyData` carries its
//! fields as lowercase hex. Public key material is stored as:
//!
//! ```json
//! {
//!   "keyType": 1,
//!   "keyData": {
//!     "signerId": "<hex>",
//!     "privateKey": "<hex, 64 bytes>",
//!     "c2PublicKey": "<hex>",
//!     "pubKeys": { "<hex id>": "<hex key>" }
//!   }
//! }
//! ```
//!
//! Decoding reads the tag first and hands `keyData` to the decoder
//! registered for it. Every field goes back through the same validation as
//! the constructors, and unknown tags or missing fields are errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::crypto::{Id, SymKey};

use super::{KeyMaterial, KeyMaterialError, PubKeyMaterial, SymKeyMaterial};

/// Variant tag of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum KeyType {
    Symmetric = 0,
    PublicKey = 1,
}

impl From<KeyType> for u8 {
    fn from(key_type: KeyType) -> Self {
        key_type as u8
    }
}

impl TryFrom<u8> for KeyType {
    type Error = SnapshotError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(KeyType::Symmetric),
            1 => Ok(KeyType::PublicKey),
            other => Err(SnapshotError::UnknownKeyType(other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown key type: {0}")]
    UnknownKeyType(u8),
    #[error("invalid hex in {field}: {source}")]
    InvalidHex {
        field: &'static str,
        source: hex::FromHexError,
    },
    #[error("invalid key material: {0}")]
    Material(#[from] KeyMaterialError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    key_type: KeyType,
    key_data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    key_type: u8,
    key_data: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymKeyData {
    key: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PubKeyData {
    signer_id: Id,
    private_key: String,
    c2_public_key: String,
    pub_keys: BTreeMap<Id, String>,
}

impl From<&SymKeyMaterial> for SymKeyData {
    fn from(material: &SymKeyMaterial) -> Self {
        Self {
            key: material.key().to_hex(),
        }
    }
}

impl From<&PubKeyMaterial> for PubKeyData {
    fn from(material: &PubKeyMaterial) -> Self {
        let (signer_id, private_key, c2_public_key, pub_keys) = material.export();
        Self {
            signer_id,
            private_key: hex::encode(&private_key.to_bytes()[..]),
            c2_public_key: hex::encode(c2_public_key),
            pub_keys: pub_keys
                .into_iter()
                .map(|(id, key)| (id, key.to_hex()))
                .collect(),
        }
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, SnapshotError> {
    hex::decode(value).map_err(|source| SnapshotError::InvalidHex { field, source })
}

fn decode_symmetric(data: Value) -> Result<KeyMaterial, SnapshotError> {
    let data: SymKeyData = serde_json::from_value(data)?;
    let key = decode_hex("key", &data.key)?;
    let key = SymKey::from_slice(&key).map_err(KeyMaterialError::from)?;
    Ok(KeyMaterial::Symmetric(SymKeyMaterial::from(key)))
}

fn decode_pub_key(data: Value) -> Result<KeyMaterial, SnapshotError> {
    let data: PubKeyData = serde_json::from_value(data)?;
    let private_key = zeroize::Zeroizing::new(decode_hex("privateKey", &data.private_key)?);
    let c2_public_key = decode_hex("c2PublicKey", &data.c2_public_key)?;

    let material = PubKeyMaterial::new(data.signer_id.as_bytes(), &private_key, &c2_public_key)?;
    for (id, key) in &data.pub_keys {
        let key = decode_hex("pubKeys", key)?;
        material.add_pub_key(id.as_bytes(), &key)?;
    }

    Ok(KeyMaterial::PublicKey(material))
}

type Decoder = fn(Value) -> Result<KeyMaterial, SnapshotError>;

/// One decoder per variant, looked up by tag
const DECODERS: &[(KeyType, Decoder)] = &[
    (KeyType::Symmetric, decode_symmetric),
    (KeyType::PublicKey, decode_pub_key),
];

fn decode(envelope: RawEnvelope) -> Result<KeyMaterial, SnapshotError> {
    let key_type = KeyType::try_from(envelope.key_type)?;
    let (_, decoder) = DECODERS
        .iter()
        .find(|(tag, _)| *tag == key_type)
        .ok_or(SnapshotError::UnknownKeyType(envelope.key_type))?;
    decoder(envelope.key_data)
}

/// Serialize `material` to a JSON snapshot
pub fn to_json(material: &KeyMaterial) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(material)?)
}

/// Load key material from a JSON snapshot
pub fn from_json(json: &str) -> Result<KeyMaterial, SnapshotError> {
    let envelope: RawEnvelope = serde_json::from_str(json)?;
    decode(envelope)
}

/// Load key material from an already parsed JSON snapshot
pub fn from_value(value: Value) -> Result<KeyMaterial, SnapshotError> {
    let envelope: RawEnvelope = serde_json::from_value(value)?;
    decode(envelope)
}

impl Serialize for KeyMaterial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyMaterial::Symmetric(m) => Envelope {
                key_type: KeyType::Symmetric,
                key_data: SymKeyData::from(m),
            }
            .serialize(serializer),
            KeyMaterial::PublicKey(m) => Envelope {
                key_type: KeyType::PublicKey,
                key_data: PubKeyData::from(m),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for KeyMaterial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = RawEnvelope::deserialize(deserializer)?;
        decode(envelope).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::crypto::{hash_id_alias, random_key, SecretKey};

    fn pub_key_material() -> PubKeyMaterial {
        let c2 = SecretKey::generate().public().to_x25519().unwrap();
        let material =
            PubKeyMaterial::random(hash_id_alias("client").as_bytes(), c2.as_bytes()).unwrap();
        for alias in ["peer1", "peer2"] {
            material
                .add_pub_key(
                    hash_id_alias(alias).as_bytes(),
                    &SecretKey::generate().public().to_bytes(),
                )
                .unwrap();
        }
        material
    }

    #[test]
    fn test_symmetric_snapshot() {
        let key = random_key();
        let material = KeyMaterial::from(SymKeyMaterial::new(&key).unwrap());

        let json = material.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["keyType"], 0);
        assert_eq!(value["keyData"]["key"], key.to_hex());

        let restored = KeyMaterial::from_json(&json).unwrap();
        assert_eq!(restored.key_type(), KeyType::Symmetric);
        assert_eq!(restored.as_symmetric().unwrap().key(), key);
    }

    #[test]
    fn test_pub_key_snapshot() {
        let material = KeyMaterial::from(pub_key_material());
        let json = to_json(&material).unwrap();
        assert!(json.contains("\"keyType\":1"));

        let restored = from_json(&json).unwrap();
        assert_eq!(restored.key_type(), KeyType::PublicKey);

        let original = material.as_pub_key().unwrap();
        let restored = restored.as_pub_key().unwrap();

        assert_eq!(restored.signer_id(), original.signer_id());
        assert_eq!(restored.private_key(), original.private_key());
        assert_eq!(restored.c2_public_key(), original.c2_public_key());
        assert_eq!(restored.get_pub_keys(), original.get_pub_keys());
        assert_eq!(restored.get_pub_keys().len(), 2);
    }

    #[test]
    fn test_snapshot_field_names() {
        let material = KeyMaterial::from(pub_key_material());
        let value = serde_json::to_value(&material).unwrap();
        let data = value["keyData"].as_object().unwrap();

        let mut fields: Vec<_> = data.keys().map(String::as_str).collect();
        fields.sort();
        assert_eq!(
            fields,
            ["c2PublicKey", "privateKey", "pubKeys", "signerId"]
        );
        assert_eq!(data["privateKey"].as_str().unwrap().len(), 128);
        assert_eq!(data["signerId"], hash_id_alias("client").to_hex());
        assert!(data["pubKeys"]
            .as_object()
            .unwrap()
            .contains_key(&hash_id_alias("peer1").to_hex()));

        assert!(from_value(value).is_ok());
    }

    #[test]
    fn test_unknown_key_type() {
        let snapshot = json!({ "keyType": 7, "keyData": { "key": random_key().to_hex() } });
        assert!(matches!(
            from_json(&snapshot.to_string()),
            Err(SnapshotError::UnknownKeyType(7))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(matches!(
            from_json(r#"{ "keyData": {} }"#),
            Err(SnapshotError::Json(_))
        ));
        assert!(matches!(
            from_json(r#"{ "keyType": 0 }"#),
            Err(SnapshotError::Json(_))
        ));
        assert!(matches!(
            from_json(r#"{ "keyType": 0, "keyData": {} }"#),
            Err(SnapshotError::Json(_))
        ));

        let mut value = serde_json::to_value(KeyMaterial::from(pub_key_material())).unwrap();
        value["keyData"]
            .as_object_mut()
            .unwrap()
            .remove("pubKeys");
        assert!(matches!(from_value(value), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let snapshot = json!({ "keyType": 0, "keyData": { "key": "zz" } });
        assert!(matches!(
            from_value(snapshot),
            Err(SnapshotError::InvalidHex { field: "key", .. })
        ));

        let snapshot = json!({ "keyType": 0, "keyData": { "key": hex::encode([0u8; 32]) } });
        assert!(matches!(
            from_value(snapshot),
            Err(SnapshotError::Material(KeyMaterialError::Crypto(_)))
        ));

        let value = serde_json::to_value(KeyMaterial::from(pub_key_material())).unwrap();

        let mut short_id = value.clone();
        short_id["keyData"]["signerId"] = json!("abcd");
        assert!(matches!(from_value(short_id), Err(SnapshotError::Json(_))));

        let mut zero_c2 = value;
        zero_c2["keyData"]["c2PublicKey"] = json!(hex::encode([0u8; 32]));
        assert!(matches!(
            from_value(zero_c2),
            Err(SnapshotError::Material(KeyMaterialError::Validation(_)))
        ));
    }

    #[test]
    fn test_embedded_in_document() {
        #[derive(Serialize, Deserialize)]
        struct Config {
            name: String,
            material: KeyMaterial,
        }

        let key = random_key();
        let config = Config {
            name: "thermostat".to_string(),
            material: KeyMaterial::from(SymKeyMaterial::new(&key).unwrap()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, "thermostat");
        assert_eq!(restored.material.as_symmetric().unwrap().key(), key);

        let broken = json!({ "name": "x", "material": { "keyType": 9, "keyData": {} } });
        assert!(serde_json::from_value::<Config>(broken).is_err());
    }
}
