//! Key identities for trust decisions.
//!
//! Wraps Ed25519 verifying keys with a Blake3 fingerprint. Grants name keys
//! by [`KeyId`] only; the raw verifying key is kept so that a parsed key can
//! be serialized back to a JWK.

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CoreError;

/// Domain separation prefix for key fingerprints.
const KEY_ID_DOMAIN: &[u8] = b"trustgraph:keyid:v1\0";

/// Algorithm tag mixed into the fingerprint.
const ALG_ED25519: u8 = 0x01;

/// A 32-byte key fingerprint, Blake3(domain || alg || raw key).
///
/// Serialized as a lowercase hex string so that bundles stay readable in
/// JSON form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub [u8; 32]);

impl KeyId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Fingerprint an Ed25519 key.
    pub fn for_ed25519(raw: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(KEY_ID_DOMAIN);
        hasher.update(&[ALG_ED25519]);
        hasher.update(raw);
        Self(*hasher.finalize().as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for KeyId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for KeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        KeyId::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// A parsed Ed25519 public key and its fingerprint.
///
/// Equality and hashing go through the [`KeyId`] only.
#[derive(Clone)]
pub struct PublicKey {
    raw: [u8; 32],
    id: KeyId,
}

impl PublicKey {
    /// Build from raw Ed25519 key bytes, rejecting points that do not decode.
    pub fn from_ed25519_bytes(raw: [u8; 32]) -> Result<Self, CoreError> {
        VerifyingKey::from_bytes(&raw)
            .map_err(|e| CoreError::MalformedKey(format!("invalid ed25519 point: {}", e)))?;
        Ok(Self {
            raw,
            id: KeyId::for_ed25519(&raw),
        })
    }

    /// The key's fingerprint.
    pub fn key_id(&self) -> KeyId {
        self.id
    }

    /// Raw Ed25519 key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.raw
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.id)
    }
}

/// An Ed25519 keypair, used by collectors and tests to mint identities.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        let raw = self.signing_key.verifying_key().to_bytes();
        PublicKey {
            raw,
            id: KeyId::for_ed25519(&raw),
        }
    }

    /// Shorthand for `public_key().key_id()`.
    pub fn key_id(&self) -> KeyId {
        self.public_key().key_id()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.key_id())
    }
}
