//! JSON Web Key encoding of public keys.
//!
//! Only the OKP/Ed25519 form (RFC 8037) is accepted:
//!
//! ```text
//! {"kty":"OKP","crv":"Ed25519","x":"<base64url raw key>","kid":"<hex key id>"}
//! ```
//!
//! `kid` is optional. When present it must equal the derived [`KeyId`] so a
//! key cannot claim somebody else's identity.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::crypto::{KeyId, PublicKey};
use crate::error::{CoreError, Result};

const KTY_OKP: &str = "OKP";
const CRV_ED25519: &str = "Ed25519";

/// Wire form of a JWK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// Parse a serialized JWK into a [`PublicKey`].
    pub fn parse(bytes: &[u8]) -> Result<PublicKey> {
        let jwk: Jwk = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::MalformedKey(format!("not a JWK: {}", e)))?;
        jwk.to_public_key()
    }

    /// Convert this JWK into a [`PublicKey`].
    pub fn to_public_key(&self) -> Result<PublicKey> {
        if self.kty != KTY_OKP {
            return Err(CoreError::UnsupportedKey(format!("kty {}", self.kty)));
        }
        if self.crv != CRV_ED25519 {
            return Err(CoreError::UnsupportedKey(format!("crv {}", self.crv)));
        }

        let raw = URL_SAFE_NO_PAD
            .decode(self.x.trim_end_matches('='))
            .map_err(|e| CoreError::MalformedKey(format!("x is not base64url: {}", e)))?;
        let raw: [u8; 32] = raw
            .try_into()
            .map_err(|v: Vec<u8>| CoreError::MalformedKey(format!("x is {} bytes, expected 32", v.len())))?;

        let key = PublicKey::from_ed25519_bytes(raw)?;

        if let Some(kid) = &self.kid {
            let claimed = KeyId::from_hex(kid)
                .map_err(|e| CoreError::MalformedKey(format!("kid is not a key id: {}", e)))?;
            if claimed != key.key_id() {
                return Err(CoreError::MalformedKey(format!(
                    "kid {} does not match key {}",
                    claimed,
                    key.key_id()
                )));
            }
        }

        Ok(key)
    }

    /// Build the JWK for a public key, including its `kid`.
    pub fn from_public_key(key: &PublicKey) -> Self {
        Self {
            kty: KTY_OKP.to_string(),
            crv: CRV_ED25519.to_string(),
            x: URL_SAFE_NO_PAD.encode(key.as_bytes()),
            kid: Some(key.key_id().to_hex()),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Four string fields; serialization cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

impl PublicKey {
    /// Parse a serialized JWK.
    pub fn from_jwk(bytes: &[u8]) -> Result<Self> {
        Jwk::parse(bytes)
    }

    /// Serialize as a JWK.
    pub fn to_jwk(&self) -> Vec<u8> {
        Jwk::from_public_key(self).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_jwk_roundtrip() {
        let key = Keypair::from_seed(&[0x11; 32]).public_key();
        let parsed = PublicKey::from_jwk(&key.to_jwk()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_jwk_without_kid() {
        let key = Keypair::from_seed(&[0x12; 32]).public_key();
        let json = format!(
            r#"{{"kty":"OKP","crv":"Ed25519","x":"{}"}}"#,
            URL_SAFE_NO_PAD.encode(key.as_bytes())
        );
        let parsed = PublicKey::from_jwk(json.as_bytes()).unwrap();
        assert_eq!(parsed.key_id(), key.key_id());
    }

    #[test]
    fn test_jwk_kid_mismatch_rejected() {
        let key = Keypair::from_seed(&[0x13; 32]).public_key();
        let other = Keypair::from_seed(&[0x14; 32]).key_id();
        let mut jwk = Jwk::from_public_key(&key);
        jwk.kid = Some(other.to_hex());

        let err = PublicKey::from_jwk(&jwk.to_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedKey(_)));
    }

    #[test]
    fn test_jwk_rejects_other_curves() {
        let json = br#"{"kty":"EC","crv":"P-256","x":"AAAA"}"#;
        assert!(matches!(
            PublicKey::from_jwk(json),
            Err(CoreError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_jwk_rejects_garbage() {
        assert!(matches!(
            PublicKey::from_jwk(b"not json"),
            Err(CoreError::MalformedKey(_))
        ));
        assert!(matches!(
            PublicKey::from_jwk(br#"{"kty":"OKP","crv":"Ed25519","x":"AAAA"}"#),
            Err(CoreError::MalformedKey(_))
        ));
    }
}
