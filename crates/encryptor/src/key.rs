//! Parsing of the gateway's `"<hex-exponent>|<hex-modulus>"` key format.
//!
//! The raw string is normalised into a [`KeyDescriptor`] (a JWK with
//! base64url `n`/`e`), and the descriptor is then turned into an RSA public
//! key. The base64url round trip reproduces the gateway's own key publishing
//! format and must stay bit-exact.

use common::CseError;
use rand::rngs::OsRng;
use rsa::{traits::PublicKeyParts, BigUint, Oaep, RsaPublicKey};
use serde::Serialize;
use sha1::Sha1;
use tracing::debug;

use crate::codec::{base64url_decode, base64url_no_pad, hex_decode};
use crate::crypto::{JweError, KeyWrap};

/// JWK `kid` the gateway expects for client-side keys.
pub const KEY_ID: &str = "asf-key";

/// JWK `alg` of every parsed key.
pub const KEY_ALGORITHM: &str = "RSA-OAEP";

/// JWK `use` of every parsed key.
pub const KEY_USE: &str = "sig";

/// Largest accepted modulus. Gateway keys are 2048 bits today.
pub const MAX_MODULUS_BITS: usize = 16384;

/// Public parameters of a gateway key in JWK form.
///
/// `n` and `e` hold unpadded base64url encodings of the big-endian bytes
/// decoded from the vendor hex. They are never re-encoded after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    #[serde(rename = "kty")]
    key_type: &'static str,
    #[serde(rename = "kid")]
    key_id: &'static str,
    #[serde(rename = "n")]
    modulus: String,
    #[serde(rename = "e")]
    exponent: String,
    #[serde(rename = "alg")]
    algorithm: &'static str,
    #[serde(rename = "use")]
    key_use: &'static str,
}

impl KeyDescriptor {
    pub fn key_type(&self) -> &str {
        self.key_type
    }

    pub fn key_id(&self) -> &str {
        self.key_id
    }

    /// Base64url modulus.
    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    /// Base64url public exponent.
    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    pub fn algorithm(&self) -> &str {
        self.algorithm
    }

    pub fn key_use(&self) -> &str {
        self.key_use
    }

    /// Serialise the descriptor as a JWK JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::InvalidKeyMaterial`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, CseError> {
        serde_json::to_string(self).map_err(|e| CseError::InvalidKeyMaterial(e.to_string()))
    }
}

/// Split a raw gateway key and normalise it into a [`KeyDescriptor`].
///
/// The first `|`-separated part is the exponent, the second the modulus; any
/// further parts are ignored.
///
/// # Errors
///
/// Returns [`CseError::MalformedKey`] if `raw_key` has no `|`.
/// Returns [`CseError::InvalidKeyMaterial`] if either part is not hex.
pub fn parse_key(raw_key: &str) -> Result<KeyDescriptor, CseError> {
    let mut parts = raw_key.split('|');
    let (exponent_hex, modulus_hex) = match (parts.next(), parts.next()) {
        (Some(e), Some(n)) => (e, n),
        _ => return Err(CseError::MalformedKey),
    };

    let exponent = hex_decode(exponent_hex)?;
    let modulus = hex_decode(modulus_hex)?;

    Ok(KeyDescriptor {
        key_type: "RSA",
        key_id: KEY_ID,
        modulus: base64url_no_pad(&modulus),
        exponent: base64url_no_pad(&exponent),
        algorithm: KEY_ALGORITHM,
        key_use: KEY_USE,
    })
}

/// RSA public key that wraps content-encryption keys with RSA-OAEP.
///
/// Read-only once built; safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    inner: RsaPublicKey,
}

impl PublicKeyMaterial {
    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// The underlying RSA public key.
    pub fn rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl KeyWrap for PublicKeyMaterial {
    fn algorithm(&self) -> &'static str {
        KEY_ALGORITHM
    }

    fn wrap(&self, cek: &[u8]) -> Result<Vec<u8>, JweError> {
        self.inner
            .encrypt(&mut OsRng, Oaep::new::<Sha1>(), cek)
            .map_err(|e| JweError::KeyWrap(e.to_string()))
    }
}

/// Build an RSA public key from a descriptor's base64url `n` and `e`.
///
/// # Errors
///
/// Returns [`CseError::InvalidKeyMaterial`] if either field is not unpadded
/// base64url, or if the resulting numbers are not an acceptable RSA key
/// (zero or over-long modulus, exponent outside `2..=2^33-1`).
pub fn to_public_key(descriptor: &KeyDescriptor) -> Result<PublicKeyMaterial, CseError> {
    let n = base64url_decode(&descriptor.modulus)?;
    let e = base64url_decode(&descriptor.exponent)?;
    if n.iter().all(|b| *b == 0) {
        return Err(CseError::InvalidKeyMaterial("modulus is zero".into()));
    }
    if e.iter().all(|b| *b == 0) {
        return Err(CseError::InvalidKeyMaterial("exponent is zero".into()));
    }

    let inner = RsaPublicKey::new_with_max_size(
        BigUint::from_bytes_be(&n),
        BigUint::from_bytes_be(&e),
        MAX_MODULUS_BITS,
    )
    .map_err(|e| CseError::InvalidKeyMaterial(e.to_string()))?;

    debug!(modulus_bits = inner.n().bits(), "public key material ready");
    Ok(PublicKeyMaterial { inner })
}
