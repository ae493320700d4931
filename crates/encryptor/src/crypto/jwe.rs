//! RSA-OAEP + A256CBC-HS512 encryption into JWE compact tokens.
//!
//! Each call draws a fresh 512-bit content-encryption key (CEK) and a fresh
//! 128-bit IV from the OS CSPRNG. The CEK is split in half: the first 32 bytes
//! key HMAC-SHA-512, the last 32 bytes key AES-256-CBC. The authentication tag
//! is the first 32 bytes of
//! `HMAC(aad || iv || ciphertext || be64(bit_len(aad)))`, where `aad` is the
//! ASCII of the encoded protected header.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::Sha512;
use thiserror::Error;
use tracing::debug;

use crate::codec::{base64url_decode, base64url_no_pad};

/// Byte length of the combined MAC + encryption key.
pub const CEK_LEN: usize = 64;

/// Byte length of the AES-CBC initialisation vector.
pub const IV_LEN: usize = 16;

/// Byte length of the truncated HMAC-SHA-512 tag.
pub const TAG_LEN: usize = 32;

/// JOSE `enc` identifier of the content encryption.
pub const CONTENT_ENCRYPTION: &str = "A256CBC-HS512";

/// Value of the custom `version` protected-header field.
pub const HEADER_VERSION: &str = "1";

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type HmacSha512 = Hmac<Sha512>;

/// Errors produced by the encryption engine.
#[derive(Debug, Error)]
pub enum JweError {
    /// A derived AES or HMAC key had the wrong length.
    #[error("invalid content key length")]
    InvalidKeyLength,

    /// Wrapping the content key under the recipient key failed,
    /// e.g. a modulus too small for OAEP padding.
    #[error("key wrap failed: {0}")]
    KeyWrap(String),

    /// The protected header could not be serialised.
    #[error("protected header serialisation failed: {0}")]
    Header(#[from] serde_json::Error),

    /// A token string is not five base64url segments.
    #[error("invalid compact serialisation")]
    InvalidFormat,
}

/// Recipient key capable of wrapping a content-encryption key.
pub trait KeyWrap {
    /// JOSE `alg` identifier written to the protected header.
    fn algorithm(&self) -> &'static str;

    /// Encrypt `cek` for the recipient.
    fn wrap(&self, cek: &[u8]) -> Result<Vec<u8>, JweError>;
}

/// Protected header; field order is the serialised order.
#[derive(Debug, Serialize)]
struct ProtectedHeader<'a> {
    alg: &'a str,
    enc: &'a str,
    version: &'a str,
}

/// The five parts of a compact token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactJwe {
    /// Base64url protected header, kept encoded since it doubles as the AAD.
    pub protected: String,
    pub encrypted_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl CompactJwe {
    /// Encode as `protected.encryptedKey.iv.ciphertext.tag`.
    pub fn to_string_repr(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            self.protected,
            base64url_no_pad(&self.encrypted_key),
            base64url_no_pad(&self.iv),
            base64url_no_pad(&self.ciphertext),
            base64url_no_pad(&self.tag),
        )
    }

    /// Split a compact token into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::InvalidFormat`] unless `s` has exactly five
    /// `.`-separated unpadded base64url segments.
    pub fn parse(s: &str) -> Result<Self, JweError> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 5 {
            return Err(JweError::InvalidFormat);
        }
        let decode = |p: &str| base64url_decode(p).map_err(|_| JweError::InvalidFormat);
        decode(parts[0])?;
        Ok(Self {
            protected: parts[0].to_string(),
            encrypted_key: decode(parts[1])?,
            iv: decode(parts[2])?,
            ciphertext: decode(parts[3])?,
            tag: decode(parts[4])?,
        })
    }

    /// Decoded protected header JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::InvalidFormat`] if the header is not base64url.
    pub fn header_json(&self) -> Result<Vec<u8>, JweError> {
        base64url_decode(&self.protected).map_err(|_| JweError::InvalidFormat)
    }
}

/// Encrypt `plaintext` for the holder of `key` and return the compact token.
///
/// # Errors
///
/// Returns [`JweError::KeyWrap`] if the recipient key cannot wrap a
/// [`CEK_LEN`]-byte key, or another [`JweError`] on an internal failure.
pub fn encrypt_token<K: KeyWrap + ?Sized>(plaintext: &[u8], key: &K) -> Result<String, JweError> {
    let header = serde_json::to_vec(&ProtectedHeader {
        alg: key.algorithm(),
        enc: CONTENT_ENCRYPTION,
        version: HEADER_VERSION,
    })?;
    let protected = base64url_no_pad(&header);

    let mut cek = [0u8; CEK_LEN];
    OsRng.fill_bytes(&mut cek);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let result = seal(&cek, &iv, &protected, plaintext, key);
    // Zero the content key before returning, success or not.
    cek.iter_mut().for_each(|b| *b = 0);
    let (encrypted_key, ciphertext, tag) = result?;

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "token sealed"
    );

    Ok(CompactJwe {
        protected,
        encrypted_key,
        iv: iv.to_vec(),
        ciphertext,
        tag: tag.to_vec(),
    }
    .to_string_repr())
}

type Sealed = (Vec<u8>, Vec<u8>, [u8; TAG_LEN]);

fn seal<K: KeyWrap + ?Sized>(
    cek: &[u8; CEK_LEN],
    iv: &[u8; IV_LEN],
    protected: &str,
    plaintext: &[u8],
    key: &K,
) -> Result<Sealed, JweError> {
    let encrypted_key = key.wrap(cek)?;

    let (mac_key, enc_key) = cek.split_at(CEK_LEN / 2);
    let ciphertext = Aes256CbcEnc::new_from_slices(enc_key, iv)
        .map_err(|_| JweError::InvalidKeyLength)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let tag = authentication_tag(mac_key, protected.as_bytes(), iv, &ciphertext)?;
    Ok((encrypted_key, ciphertext, tag))
}

/// Compute the A256CBC-HS512 authentication tag.
///
/// # Errors
///
/// Returns [`JweError::InvalidKeyLength`] if HMAC rejects `mac_key`.
pub fn authentication_tag(
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<[u8; TAG_LEN], JweError> {
    let mut mac =
        <HmacSha512 as Mac>::new_from_slice(mac_key).map_err(|_| JweError::InvalidKeyLength)?;
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&((aad.len() as u64) * 8).to_be_bytes());

    let full = mac.finalize().into_bytes();
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&full[..TAG_LEN]);
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockDecryptMut;

    type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

    /// Hands the CEK back unencrypted so tests can open the token.
    struct CleartextWrap;

    impl KeyWrap for CleartextWrap {
        fn algorithm(&self) -> &'static str {
            "RSA-OAEP"
        }

        fn wrap(&self, cek: &[u8]) -> Result<Vec<u8>, JweError> {
            Ok(cek.to_vec())
        }
    }

    struct RefusingWrap;

    impl KeyWrap for RefusingWrap {
        fn algorithm(&self) -> &'static str {
            "RSA-OAEP"
        }

        fn wrap(&self, _cek: &[u8]) -> Result<Vec<u8>, JweError> {
            Err(JweError::KeyWrap("message too long".into()))
        }
    }

    fn open(token: &str) -> Vec<u8> {
        let jwe = CompactJwe::parse(token).unwrap();
        let (mac_key, enc_key) = jwe.encrypted_key.split_at(CEK_LEN / 2);
        let tag = authentication_tag(mac_key, jwe.protected.as_bytes(), &jwe.iv, &jwe.ciphertext)
            .unwrap();
        assert_eq!(tag.as_slice(), jwe.tag.as_slice(), "tag mismatch");
        Aes256CbcDec::new_from_slices(enc_key, &jwe.iv)
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(&jwe.ciphertext)
            .unwrap()
    }

    /// RFC 7518 appendix B.3 (AES_256_CBC_HMAC_SHA_512).
    #[test]
    fn rfc7518_a256cbc_hs512_vector() {
        let mut cek = [0u8; CEK_LEN];
        cek.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
        let iv: [u8; IV_LEN] = hex::decode("1af38c2dc2b96ffdd86694092341bc04")
            .unwrap()
            .try_into()
            .unwrap();
        let aad = "The second principle of Auguste Kerckhoffs";
        let plaintext = b"A cipher system must not be required to be secret, and it must be able to fall into the hands of the enemy without inconvenience";

        let (wrapped, ciphertext, tag) = seal(&cek, &iv, aad, plaintext, &CleartextWrap).unwrap();

        assert_eq!(wrapped, cek);
        assert_eq!(
            hex::encode(ciphertext),
            concat!(
                "4affaaadb78c31c5da4b1b590d10ffbd3dd8d5d302423526912da037ecbcc7bd",
                "822c301dd67c373bccb584ad3e9279c2e6d12a1374b77f077553df829410446b",
                "36ebd97066296ae6427ea75c2e0846a11a09ccf5370dc80bfecbad28c73f09b3",
                "a3b75e662a2594410ae496b2e2e6609e31e6e02cc837f053d21f37ff4f51950b",
                "be2638d09dd7a4930930806d0703b1f6",
            )
        );
        assert_eq!(
            hex::encode(tag),
            "4dd3b4c088a7f45c216839645b2012bf2e6269a8c56a816dbc1b267761955bc5"
        );
    }

    #[test]
    fn token_has_five_segments() {
        let token = encrypt_token(b"{\"cvc\":\"737\"}", &CleartextWrap).unwrap();
        assert_eq!(token.split('.').count(), 5);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }

    #[test]
    fn protected_header_is_exact() {
        let token = encrypt_token(b"x", &CleartextWrap).unwrap();
        let jwe = CompactJwe::parse(&token).unwrap();
        assert_eq!(
            jwe.header_json().unwrap(),
            br#"{"alg":"RSA-OAEP","enc":"A256CBC-HS512","version":"1"}"#
        );
    }

    #[test]
    fn segment_sizes() {
        let token = encrypt_token(&[0u8; 20], &CleartextWrap).unwrap();
        let jwe = CompactJwe::parse(&token).unwrap();
        assert_eq!(jwe.encrypted_key.len(), CEK_LEN);
        assert_eq!(jwe.iv.len(), IV_LEN);
        assert_eq!(jwe.ciphertext.len(), 32);
        assert_eq!(jwe.tag.len(), TAG_LEN);
    }

    #[test]
    fn round_trip_through_cleartext_wrap() {
        let plaintext = br#"{"expiryMonth":"03","generationtime":"2024-01-01T00:00:00.000Z"}"#;
        let token = encrypt_token(plaintext, &CleartextWrap).unwrap();
        assert_eq!(open(&token), plaintext);
    }

    #[test]
    fn empty_plaintext_is_one_padding_block() {
        let token = encrypt_token(b"", &CleartextWrap).unwrap();
        let jwe = CompactJwe::parse(&token).unwrap();
        assert_eq!(jwe.ciphertext.len(), 16);
        assert!(open(&token).is_empty());
    }

    #[test]
    fn fresh_key_and_iv_per_call() {
        let a = CompactJwe::parse(&encrypt_token(b"same", &CleartextWrap).unwrap()).unwrap();
        let b = CompactJwe::parse(&encrypt_token(b"same", &CleartextWrap).unwrap()).unwrap();
        assert_eq!(a.protected, b.protected);
        assert_ne!(a.encrypted_key, b.encrypted_key);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn tampered_ciphertext_fails_tag_check() {
        let token = encrypt_token(b"tamper me", &CleartextWrap).unwrap();
        let mut jwe = CompactJwe::parse(&token).unwrap();
        jwe.ciphertext[0] ^= 0xFF;
        let (mac_key, _) = jwe.encrypted_key.split_at(CEK_LEN / 2);
        let tag = authentication_tag(mac_key, jwe.protected.as_bytes(), &jwe.iv, &jwe.ciphertext)
            .unwrap();
        assert_ne!(tag.as_slice(), jwe.tag.as_slice());
    }

    #[test]
    fn wrap_failure_is_reported() {
        assert!(matches!(
            encrypt_token(b"x", &RefusingWrap),
            Err(JweError::KeyWrap(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        assert!(CompactJwe::parse("a.b.c.d").is_err());
        assert!(CompactJwe::parse("a.b.c.d.e.f").is_err());
    }

    #[test]
    fn parse_rejects_bad_base64() {
        assert!(CompactJwe::parse("e30.!!!.AA.AA.AA").is_err());
    }
}
