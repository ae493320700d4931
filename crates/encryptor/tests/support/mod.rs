//! Test-only JWE opener for tokens sealed to the fixture key.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use encryptor::crypto::{jwe::authentication_tag, CompactJwe};
use rsa::{pkcs8::DecodePrivateKey, Oaep, RsaPrivateKey};
use sha1::Sha1;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Gateway key string matching [`private_key`].
pub fn raw_public_key() -> String {
    include_str!("../fixtures/gateway_public_key.txt").trim().to_string()
}

pub fn private_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(include_str!("../fixtures/gateway_private_key.pem"))
        .expect("fixture key parses")
}

/// Decoded protected header and plaintext of a token.
pub struct Opened {
    pub header: serde_json::Value,
    pub plaintext: Vec<u8>,
}

/// Unwrap the CEK, check the tag, and decrypt.
pub fn open(token: &str, key: &RsaPrivateKey) -> Opened {
    let jwe = CompactJwe::parse(token).expect("token is compact JWE");
    let header = serde_json::from_slice(&jwe.header_json().unwrap()).expect("header is JSON");

    let cek = key
        .decrypt(Oaep::new::<Sha1>(), &jwe.encrypted_key)
        .expect("CEK unwraps");
    assert_eq!(cek.len(), 64);
    let (mac_key, enc_key) = cek.split_at(32);

    let tag = authentication_tag(mac_key, jwe.protected.as_bytes(), &jwe.iv, &jwe.ciphertext)
        .unwrap();
    assert_eq!(tag.as_slice(), jwe.tag.as_slice(), "authentication tag mismatch");

    let plaintext = Aes256CbcDec::new_from_slices(enc_key, &jwe.iv)
        .unwrap()
        .decrypt_padded_vec_mut::<Pkcs7>(&jwe.ciphertext)
        .expect("padding is valid");

    Opened { header, plaintext }
}
