//! Authenticated encryption of single payloads into JWE compact tokens.
//!
//! This module has no knowledge of card data or payload layout; it seals
//! whatever bytes it is given for a [`KeyWrap`] recipient.
//!
//! # Token format
//!
//! ```text
//! <b64u(header)>.<b64u(wrapped CEK)>.<b64u(iv)>.<b64u(ciphertext)>.<b64u(tag)>
//! ```
//!
//! with the protected header
//! `{"alg":"RSA-OAEP","enc":"A256CBC-HS512","version":"1"}`.

pub mod jwe;

pub use jwe::{encrypt_token, CompactJwe, JweError, KeyWrap};

impl From<JweError> for common::CseError {
    fn from(e: JweError) -> Self {
        common::CseError::Encryption(e.to_string())
    }
}
