//! Hex and base64 primitives used by key parsing and token serialisation.
//!
//! All functions operate on raw bytes; callers convert text with
//! `str::as_bytes` before encoding.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use thiserror::Error;

/// Errors produced by the codec layer.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input contains a character that is not a hex digit.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The input is not unpadded base64url.
    #[error("invalid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Codec failures only arise while decoding key components.
impl From<CodecError> for common::CseError {
    fn from(e: CodecError) -> Self {
        common::CseError::InvalidKeyMaterial(e.to_string())
    }
}

/// Decode a hex string to raw bytes.
///
/// Odd-length input is treated as if it carried a leading zero nibble, so
/// `"10001"` decodes like `"010001"`. The empty string decodes to no bytes.
///
/// # Errors
///
/// Returns [`CodecError::Hex`] if `s` contains a non-hex character.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    if s.len() % 2 == 1 {
        return Ok(hex::decode(format!("0{s}"))?);
    }
    Ok(hex::decode(s)?)
}

/// Encode bytes as base64url without `=` padding.
pub fn base64url_no_pad(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url back to raw bytes.
///
/// # Errors
///
/// Returns [`CodecError::Base64`] on characters outside the URL-safe alphabet
/// or on trailing padding.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    Ok(URL_SAFE_NO_PAD.decode(s)?)
}

/// Encode bytes as padded base64 with the standard alphabet.
pub fn base64_std(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
