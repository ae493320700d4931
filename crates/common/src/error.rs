//! Common error types shared across crates.

use thiserror::Error;

/// Top-level encryptor error type.
///
/// Every variant is terminal for the call that produced it; no partial output
/// accompanies an error. [`CseError::code`] gives a stable machine-readable
/// identifier for each kind.
#[derive(Debug, Error)]
pub enum CseError {
    /// The raw key string has no `|` separating exponent and modulus.
    #[error("malformed key: missing '|' separator")]
    MalformedKey,

    /// A key component could not be decoded or does not form a usable RSA key.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// An encryption operation was attempted before a key was parsed.
    #[error("encryptor not ready: no key has been parsed")]
    NotReady,

    /// The underlying cryptographic operation failed.
    #[error("encryption failure: {0}")]
    Encryption(String),
}

impl CseError {
    /// Returns the short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CseError::MalformedKey => "malformed_key",
            CseError::InvalidKeyMaterial(_) => "invalid_key_material",
            CseError::NotReady => "not_ready",
            CseError::Encryption(_) => "encryption_failure",
        }
    }
}
