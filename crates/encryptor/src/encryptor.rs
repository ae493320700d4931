//! [`Encryptor`]: parsed gateway key plus configuration, producing token sets.
//!
//! # Lifecycle
//!
//! 1. [`Encryptor::new`] creates an unkeyed encryptor holding only its
//!    [`EncryptorConfig`].
//! 2. [`Encryptor::parse_key`] parses the gateway key string; on success the
//!    encryptor is ready, on failure it stays exactly as it was.
//! 3. [`Encryptor::encrypt_card_data`] builds the four payloads and seals each
//!    one independently. Any failure fails the whole call.
//!
//! A ready encryptor is immutable and can be shared across threads.

use common::{CardData, CseError, EncryptedCardData};
use tracing::{debug, info};

use crate::config::EncryptorConfig;
use crate::crypto::encrypt_token;
use crate::key::{parse_key, to_public_key, KeyDescriptor, PublicKeyMaterial};
use crate::payload::{build_payloads, GenerationTime};

#[derive(Debug, Clone)]
struct ParsedKey {
    descriptor: KeyDescriptor,
    material: PublicKeyMaterial,
}

/// Client-side encryptor for one gateway key.
#[derive(Debug, Clone)]
pub struct Encryptor {
    config: EncryptorConfig,
    key: Option<ParsedKey>,
}

impl Encryptor {
    /// Create an encryptor with no key yet.
    pub fn new(config: EncryptorConfig) -> Self {
        Self { config, key: None }
    }

    /// Create an encryptor and parse `raw_key` in one step.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Encryptor::parse_key`].
    pub fn prepare(raw_key: &str, config: EncryptorConfig) -> Result<Self, CseError> {
        let mut enc = Self::new(config);
        enc.parse_key(raw_key)?;
        Ok(enc)
    }

    /// Parse a `"<hex-exponent>|<hex-modulus>"` key and make it current.
    ///
    /// Nothing is changed unless both the descriptor and the public key are
    /// built successfully.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::MalformedKey`] if the separator is missing, or
    /// [`CseError::InvalidKeyMaterial`] if a component cannot be decoded.
    pub fn parse_key(&mut self, raw_key: &str) -> Result<(), CseError> {
        let descriptor = parse_key(raw_key)?;
        let material = to_public_key(&descriptor)?;
        info!(modulus_bits = material.bits(), kid = descriptor.key_id(), "gateway key parsed");
        self.key = Some(ParsedKey {
            descriptor,
            material,
        });
        Ok(())
    }

    /// Returns `true` once a key has been parsed.
    pub fn is_ready(&self) -> bool {
        self.key.is_some()
    }

    pub fn config(&self) -> &EncryptorConfig {
        &self.config
    }

    /// JWK form of the parsed key, if any.
    pub fn descriptor(&self) -> Option<&KeyDescriptor> {
        self.key.as_ref().map(|k| &k.descriptor)
    }

    /// Seal one arbitrary plaintext buffer into a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::NotReady`] before a key is parsed, or
    /// [`CseError::Encryption`] if sealing fails.
    pub fn encrypt_field(&self, plaintext: &[u8]) -> Result<String, CseError> {
        let key = self.key.as_ref().ok_or(CseError::NotReady)?;
        Ok(encrypt_token(plaintext, &key.material)?)
    }

    /// Encrypt all four card fields, stamped with `now`.
    ///
    /// Fields are sealed in the order number, month, year, cvc, each with its
    /// own content key and IV.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::NotReady`] before a key is parsed, or
    /// [`CseError::Encryption`] if any of the four fields fails.
    pub fn encrypt_card_data(
        &self,
        card: &CardData,
        now: &GenerationTime,
    ) -> Result<EncryptedCardData, CseError> {
        if !self.is_ready() {
            return Err(CseError::NotReady);
        }
        let payloads = build_payloads(card, &self.config, now);

        let out = EncryptedCardData {
            encrypted_card_number: self.encrypt_field(&payloads.number)?,
            encrypted_expiry_month: self.encrypt_field(&payloads.expiry_month)?,
            encrypted_expiry_year: self.encrypt_field(&payloads.expiry_year)?,
            encrypted_security_code: self.encrypt_field(&payloads.cvc)?,
        };
        debug!("card data encrypted");
        Ok(out)
    }
}
