//! Client-side encryption of card fields for the payment gateway.
//!
//! Given the gateway's `"<hex-exponent>|<hex-modulus>"` key and raw card
//! data, produces four JWE compact tokens (RSA-OAEP, A256CBC-HS512) the
//! gateway can decrypt.
//!
//! # Example
//!
//! ```no_run
//! use common::CardData;
//! use encryptor::{Encryptor, EncryptorConfig, GenerationTime};
//!
//! # fn main() -> Result<(), common::CseError> {
//! let enc = Encryptor::prepare("10001|C9...", EncryptorConfig::default())?;
//! let card = CardData {
//!     number: "4111111111111111".into(),
//!     expiry_month: "03".into(),
//!     expiry_year: "2030".into(),
//!     cvc: "737".into(),
//! };
//! let tokens = enc.encrypt_card_data(&card, &GenerationTime::now())?;
//! # let _ = tokens;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod encryptor;
pub mod key;
pub mod payload;
pub mod telemetry;

pub use config::{AppConfig, EncryptorConfig};
pub use encryptor::Encryptor;
pub use key::{KeyDescriptor, PublicKeyMaterial};
pub use payload::GenerationTime;
