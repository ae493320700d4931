//! Common types and errors shared across the CSE encryptor crates.

pub mod error;
pub mod protocol;

pub use error::CseError;
pub use protocol::{CardData, EncryptedCardData};
