//! Structured logging for the `cse-encrypt` binary.
//!
//! # Telemetry invariants
//!
//! - **No card data, content keys or key material** may appear in any log
//!   field. Key sizes and payload lengths are fine.
//! - Logs go to stderr; stdout carries only the encrypted output.

pub mod init;

pub use init::init;
