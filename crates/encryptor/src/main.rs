//! `cse-encrypt`: encrypt one card for the payment gateway.
//!
//! Startup sequence:
//! 1. Load and validate [`AppConfig`] from `CSE_*` environment variables.
//! 2. Initialise structured JSON logging on stderr.
//! 3. Parse the gateway key into an [`Encryptor`].
//! 4. Read a card data JSON document from stdin, encrypt it, and print the
//!    token set as JSON on stdout.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use common::CardData;
use tracing::{error, info};

use encryptor::{telemetry, AppConfig, Encryptor, GenerationTime};

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = AppConfig::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "cse-encrypt starting");

    // -----------------------------------------------------------------------
    // 3. Key
    // -----------------------------------------------------------------------
    let enc = Encryptor::prepare(&cfg.public_key, cfg.encryptor_config()).map_err(|e| {
        error!(code = e.code(), error = %e, "gateway key rejected");
        e
    })?;

    // -----------------------------------------------------------------------
    // 4. Encrypt
    // -----------------------------------------------------------------------
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read card data from stdin")?;
    let card: CardData =
        serde_json::from_str(&input).context("stdin is not a card data JSON document")?;

    let tokens = enc
        .encrypt_card_data(&card, &GenerationTime::now())
        .map_err(|e| {
            error!(code = e.code(), error = %e, "card encryption failed");
            e
        })?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &tokens).context("failed to write output")?;
    writeln!(stdout).context("failed to write output")?;

    info!("card data encrypted");
    Ok(())
}
