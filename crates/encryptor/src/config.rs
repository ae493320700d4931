//! Configuration loading and defaults.
//!
//! [`EncryptorConfig`] is what the core needs. [`AppConfig`] is what the
//! `cse-encrypt` binary reads from `CSE_`-prefixed environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Origin identifier and domain the payloads claim to come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncryptorConfig {
    /// Secured-fields origin key interpolated into the referrer URL.
    #[serde(default = "default_origin_key")]
    pub origin_key: String,

    /// Shop domain, base64-encoded into the referrer's `d` parameter.
    #[serde(default = "default_domain")]
    pub domain: String,
}

impl EncryptorConfig {
    /// Build a config, treating empty values as unspecified.
    pub fn new(origin_key: impl Into<String>, domain: impl Into<String>) -> Self {
        let origin_key = origin_key.into();
        let domain = domain.into();
        Self {
            origin_key: non_empty_or(origin_key, default_origin_key),
            domain: non_empty_or(domain, default_domain),
        }
    }
}

impl Default for EncryptorConfig {
    fn default() -> Self {
        Self {
            origin_key: default_origin_key(),
            domain: default_domain(),
        }
    }
}

/// Settings of the `cse-encrypt` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Gateway key in `"<hex-exponent>|<hex-modulus>"` form. **Required.**
    pub public_key: String,

    #[serde(default = "default_origin_key")]
    pub origin_key: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_origin_key() -> String {
    "live_YCN5QJ4BXJHSTL24DUQMIHO4JQP2XDLK".into()
}
fn default_domain() -> String {
    "https://www.bstn.com".into()
}
fn default_log_level() -> String {
    "info".into()
}

fn non_empty_or(value: String, default: fn() -> String) -> String {
    if value.trim().is_empty() {
        default()
    } else {
        value
    }
}

impl AppConfig {
    /// Load and validate configuration from `CSE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CSE_PUBLIC_KEY` is absent or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix("CSE"))
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: AppConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The core configuration, with empty values replaced by defaults.
    pub fn encryptor_config(&self) -> EncryptorConfig {
        EncryptorConfig::new(self.origin_key.clone(), self.domain.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.public_key.trim().is_empty() {
            anyhow::bail!("CSE_PUBLIC_KEY is required and must not be empty");
        }
        Ok(())
    }
}
