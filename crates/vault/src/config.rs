//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use fieldcrypt::{EnvelopeConfig, MasterKey};
use serde::Deserialize;

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 16, 24 or 32 byte key wrapping every subkey. **Required.**
    pub master_key: String,

    /// Owner reads allowed under one subkey before it is rotated.
    #[serde(default = "default_rotation_threshold")]
    pub rotation_threshold: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Header carrying the authenticated person id of the caller.
    #[serde(default = "default_principal_header")]
    pub principal_header: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rotation_threshold() -> u64 {
    10
}
fn default_listen_port() -> u16 {
    8200
}
fn default_principal_header() -> String {
    "X-Principal-Id".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Settings for the envelope cipher.
    ///
    /// # Errors
    ///
    /// Returns an error if `MASTER_KEY` is not a valid hex AES key.
    pub fn envelope_config(&self) -> Result<EnvelopeConfig> {
        let master_key =
            MasterKey::from_hex(&self.master_key).context("MASTER_KEY is not a usable key")?;
        Ok(EnvelopeConfig::new(master_key, self.rotation_threshold))
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.master_key.trim().is_empty() {
            anyhow::bail!("MASTER_KEY is required and must not be empty");
        }
        self.envelope_config()?;

        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be non-zero");
        }
        if self.principal_header.trim().is_empty() {
            anyhow::bail!("PRINCIPAL_HEADER must not be empty");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("master_key", &"[REDACTED]")
            .field("rotation_threshold", &self.rotation_threshold)
            .field("listen_port", &self.listen_port)
            .field("principal_header", &self.principal_header)
            .field("log_level", &self.log_level)
            .finish()
    }
}
