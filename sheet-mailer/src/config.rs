//! Configuration for sheet-mailer
//!
//! Loaded from a TOML file. [`Config::load`] additionally applies
//! `MAILER__<SECTION>__<KEY>` environment overrides, so credentials such as
//! `MAILER__SMTP__AUTH__PASS` can stay out of the file.

use crate::error::{MailerError, Result};
use crate::resolver::AddressingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
const ENV_PREFIX: &str = "MAILER";

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Outgoing SMTP settings
    pub smtp: SmtpConfig,
    /// Recipient spreadsheet
    pub source: SourceConfig,
    /// How recipients are located in each row
    pub addressing: AddressingConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Implicit TLS when true, opportunistic STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,
    pub auth: SmtpAuth,
}

/// SMTP credentials. `user` is also the `From` address of every message.
#[derive(Clone, Deserialize, Serialize)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for SmtpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpAuth")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Path to a .csv or workbook file; only the first sheet is read
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

impl Config {
    /// Parse a TOML file without environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailerError::Config(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MailerError::Config(e.to_string()))
    }

    /// Load a TOML file and layer `MAILER__*` environment variables on top
    ///
    /// Environment values that look like numbers or booleans are parsed as
    /// such, so `MAILER__ADDRESSING__NAME_COLUMN=2` sets a column index.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| MailerError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| MailerError::Config(e.to_string()))
    }

    /// The identity every message is sent from
    pub fn sender(&self) -> &str {
        &self.smtp.auth.user
    }
}
