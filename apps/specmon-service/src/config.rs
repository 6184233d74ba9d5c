//! Environment-driven configuration.
//!
//! All settings come from the process environment (a `.env` file is loaded
//! by `main` via dotenvy before this runs). Address lists are comma-separated
//! with no internal spaces.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Milliseconds between runs when `SPECMON_POLL_INTERVAL_MS` is unset.
const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("invalid email address in {name}: {address}")]
    InvalidAddress { name: &'static str, address: String },
}

/// Top-level service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ongoing_dir: PathBuf,
    pub approved_dir: PathBuf,
    pub approved_csv_dir: PathBuf,
    pub poll_interval: Duration,
    pub database_url: String,
    pub email: EmailSettings,
}

/// SMTP endpoint, credentials, and the two address lists.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipients: Vec<String>,
    pub admins: Vec<String>,
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ongoing_dir: require("SPECMON_ONGOING_DIR")?.into(),
            approved_dir: require("SPECMON_APPROVED_DIR")?.into(),
            approved_csv_dir: require("SPECMON_APPROVED_CSV_DIR")?.into(),
            poll_interval: Duration::from_millis(parse_or_default(
                "SPECMON_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:specmon.db?mode=rwc".to_string()),
            email: EmailSettings::from_env()?,
        })
    }
}

impl EmailSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_server: require("SMTP_SERVER")?,
            smtp_port: parse_or_default("SMTP_PORT", 587)?,
            sender_email: require("SMTP_SENDER_EMAIL")?,
            sender_password: require("SMTP_SENDER_PASSWORD")?,
            recipients: parse_address_list(
                "SPECMON_RECIPIENT_EMAILS",
                &require("SPECMON_RECIPIENT_EMAILS")?,
            )?,
            admins: parse_address_list(
                "SPECMON_ADMIN_EMAILS",
                &require("SPECMON_ADMIN_EMAILS")?,
            )?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or_default<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated address list and validate every entry.
fn parse_address_list(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let addresses: Vec<String> = raw
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect();

    if addresses.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    for address in &addresses {
        if !email_address::EmailAddress::is_valid(address) {
            return Err(ConfigError::InvalidAddress {
                name,
                address: address.clone(),
            });
        }
    }
    Ok(addresses)
}
