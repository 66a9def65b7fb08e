//! Ledger settings loading from config.toml
//!
//! The file is optional. Without it the ledger runs with the standard 18% tax rate.
//!
//! ```toml
//! [ledger]
//! tax_rate = "0.18"
//! ```

use crate::core::profitability::DEFAULT_TAX_RATE;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Ledger calculation settings
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Settings that affect derived invoice values
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Tax rate applied when grossing up amounts, as a fraction (0.18 = 18%)
    pub tax_rate: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

/// Parses and checks configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or the tax rate is negative.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.ledger.tax_rate.is_sign_negative() && !config.ledger.tax_rate.is_zero() {
        return Err(Error::Config {
            message: format!("tax_rate must not be negative, got {}", config.ledger.tax_rate),
        });
    }

    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or a value is out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    debug!("Loading configuration from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `./config.toml`, using defaults when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        info!("No config.toml found, using default tax rate {DEFAULT_TAX_RATE}");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::dec;

    #[test]
    fn test_parse_ledger_config() {
        let config = parse_config(
            r#"
            [ledger]
            tax_rate = "0.12"
        "#,
        )
        .unwrap();
        assert_eq!(config.ledger.tax_rate, dec("0.12"));
    }

    #[test]
    fn test_empty_config_uses_default_rate() {
        let config = parse_config("").unwrap();
        assert_eq!(config.ledger.tax_rate, DEFAULT_TAX_RATE);

        let config = parse_config("[ledger]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_negative_tax_rate_rejected() {
        let result = parse_config("[ledger]\ntax_rate = \"-0.18\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[ledger\ntax_rate = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_config("definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
