//! Unified error type for the ledger.
//!
//! Every fallible operation in `core`, `config` and `bot` returns [`Result`],
//! so command handlers can use `?` on database, formatting and Discord errors alike.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// All errors the application can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A monetary amount was negative or could not be parsed
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending input, as the user wrote it
        amount: String,
    },

    /// An invoice failed a field-level check
    #[error("Validation error: {message}")]
    Validation {
        /// Which rule failed
        message: String,
    },

    /// No invoice with this id exists
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// The id that was looked up
        id: Uuid,
    },

    /// The editor was asked to do something its current state does not allow
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// The attempted transition
        action: &'static str,
        /// The editor state at the time
        state: &'static str,
    },

    /// Database errors from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a message buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework errors
    #[error("Discord error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Builds an [`Error::InvalidAmount`] from a decimal value.
    #[must_use]
    pub fn invalid_amount(amount: Decimal) -> Self {
        Self::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Builds an [`Error::Validation`] from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Serenity(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
