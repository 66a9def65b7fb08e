//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the ledger, including all slash
//! commands, autocomplete handlers, and bot context management.

/// Discord command implementations (invoice, campaign, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::editor::Editor,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the configured tax rate and
/// one invoice editor per Discord user.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Tax rate used when deriving invoices
    pub tax_rate: Decimal,
    editors: Mutex<HashMap<u64, Editor>>,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and tax rate.
    #[must_use]
    pub fn new(database: DatabaseConnection, tax_rate: Decimal) -> Self {
        Self {
            database,
            tax_rate,
            editors: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` against the editor of `user_id`, creating one in `Viewing` if needed.
    ///
    /// The lock is released when `f` returns, so `f` must not await.
    pub async fn with_editor<T>(&self, user_id: u64, f: impl FnOnce(&mut Editor) -> T) -> T {
        let mut editors = self.editors.lock().await;
        f(editors.entry(user_id).or_default())
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// Commands are registered in `guild_id` when given (instant updates during development),
/// otherwise globally.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData, guild_id: Option<u64>) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::status(),
                commands::invoices(),
                commands::invoice(),
                commands::dashboard(),
                commands::campaign(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!("Registered commands in guild {guild_id}");
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered commands globally");
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;

    Ok(())
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{invoice::InvoiceField, profitability::DEFAULT_TAX_RATE};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_editors_are_per_user() -> Result<()> {
        let data = BotData::new(setup_test_db().await?, DEFAULT_TAX_RATE);

        data.with_editor(1, |editor| editor.begin_new(date(2024, 1, 1)).map(|_| ()))
            .await?;
        data.with_editor(1, |editor| editor.set_field(InvoiceField::Company, "Acme"))
            .await?;

        let other_has_draft = data.with_editor(2, |editor| editor.draft().is_some()).await;
        assert!(!other_has_draft);

        let company = data
            .with_editor(1, |editor| editor.draft().map(|d| d.input.company.clone()))
            .await;
        assert_eq!(company.as_deref(), Some("Acme"));
        Ok(())
    }
}
