//! General Discord commands - ping, help, status and other utility commands.
//! This module contains simple commands that provide basic bot functionality
//! and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        config::database,
        errors::{Error, Result},
    };
    use tracing::warn;

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Checks that the database is reachable and reports how many invoices it holds.
    #[poise::command(slash_command, prefix_command)]
    pub async fn status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();

        match database::check_connection(&data.database).await {
            Ok(count) => {
                ctx.say(format!(
                    "✅ Database connected. {count} invoice(s) stored. Tax rate: {}%",
                    (data.tax_rate * rust_decimal::Decimal::ONE_HUNDRED).normalize()
                ))
                .await?;
            }
            Err(e) => {
                warn!("Database health check failed: {e}");
                ctx.say(format!("❌ Database connection failed: {e}")).await?;
            }
        }
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Campaign Ledger Help**\n\
        Track customer and vendor invoices per campaign, with tax and profit worked out for you.\n\n\
        **Viewing**\n\
        • `/invoices` - Lists every invoice, newest first.\n\
        • `/dashboard` - Shows revenue, expenses, profit and margin per campaign and overall.\n\
        • `/campaign <name>` - Shows one campaign and its invoices.\n\n\
        **Editing**\n\
        • `/invoice new` - Starts a blank invoice draft.\n\
        • `/invoice edit <id>` - Starts editing an existing invoice.\n\
        • `/invoice set <field> <value>` - Changes one field of your draft.\n\
        • `/invoice show` - Shows your draft with its tax and profit preview.\n\
        • `/invoice save` - Saves your draft.\n\
        • `/invoice cancel` - Discards your draft.\n\
        • `/invoice delete <id> <confirm>` - Permanently deletes an invoice.\n\n\
        **Utility**\n\
        • `/status` - Checks the database connection.\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Amounts are entered without tax; amounts with tax are always calculated.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
