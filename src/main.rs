#![allow(clippy::result_large_err)]

use campaign_ledger::{
    bot::{self, BotData},
    config::{database, settings},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn dev_guild_id() -> Result<Option<u64>> {
    match env::var("DEV_GUILD_ID") {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("DEV_GUILD_ID must be a numeric guild id: {e}"),
            }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::EnvVar(e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the ledger settings
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;
    info!(tax_rate = %app_config.ledger.tax_rate, "Loaded ledger configuration.");

    // 4. Connect and make sure the invoice table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Run the bot; the token is read directly before use and never stored
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))?;
    let guild_id = dev_guild_id()?;

    bot::run_bot(token, BotData::new(db, app_config.ledger.tax_rate), guild_id).await?;

    Ok(())
}
