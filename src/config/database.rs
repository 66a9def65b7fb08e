//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! The same code talks to a local `SQLite` file during development and to a hosted
//! Postgres database in production; only `DATABASE_URL` changes. The table is generated
//! from the entity definition with `Schema::create_table_from_entity`, so the schema
//! always matches the Rust struct.

use crate::entities::CampaignInvoice;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://campaign_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database ({})", database_url.split(':').next().unwrap_or("?"));

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `campaign_invoices` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut invoice_table = schema.create_table_from_entity(CampaignInvoice);
    invoice_table.if_not_exists();

    db.execute(builder.build(&invoice_table)).await?;
    info!("Database tables ensured.");

    Ok(())
}

/// Verifies the connection with a real query and returns the number of stored invoices.
pub async fn check_connection(db: &DatabaseConnection) -> Result<u64> {
    CampaignInvoice::find().count(db).await.map_err(Into::into)
}
