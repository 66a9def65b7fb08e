//! Shared test utilities for the ledger.
//!
//! This module provides helpers for setting up test databases and building
//! invoices with sensible defaults.

use crate::{
    core::{
        invoice::{self, DerivedInvoice, InvoiceInput},
        profitability::DEFAULT_TAX_RATE,
    },
    entities::campaign_invoice,
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use std::str::FromStr;
use uuid::Uuid;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a decimal literal, panicking on typos in test code.
#[allow(clippy::unwrap_used)]
pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Builds a calendar date, panicking on impossible dates in test code.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A valid invoice input.
///
/// # Defaults
/// * company / campaign: "Acme Corp" / "Summer Sale", January 2024
/// * customer billed and received: 10000
/// * vendor billed and paid: 7000
/// * both sides `Pending`
pub fn sample_input() -> InvoiceInput {
    InvoiceInput {
        company: "Acme Corp".to_string(),
        campaign_name: "Summer Sale".to_string(),
        date_from: date(2024, 1, 1),
        date_to: date(2024, 1, 31),
        customer_invoice_number: "INV-001".to_string(),
        customer_amount_without_tax: dec("10000"),
        customer_received_amount_without_tax: dec("10000"),
        vendor_name: Some("Print House".to_string()),
        vendor_invoice_number: Some("PH-17".to_string()),
        vendor_amount_without_tax: dec("7000"),
        vendor_paid_amount_without_tax: dec("7000"),
        ..InvoiceInput::blank(date(2024, 1, 1))
    }
}

/// An input for the given campaign with custom received and paid amounts.
pub fn custom_input(company: &str, campaign: &str, received: &str, paid: &str) -> InvoiceInput {
    InvoiceInput {
        company: company.to_string(),
        campaign_name: campaign.to_string(),
        customer_amount_without_tax: dec(received),
        customer_received_amount_without_tax: dec(received),
        vendor_amount_without_tax: dec(paid),
        vendor_paid_amount_without_tax: dec(paid),
        ..sample_input()
    }
}

/// Turns a derived invoice into a stored-looking model without touching a database.
#[allow(clippy::unwrap_used)]
pub fn model_from_derived(derived: DerivedInvoice) -> campaign_invoice::Model {
    let now = Utc::now();
    let mut active = campaign_invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    derived.apply_to(&mut active);
    sea_orm::TryIntoModel::try_into_model(active).unwrap()
}

/// A stored-looking model for the given campaign, received and paid amounts.
#[allow(clippy::unwrap_used)]
pub fn invoice_model(
    company: &str,
    campaign: &str,
    received: &str,
    paid: &str,
) -> campaign_invoice::Model {
    let input = custom_input(company, campaign, received, paid);
    model_from_derived(invoice::derive_record(&input, DEFAULT_TAX_RATE).unwrap())
}

/// Inserts an invoice for the given campaign with custom received and paid amounts.
pub async fn create_custom_invoice(
    db: &DatabaseConnection,
    company: &str,
    campaign: &str,
    received: &str,
    paid: &str,
) -> Result<campaign_invoice::Model> {
    let input = custom_input(company, campaign, received, paid);
    invoice::create_invoice(db, &input, DEFAULT_TAX_RATE).await
}
