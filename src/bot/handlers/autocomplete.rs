//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests campaign names, editable invoice fields and invoice ids
//! as the user types.

use crate::{
    bot::BotData,
    core::invoice::{self, InvoiceField},
    errors::Error,
};

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;

/// Provides autocomplete suggestions for campaign names.
///
/// Names come from the stored invoices and are matched case-insensitively
/// anywhere in the name.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
///
/// # Returns
/// Up to 25 matching campaign names, sorted alphabetically
pub async fn autocomplete_campaign_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(names) = invoice::list_campaign_names(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect();

    matching.sort();
    matching
}

/// Provides autocomplete suggestions for editable invoice fields.
pub async fn autocomplete_invoice_field(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    InvoiceField::ALL
        .into_iter()
        .map(InvoiceField::as_str)
        .filter(|name| name.contains(&partial_lower))
        .map(str::to_string)
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for invoice ids.
///
/// Suggests the short (8 character) ids shown by `/invoices`, newest first, matching
/// either the id prefix or the company or campaign name.
pub async fn autocomplete_invoice_id(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(invoices) = invoice::list_invoices(db).await else {
        return Vec::new();
    };

    let partial_lower = partial.trim().to_lowercase();

    invoices
        .into_iter()
        .filter_map(|inv| {
            let id = inv.id.simple().to_string();
            let matches = id.starts_with(&partial_lower)
                || inv.company.to_lowercase().contains(&partial_lower)
                || inv.campaign_name.to_lowercase().contains(&partial_lower);
            matches.then(|| id.chars().take(8).collect::<String>())
        })
        .take(MAX_CHOICES)
        .collect()
}
