//! Report generation and display formatting.
//!
//! This module loads the dashboard totals and renders amounts, margins and dates the way
//! the ledger shows them: whole rupees with Indian digit grouping, margins to one decimal,
//! dates as `dd/mm/yyyy`. All functions return plain strings that the bot layer can embed.

use crate::{
    core::{
        invoice,
        totals::{CampaignTotals, Totals, derive_totals},
    },
    entities::campaign_invoice,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sea_orm::DatabaseConnection;

/// Loads every invoice and aggregates it into campaign and portfolio totals.
pub async fn load_dashboard(db: &DatabaseConnection) -> Result<Totals> {
    let invoices = invoice::list_invoices(db).await?;
    derive_totals(&invoices)
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// Formats an amount as whole rupees with Indian digit grouping.
///
/// # Returns
/// Strings like `"₹1,23,457"` or `"-₹500"`
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rupees = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rupees.abs().trunc().to_string();
    let sign = if rupees.is_sign_negative() && !rupees.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}₹{}", group_indian(&digits))
}

/// Formats a margin percentage with one decimal place, e.g. `"13.3%"`.
#[must_use]
pub fn format_margin(margin: Decimal) -> String {
    let rounded = margin.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}%")
}

/// Formats a date as `dd/mm/yyyy`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Generates a margin bar for visual representation.
///
/// Creates a text bar like: `[████░░░░░░] 40.0%`. The bar is clamped to 0-100%,
/// the printed margin is not.
#[must_use]
pub fn format_margin_bar(margin: Decimal, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = margin.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let filled = (clamped * Decimal::from(length) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(length);
    let empty = length - filled;

    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(empty),
        format_margin(margin)
    )
}

/// One-line summary of an invoice for listings.
#[must_use]
pub fn format_invoice_line(invoice: &campaign_invoice::Model) -> String {
    let short_id: String = invoice.id.simple().to_string().chars().take(8).collect();
    format!(
        "`{short_id}` {} / {} | in {} ({}) | out {} ({}) | profit {} ({})",
        invoice.company,
        invoice.campaign_name,
        format_currency(invoice.customer_received_amount_without_tax),
        invoice.customer_payment_status,
        format_currency(invoice.vendor_paid_amount_without_tax),
        invoice.vendor_payment_status,
        format_currency(invoice.profit),
        format_margin(invoice.margin),
    )
}

/// One-line summary of a campaign for the dashboard.
#[must_use]
pub fn format_campaign_line(campaign: &CampaignTotals) -> String {
    let summary = &campaign.summary;
    format!(
        "**{}** ({}) {} to {} | {} invoice(s) | revenue {} | expenses {} | profit {} | margin {}",
        campaign.campaign_name,
        campaign.company,
        format_date(campaign.date_from),
        format_date(campaign.date_to),
        campaign.invoices.len(),
        format_currency(summary.revenue),
        format_currency(summary.expenses),
        format_currency(summary.profit),
        format_margin(summary.margin),
    )
}

/// Shortens `text` to at most `max` characters, ending with `…` when cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Joins lines with newlines, stopping before `limit` characters and noting how many were left out.
#[must_use]
pub fn join_lines_within(lines: &[String], limit: usize) -> String {
    let mut out = String::new();
    for (shown, line) in lines.iter().enumerate() {
        let remaining = lines.len() - shown;
        let note = format!("…and {remaining} more");
        if out.chars().count() + line.chars().count() + note.chars().count() + 2 > limit {
            out.push_str(&note);
            return out;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}
