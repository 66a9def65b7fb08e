//! Campaign Discord commands - the profitability dashboard and per-campaign detail.
//!
//! Company and campaign names are free text, so every embed is sized against Discord's
//! limits before it is sent.

use crate::{
    core::{profitability::Profitability, report, totals::CampaignTotals},
    errors::Result,
};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Discord embed field limit
const MAX_FIELDS: usize = 25;
/// Discord embeds per message
const MAX_EMBEDS: usize = 10;
const TITLE_LIMIT: usize = 256;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
/// Combined characters of all embeds in one message, kept under Discord's 6000
const MESSAGE_BUDGET: usize = 5800;
/// Room left for the dashboard footer
const FOOTER_RESERVE: usize = 100;

type EmbedField = (String, String, bool);

fn status_emoji(summary: &Profitability) -> &'static str {
    if summary.profit > Decimal::ZERO {
        "🟢"
    } else if summary.profit.is_zero() {
        "🟡"
    } else {
        "🔴"
    }
}

fn summary_block(summary: &Profitability) -> Result<String> {
    let mut out = String::new();
    writeln!(
        &mut out,
        "**Revenue:** {}",
        report::format_currency(summary.revenue)
    )?;
    writeln!(
        &mut out,
        "**Expenses:** {}",
        report::format_currency(summary.expenses)
    )?;
    writeln!(
        &mut out,
        "**Profit:** {} {}",
        report::format_currency(summary.profit),
        status_emoji(summary)
    )?;
    write!(
        &mut out,
        "**Margin:** {}",
        report::format_margin_bar(summary.margin, Some(10))
    )?;
    Ok(out)
}

fn campaign_label(campaign: &CampaignTotals, limit: usize) -> String {
    report::truncate_chars(
        &format!("{} ({})", campaign.campaign_name, campaign.company),
        limit,
    )
}

fn campaign_field(campaign: &CampaignTotals) -> Result<EmbedField> {
    let mut value = format!(
        "{} to {} | {} invoice{}\n",
        report::format_date(campaign.date_from),
        report::format_date(campaign.date_to),
        campaign.invoices.len(),
        if campaign.invoices.len() == 1 { "" } else { "s" }
    );
    value.push_str(&summary_block(&campaign.summary)?);

    Ok((
        campaign_label(campaign, FIELD_NAME_LIMIT),
        report::truncate_chars(&value, FIELD_VALUE_LIMIT),
        false,
    ))
}

fn chars(text: &str) -> usize {
    text.chars().count()
}

/// Keeps leading fields while their names and values fit in `budget` characters.
fn fit_fields(fields: Vec<EmbedField>, budget: usize) -> Vec<EmbedField> {
    let mut used = 0;
    fields
        .into_iter()
        .take(MAX_FIELDS)
        .take_while(|(name, value, _)| {
            used += chars(name) + chars(value);
            used <= budget
        })
        .collect()
}

/// Character budget for the invoice list of one of `embed_count` campaign embeds.
fn invoice_list_budget(embed_count: usize, title: &str, description: &str) -> usize {
    let per_embed = MESSAGE_BUDGET / embed_count.max(1);
    per_embed
        .saturating_sub(chars(title) + chars(description) + chars("Invoices"))
        .min(FIELD_VALUE_LIMIT)
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{
        FOOTER_RESERVE, MAX_EMBEDS, MESSAGE_BUDGET, TITLE_LIMIT, campaign_field, campaign_label,
        chars, fit_fields, invoice_list_budget, summary_block,
    };
    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{report, totals::CampaignTotals},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Shows revenue, expenses, profit and margin per campaign and for the whole portfolio.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let totals = report::load_dashboard(db).await?;

        if totals.campaigns.is_empty() {
            ctx.say("📊 No invoices yet. Start one with `/invoice new` to get started!")
                .await?;
            return Ok(());
        }

        let title = "📊 Campaign Profitability";
        let description = format!("**Portfolio**\n{}", summary_block(&totals.portfolio)?);

        let fields = totals
            .campaigns
            .iter()
            .map(campaign_field)
            .collect::<Result<Vec<_>>>()?;
        let budget = MESSAGE_BUDGET
            .saturating_sub(chars(title) + chars(&description) + FOOTER_RESERVE);
        let fields = fit_fields(fields, budget);

        let invoice_count: usize = totals.campaigns.iter().map(|c| c.invoices.len()).sum();
        let mut footer = format!(
            "{} campaign{} | {invoice_count} invoice{}",
            totals.campaigns.len(),
            if totals.campaigns.len() == 1 { "" } else { "s" },
            if invoice_count == 1 { "" } else { "s" }
        );
        if fields.len() < totals.campaigns.len() {
            write!(
                &mut footer,
                " | showing first {}, use /campaign for the rest",
                fields.len()
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title(title)
            .description(description)
            .color(0x0034_98DB)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(footer));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows one campaign's totals and its invoices.
    #[poise::command(slash_command, prefix_command)]
    pub async fn campaign(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the campaign"]
        #[autocomplete = "autocomplete::autocomplete_campaign_name"]
        campaign_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let totals = report::load_dashboard(db).await?;

        let matching: Vec<&CampaignTotals> = totals
            .campaigns_named(&campaign_name)
            .take(MAX_EMBEDS)
            .collect();
        if matching.is_empty() {
            ctx.say(format!(
                "❌ Campaign '{}' not found. Use `/dashboard` to see all campaigns.",
                report::truncate_chars(&campaign_name, 200)
            ))
            .await?;
            return Ok(());
        }

        let embed_count = matching.len();
        let mut reply = poise::CreateReply::default();
        for campaign in matching {
            let title = format!("📋 {}", campaign_label(campaign, TITLE_LIMIT / 2));
            let description = format!(
                "{} to {}\n{}",
                report::format_date(campaign.date_from),
                report::format_date(campaign.date_to),
                summary_block(&campaign.summary)?
            );
            let lines: Vec<String> = campaign
                .invoices
                .iter()
                .map(report::format_invoice_line)
                .collect();
            let list_budget = invoice_list_budget(embed_count, &title, &description);

            let embed = serenity::CreateEmbed::default()
                .title(title)
                .description(description)
                .color(0x0034_98DB)
                .field(
                    "Invoices",
                    report::join_lines_within(&lines, list_budget),
                    false,
                );
            reply = reply.embed(embed);
        }

        ctx.send(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
