//! Invoice Discord commands - listing, drafting, saving and deleting invoices.
//!
//! Editing works through a per-user draft: `/invoice new` or `/invoice edit` opens it,
//! `/invoice set` changes one field at a time, and `/invoice save` writes it. Tax-inclusive
//! amounts, profit and margin are never entered; they are derived when the draft is saved.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            editor::{Draft, DraftTarget},
            invoice::{self, InvoiceField, derive_record},
            report,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::{info, warn};

    const EMBED_DESCRIPTION_LIMIT: usize = 4000;
    /// Leaves room under Discord's 2000 character message limit for surrounding text
    const REPLY_LIMIT: usize = 1800;

    fn draft_summary(draft: &Draft, tax_rate: rust_decimal::Decimal) -> Result<String> {
        let input = &draft.input;
        let mut out = String::new();

        match draft.target {
            DraftTarget::New => writeln!(&mut out, "📝 **New invoice draft**")?,
            DraftTarget::Existing(id) => writeln!(&mut out, "📝 **Editing invoice** `{id}`")?,
        }
        writeln!(
            &mut out,
            "**Campaign:** {} / {} ({} to {})",
            input.company,
            input.campaign_name,
            report::format_date(input.date_from),
            report::format_date(input.date_to)
        )?;
        writeln!(
            &mut out,
            "**Customer:** #{} billed {} received {} ({})",
            input.customer_invoice_number,
            report::format_currency(input.customer_amount_without_tax),
            report::format_currency(input.customer_received_amount_without_tax),
            input.customer_payment_status
        )?;
        writeln!(
            &mut out,
            "**Vendor:** {} #{} billed {} paid {} ({})",
            input.vendor_name.as_deref().unwrap_or("N/A"),
            input.vendor_invoice_number.as_deref().unwrap_or("N/A"),
            report::format_currency(input.vendor_amount_without_tax),
            report::format_currency(input.vendor_paid_amount_without_tax),
            input.vendor_payment_status
        )?;

        match derive_record(input, tax_rate) {
            Ok(derived) => {
                writeln!(
                    &mut out,
                    "**With tax:** billed {} received {} | vendor {} paid {}",
                    report::format_currency(derived.customer_amount_with_tax),
                    report::format_currency(derived.customer_received_amount_with_tax),
                    report::format_currency(derived.vendor_amount_with_tax),
                    report::format_currency(derived.vendor_paid_amount_with_tax)
                )?;
                write!(
                    &mut out,
                    "**Profit:** {} | **Margin:** {}",
                    report::format_currency(derived.profit),
                    report::format_margin(derived.margin)
                )?;
            }
            Err(e) => write!(&mut out, "⚠️ Not ready to save: {e}")?,
        }

        Ok(report::truncate_chars(&out, REPLY_LIMIT))
    }

    /// Lists every invoice, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn invoices(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let all = invoice::list_invoices(db).await?;

        if all.is_empty() {
            ctx.say("📄 No invoices yet. Start one with `/invoice new`.")
                .await?;
            return Ok(());
        }

        let lines: Vec<String> = all.iter().map(report::format_invoice_line).collect();
        let embed = serenity::CreateEmbed::default()
            .title("📄 Campaign Invoices")
            .description(report::join_lines_within(&lines, EMBED_DESCRIPTION_LIMIT))
            .color(0x0034_98DB)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} invoice{}",
                all.len(),
                if all.len() == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for drafting and managing invoices.
    #[poise::command(
        slash_command,
        subcommands(
            "invoice_new",
            "invoice_edit",
            "invoice_set",
            "invoice_show",
            "invoice_save",
            "invoice_cancel",
            "invoice_delete"
        )
    )]
    pub async fn invoice(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Invoice command. Available subcommands:\n\
            `/invoice new` - Start a blank draft\n\
            `/invoice edit` - Start editing an existing invoice\n\
            `/invoice set` - Change a field of your draft\n\
            `/invoice show` - Show your draft\n\
            `/invoice save` - Save your draft\n\
            `/invoice cancel` - Discard your draft\n\
            `/invoice delete` - Delete an invoice";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Starts a blank invoice draft.
    #[poise::command(slash_command, rename = "new")]
    pub async fn invoice_new(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let today = chrono::Utc::now().date_naive();

        let opened = data
            .with_editor(user_id, |editor| {
                editor
                    .begin_new(today)
                    .and_then(|draft| draft_summary(draft, data.tax_rate))
            })
            .await;

        match opened {
            Ok(summary) => {
                ctx.say(format!(
                    "{summary}\n\nFill it in with `/invoice set`, then `/invoice save`."
                ))
                .await?;
            }
            Err(e) => {
                ctx.say(format!("❌ {e}. Save or cancel your current draft first."))
                    .await?;
            }
        }
        Ok(())
    }

    /// Starts editing an existing invoice.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn invoice_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invoice id (the short id from /invoices is enough)"]
        #[autocomplete = "autocomplete::autocomplete_invoice_id"]
        id: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();

        let found = match invoice::find_invoice_by_reference(&data.database, &id).await {
            Ok(found) => found,
            Err(e @ Error::Validation { .. }) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let Some(existing) = found else {
            ctx.say(format!("❌ Invoice '{id}' not found. Use `/invoices` to see all invoices."))
                .await?;
            return Ok(());
        };

        let opened = data
            .with_editor(user_id, |editor| {
                editor
                    .begin_edit(&existing)
                    .and_then(|draft| draft_summary(draft, data.tax_rate))
            })
            .await;

        match opened {
            Ok(summary) => ctx.say(summary).await?,
            Err(e) => {
                ctx.say(format!("❌ {e}. Save or cancel your current draft first."))
                    .await?
            }
        };
        Ok(())
    }

    /// Changes one field of your draft.
    #[poise::command(slash_command, rename = "set")]
    pub async fn invoice_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Field to change"]
        #[autocomplete = "autocomplete::autocomplete_invoice_field"]
        field: String,
        #[description = "New value (amounts without tax, dates as YYYY-MM-DD, empty clears)"]
        value: Option<String>,
    ) -> Result<()> {
        let field: InvoiceField = match field.parse() {
            Ok(field) => field,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };
        let value = value.unwrap_or_default();
        let user_id = ctx.author().id.get();

        let changed = ctx
            .data()
            .with_editor(user_id, |editor| editor.set_field(field, &value))
            .await;

        match changed {
            Ok(()) => ctx.say(format!("✅ `{field}` set to '{value}'.")).await?,
            Err(e) => ctx.say(format!("❌ {e}")).await?,
        };
        Ok(())
    }

    /// Shows your draft with its tax and profit preview.
    #[poise::command(slash_command, rename = "show")]
    pub async fn invoice_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();

        let summary = data
            .with_editor(user_id, |editor| {
                editor
                    .draft()
                    .map(|draft| draft_summary(draft, data.tax_rate))
            })
            .await
            .transpose()?;

        match summary {
            Some(summary) => ctx.say(summary).await?,
            None => {
                ctx.say("ℹ️ No open draft. Use `/invoice new` or `/invoice edit`.")
                    .await?
            }
        };
        Ok(())
    }

    /// Saves your draft, deriving tax, profit and margin.
    #[poise::command(slash_command, rename = "save")]
    pub async fn invoice_save(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let user_id = ctx.author().id.get();

        let draft = match data.with_editor(user_id, |editor| editor.submit()).await {
            Ok(draft) => draft,
            Err(e) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let saved = match draft.target {
            DraftTarget::New => invoice::create_invoice(db, &draft.input, data.tax_rate).await,
            DraftTarget::Existing(id) => {
                invoice::update_invoice(db, id, &draft.input, data.tax_rate).await
            }
        };

        match saved {
            Ok(model) => {
                data.with_editor(user_id, |editor| editor.finish()).await?;
                info!(id = %model.id, user_id, "Invoice saved from Discord");
                ctx.say(format!(
                    "✅ Invoice saved.\n{}",
                    report::truncate_chars(&report::format_invoice_line(&model), REPLY_LIMIT)
                ))
                .await?;
            }
            Err(e) => {
                data.with_editor(user_id, |editor| editor.fail()).await?;
                warn!("Failed to save invoice draft: {e}");
                ctx.say(format!(
                    "❌ Failed to save invoice: {e}\nYour draft is kept; adjust it and try `/invoice save` again."
                ))
                .await?;
            }
        }
        Ok(())
    }

    /// Discards your draft.
    #[poise::command(slash_command, rename = "cancel")]
    pub async fn invoice_cancel(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.get();
        let cancelled = ctx
            .data()
            .with_editor(user_id, |editor| editor.cancel())
            .await;

        match cancelled {
            Ok(()) => ctx.say("🗑️ Draft discarded.").await?,
            Err(e) => ctx.say(format!("❌ {e}")).await?,
        };
        Ok(())
    }

    /// Permanently deletes an invoice.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn invoice_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invoice id (the short id from /invoices is enough)"]
        #[autocomplete = "autocomplete::autocomplete_invoice_id"]
        id: String,
        #[description = "Set to True to confirm; deletion cannot be undone"] confirm: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let found = match invoice::find_invoice_by_reference(db, &id).await {
            Ok(found) => found,
            Err(e @ Error::Validation { .. }) => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let Some(existing) = found else {
            ctx.say(format!("❌ Invoice '{id}' not found.")).await?;
            return Ok(());
        };

        if !confirm {
            ctx.say(format!(
                "⚠️ This will permanently delete:\n{}\nRun the command again with `confirm: True`.",
                report::truncate_chars(&report::format_invoice_line(&existing), REPLY_LIMIT)
            ))
            .await?;
            return Ok(());
        }

        match invoice::delete_invoice(db, existing.id).await {
            Ok(()) => {
                ctx.say(format!("✅ Invoice `{}` has been deleted.", existing.id))
                    .await?;
            }
            Err(e) => {
                ctx.say(format!("❌ Failed to delete invoice `{}`.", existing.id))
                    .await?;
                return Err(e);
            }
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
