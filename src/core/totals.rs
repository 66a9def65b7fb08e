//! Campaign and portfolio aggregation.
//!
//! Invoices are grouped by the exact `(company, campaign_name)` pair. Group and portfolio
//! margins are always recomputed from summed revenue and expenses; individual invoice
//! margins are never averaged.

use crate::{
    core::profitability::Profitability,
    entities::campaign_invoice,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Totals for one campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignTotals {
    /// Client company
    pub company: String,
    /// Campaign name
    pub campaign_name: String,
    /// Start date of the first invoice seen for the campaign
    pub date_from: NaiveDate,
    /// End date of the first invoice seen for the campaign
    pub date_to: NaiveDate,
    /// Member invoices, in input order
    pub invoices: Vec<campaign_invoice::Model>,
    /// Summed revenue and expenses with their profit and margin
    pub summary: Profitability,
}

/// Per-campaign totals plus the portfolio-wide summary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    /// One entry per campaign, in order of first appearance
    pub campaigns: Vec<CampaignTotals>,
    /// Totals over every invoice regardless of campaign
    pub portfolio: Profitability,
}

impl Totals {
    /// Campaigns with exactly this name, across companies.
    pub fn campaigns_named<'a>(
        &'a self,
        campaign_name: &'a str,
    ) -> impl Iterator<Item = &'a CampaignTotals> + 'a {
        self.campaigns
            .iter()
            .filter(move |campaign| campaign.campaign_name == campaign_name)
    }
}

fn revenue_and_expenses<'a>(
    invoices: impl IntoIterator<Item = &'a campaign_invoice::Model>,
) -> Result<(Decimal, Decimal)> {
    invoices
        .into_iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(received, paid), inv| {
            let received = received
                .checked_add(inv.customer_received_amount_without_tax)
                .ok_or_else(|| Error::invalid_amount(inv.customer_received_amount_without_tax))?;
            let paid = paid
                .checked_add(inv.vendor_paid_amount_without_tax)
                .ok_or_else(|| Error::invalid_amount(inv.vendor_paid_amount_without_tax))?;
            Ok((received, paid))
        })
}

/// Groups invoices into campaigns and computes campaign and portfolio totals.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if a sum, profit or margin overflows.
pub fn derive_totals(invoices: &[campaign_invoice::Model]) -> Result<Totals> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<&campaign_invoice::Model>> = Vec::new();

    for inv in invoices {
        let key = (inv.company.as_str(), inv.campaign_name.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(inv);
    }

    let mut campaigns = Vec::with_capacity(groups.len());
    for members in groups {
        let Some(&first) = members.first() else {
            continue;
        };
        let (revenue, expenses) = revenue_and_expenses(members.iter().copied())?;
        campaigns.push(CampaignTotals {
            company: first.company.clone(),
            campaign_name: first.campaign_name.clone(),
            date_from: first.date_from,
            date_to: first.date_to,
            invoices: members.into_iter().cloned().collect(),
            summary: Profitability::new(revenue, expenses)?,
        });
    }

    let (revenue, expenses) = revenue_and_expenses(invoices)?;

    Ok(Totals {
        campaigns,
        portfolio: Profitability::new(revenue, expenses)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profitability::{compute_margin, round_currency};
    use crate::test_utils::*;

    #[test]
    fn test_empty_input() -> Result<()> {
        let totals = derive_totals(&[])?;
        assert!(totals.campaigns.is_empty());
        assert_eq!(totals.portfolio, Profitability::default());
        Ok(())
    }

    #[test]
    fn test_same_campaign_totals() -> Result<()> {
        let invoices = vec![
            invoice_model("Acme Corp", "Summer Sale", "10000", "7000"),
            invoice_model("Acme Corp", "Summer Sale", "5000", "6000"),
        ];
        let totals = derive_totals(&invoices)?;

        assert_eq!(totals.campaigns.len(), 1);
        let campaign = &totals.campaigns[0];
        assert_eq!(campaign.invoices.len(), 2);
        assert_eq!(campaign.summary.revenue, dec("15000"));
        assert_eq!(campaign.summary.expenses, dec("13000"));
        assert_eq!(campaign.summary.profit, dec("2000"));
        assert_eq!(campaign.summary.rounded_margin(), dec("13.33"));
        Ok(())
    }

    #[test]
    fn test_group_margin_is_not_an_average() -> Result<()> {
        // +100% on a small invoice, -100% on a large one
        let invoices = vec![
            invoice_model("Acme Corp", "Summer Sale", "1000", "0"),
            invoice_model("Acme Corp", "Summer Sale", "3000", "6000"),
        ];
        let totals = derive_totals(&invoices)?;
        let summary = totals.campaigns[0].summary;

        assert_eq!(invoices[0].margin, dec("100"));
        assert_eq!(invoices[1].margin, dec("-100"));
        assert_eq!(summary.margin, compute_margin(dec("4000"), dec("6000"))?);
        assert_eq!(summary.margin, dec("-50"));
        assert_ne!(summary.margin, Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn test_grouping_is_exact_match() -> Result<()> {
        let invoices = vec![
            invoice_model("Acme Corp", "Summer Sale", "100", "10"),
            invoice_model("Acme Corp", "Summer Sale ", "100", "10"),
            invoice_model("acme corp", "Summer Sale", "100", "10"),
            invoice_model("Globex", "Summer Sale", "100", "10"),
        ];
        let totals = derive_totals(&invoices)?;
        assert_eq!(totals.campaigns.len(), 4);
        assert_eq!(totals.campaigns_named("Summer Sale").count(), 3);
        Ok(())
    }

    #[test]
    fn test_groups_keep_first_seen_order() -> Result<()> {
        let invoices = vec![
            invoice_model("Globex", "Launch", "100", "10"),
            invoice_model("Acme Corp", "Summer Sale", "100", "10"),
            invoice_model("Globex", "Launch", "100", "10"),
        ];
        let totals = derive_totals(&invoices)?;
        let names: Vec<&str> = totals
            .campaigns
            .iter()
            .map(|c| c.campaign_name.as_str())
            .collect();
        assert_eq!(names, vec!["Launch", "Summer Sale"]);
        assert_eq!(totals.campaigns[0].invoices.len(), 2);
        Ok(())
    }

    #[test]
    fn test_portfolio_spans_all_campaigns() -> Result<()> {
        let invoices = vec![
            invoice_model("Acme Corp", "Summer Sale", "10000", "7000"),
            invoice_model("Acme Corp", "Summer Sale", "5000", "6000"),
            invoice_model("Globex", "Launch", "0", "500"),
        ];
        let totals = derive_totals(&invoices)?;

        assert_eq!(totals.portfolio.revenue, dec("15000"));
        assert_eq!(totals.portfolio.expenses, dec("13500"));
        assert_eq!(totals.portfolio.profit, dec("1500"));
        assert_eq!(totals.portfolio.rounded_margin(), dec("10"));

        let launch = &totals.campaigns[1];
        assert_eq!(launch.summary.profit, dec("-500"));
        assert_eq!(launch.summary.margin, Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn test_zero_revenue_portfolio() -> Result<()> {
        let invoices = vec![invoice_model("Globex", "Launch", "0", "0")];
        let totals = derive_totals(&invoices)?;
        assert_eq!(round_currency(totals.portfolio.margin), Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn test_overflowing_sums_are_an_error() {
        let mut first = invoice_model("Acme Corp", "Summer Sale", "100", "10");
        first.customer_received_amount_without_tax = Decimal::MAX;
        let second = first.clone();

        let result = derive_totals(&[first, second]);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }
}
