//! Profitability calculator.
//!
//! Pure, synchronous functions that turn tax-exclusive amounts into tax-inclusive ones
//! and received/paid totals into profit and margin. Everything works on [`Decimal`],
//! so rounding happens exactly once, at two decimal places, half away from zero.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Goods and services tax applied to every invoice amount (18%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Decimal places kept on currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest base amount the `Decimal(16, 2)` columns hold: 99,999,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a currency amount to [`CURRENCY_SCALE`] places, midpoint away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the tax-inclusive amount for a tax-exclusive base.
///
/// Returns `round(base_amount * (1 + tax_rate), 2)`.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if either the base amount or the rate is negative,
/// or if the product does not fit in a [`Decimal`].
pub fn gross_up(base_amount: Decimal, tax_rate: Decimal) -> Result<Decimal> {
    if base_amount.is_sign_negative() && !base_amount.is_zero() {
        return Err(Error::invalid_amount(base_amount));
    }
    if tax_rate.is_sign_negative() && !tax_rate.is_zero() {
        return Err(Error::invalid_amount(tax_rate));
    }

    let multiplier = Decimal::ONE
        .checked_add(tax_rate)
        .ok_or_else(|| Error::invalid_amount(tax_rate))?;
    let taxed = base_amount
        .checked_mul(multiplier)
        .ok_or_else(|| Error::invalid_amount(base_amount))?;

    Ok(round_currency(taxed))
}

/// Profit on a pair of tax-exclusive totals. Negative when expenses exceed revenue.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if the difference does not fit in a [`Decimal`].
pub fn compute_profit(
    received_without_tax: Decimal,
    paid_without_tax: Decimal,
) -> Result<Decimal> {
    received_without_tax
        .checked_sub(paid_without_tax)
        .ok_or_else(|| Error::invalid_amount(paid_without_tax))
}

/// Profit as a percentage of received revenue.
///
/// A zero revenue yields a margin of zero rather than an error. The result is not rounded;
/// callers that persist or display it round it themselves.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if the ratio does not fit in a [`Decimal`].
pub fn compute_margin(
    received_without_tax: Decimal,
    paid_without_tax: Decimal,
) -> Result<Decimal> {
    if received_without_tax.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let profit = compute_profit(received_without_tax, paid_without_tax)?;
    profit
        .checked_div(received_without_tax)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or_else(|| Error::invalid_amount(profit))
}

/// Revenue, expenses and the metrics derived from them, for one record,
/// one campaign or the whole portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Profitability {
    /// Sum of received amounts before tax
    pub revenue: Decimal,
    /// Sum of paid amounts before tax
    pub expenses: Decimal,
    /// `revenue - expenses`
    pub profit: Decimal,
    /// `profit / revenue * 100`, or zero without revenue
    pub margin: Decimal,
}

impl Profitability {
    /// Derives profit and margin from revenue and expense totals.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] if profit or margin overflow.
    pub fn new(revenue: Decimal, expenses: Decimal) -> Result<Self> {
        Ok(Self {
            revenue,
            expenses,
            profit: compute_profit(revenue, expenses)?,
            margin: compute_margin(revenue, expenses)?,
        })
    }

    /// Margin rounded to two places for persistence and display.
    #[must_use]
    pub fn rounded_margin(&self) -> Decimal {
        round_currency(self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    #[test]
    fn test_default_tax_rate_is_eighteen_percent() {
        assert_eq!(DEFAULT_TAX_RATE, dec("0.18"));
    }

    #[test]
    fn test_gross_up_zero() -> Result<()> {
        assert_eq!(gross_up(Decimal::ZERO, DEFAULT_TAX_RATE)?, Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn test_gross_up_hundred() -> Result<()> {
        assert_eq!(gross_up(dec("100"), DEFAULT_TAX_RATE)?, dec("118.00"));
        Ok(())
    }

    #[test]
    fn test_gross_up_rounds_half_up() -> Result<()> {
        // 100.005 * 1.18 = 118.0059
        assert_eq!(gross_up(dec("100.005"), DEFAULT_TAX_RATE)?, dec("118.01"));
        // 0.125 * 1 = 0.125 sits exactly on the midpoint
        assert_eq!(gross_up(dec("0.125"), Decimal::ZERO)?, dec("0.13"));
        Ok(())
    }

    #[test]
    fn test_gross_up_has_two_decimal_places() -> Result<()> {
        let taxed = gross_up(dec("1234.567"), DEFAULT_TAX_RATE)?;
        assert_eq!(taxed, dec("1456.79"));
        assert!(taxed.scale() <= CURRENCY_SCALE);
        Ok(())
    }

    #[test]
    fn test_gross_up_custom_rate() -> Result<()> {
        assert_eq!(gross_up(dec("200"), dec("0.05"))?, dec("210"));
        Ok(())
    }

    #[test]
    fn test_gross_up_rejects_negative_base() {
        let result = gross_up(dec("-1"), DEFAULT_TAX_RATE);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_gross_up_rejects_negative_rate() {
        let result = gross_up(dec("10"), dec("-0.18"));
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_gross_up_overflow_is_an_error() {
        let result = gross_up(Decimal::MAX, DEFAULT_TAX_RATE);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_gross_up_largest_column_amount() -> Result<()> {
        assert_eq!(MAX_AMOUNT, dec("99999999999999.99"));
        assert_eq!(
            gross_up(MAX_AMOUNT, DEFAULT_TAX_RATE)?,
            dec("117999999999999.99")
        );
        Ok(())
    }

    #[test]
    fn test_compute_profit() -> Result<()> {
        assert_eq!(compute_profit(dec("100"), dec("60"))?, dec("40"));
        assert_eq!(compute_profit(dec("60"), dec("100"))?, dec("-40"));
        Ok(())
    }

    #[test]
    fn test_compute_profit_overflow_is_an_error() {
        let result = compute_profit(Decimal::MIN, Decimal::MAX);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_compute_margin_zero_revenue() -> Result<()> {
        for paid in ["0", "1", "999999.99"] {
            assert_eq!(compute_margin(Decimal::ZERO, dec(paid))?, Decimal::ZERO);
        }
        Ok(())
    }

    #[test]
    fn test_compute_margin() -> Result<()> {
        assert_eq!(compute_margin(dec("100"), dec("60"))?, dec("40"));
        Ok(())
    }

    #[test]
    fn test_compute_margin_loss_is_negative() -> Result<()> {
        assert_eq!(compute_margin(dec("100"), dec("150"))?, dec("-50"));
        Ok(())
    }

    #[test]
    fn test_compute_margin_tiny_revenue_huge_expense() -> Result<()> {
        let margin = compute_margin(dec("0.01"), MAX_AMOUNT)?;
        assert_eq!(margin, dec("-999999999999999800"));
        Ok(())
    }

    #[test]
    fn test_compute_margin_overflow_is_an_error() {
        let result = compute_margin(dec("0.01"), Decimal::MAX);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_profitability_new() -> Result<()> {
        let summary = Profitability::new(dec("15000"), dec("13000"))?;
        assert_eq!(summary.profit, dec("2000"));
        assert_eq!(summary.rounded_margin(), dec("13.33"));
        Ok(())
    }

    #[test]
    fn test_profitability_default_is_zero() -> Result<()> {
        let summary = Profitability::default();
        assert_eq!(summary, Profitability::new(Decimal::ZERO, Decimal::ZERO)?);
        Ok(())
    }
}
