//! Campaign invoice entity - One row of the profitability ledger.
//!
//! Each row pairs a customer invoice (money coming in) with the vendor invoice
//! (money going out) for the same campaign. The `*_with_tax`, `profit` and `margin`
//! columns are derived and are only ever written by `core::invoice::derive_record`.
//! Payment statuses are stored as their display strings (`"Clear"`, `"Pending"`, `"Partial"`).

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Campaign invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaign_invoices")]
pub struct Model {
    /// Unique identifier, assigned on insert and never changed
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Client company the campaign was run for
    pub company: String,
    /// Campaign name; together with `company` it forms the grouping key
    pub campaign_name: String,
    /// First day of the campaign
    pub date_from: Date,
    /// Last day of the campaign
    pub date_to: Date,

    /// Invoice number issued to the customer
    pub customer_invoice_number: String,
    /// Billed amount before tax
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub customer_amount_without_tax: Decimal,
    /// Billed amount including tax (derived)
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub customer_amount_with_tax: Decimal,
    /// Amount actually received before tax
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub customer_received_amount_without_tax: Decimal,
    /// Amount actually received including tax (derived)
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub customer_received_amount_with_tax: Decimal,
    /// `"Clear"`, `"Pending"` or `"Partial"`
    pub customer_payment_status: String,
    /// When the customer paid, if known
    pub customer_payment_date: Option<Date>,
    /// Free-text notes on the customer side
    pub customer_remarks: Option<String>,

    /// Vendor that delivered the campaign
    pub vendor_name: Option<String>,
    /// Invoice number received from the vendor
    pub vendor_invoice_number: Option<String>,
    /// Vendor billed amount before tax
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_amount_without_tax: Decimal,
    /// Vendor billed amount including tax (derived)
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub vendor_amount_with_tax: Decimal,
    /// Amount actually paid to the vendor before tax
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub vendor_paid_amount_without_tax: Decimal,
    /// Amount actually paid to the vendor including tax (derived)
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub vendor_paid_amount_with_tax: Decimal,
    /// `"Clear"`, `"Pending"` or `"Partial"`
    pub vendor_payment_status: String,
    /// When the vendor was paid, if known
    pub vendor_payment_date: Option<Date>,
    /// Free-text notes on the vendor side
    pub vendor_remarks: Option<String>,

    /// Received minus paid, both before tax (derived)
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub profit: Decimal,
    /// Profit as a percentage of received revenue (derived). A few cents of revenue against
    /// the largest expense gives a margin of eighteen integer digits.
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub margin: Decimal,

    /// When the row was inserted
    pub created_at: DateTimeUtc,
    /// When the row was last written
    pub updated_at: DateTimeUtc,
}

/// Campaign invoices stand alone; campaigns are not a stored entity
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::ColumnType;

    fn column_type(column: Column) -> ColumnType {
        column.def().get_column_type().clone()
    }

    #[test]
    fn test_derived_columns_hold_extreme_values() {
        // 99,999,999,999,999.99 * 1.18 needs 15 integer digits
        assert_eq!(
            column_type(Column::CustomerAmountWithTax),
            ColumnType::Decimal(Some((18, 2)))
        );
        assert_eq!(
            column_type(Column::VendorPaidAmountWithTax),
            ColumnType::Decimal(Some((18, 2)))
        );
        // 0.01 revenue against 99,999,999,999,999.99 expenses is -999,999,999,999,999,800%
        assert_eq!(column_type(Column::Margin), ColumnType::Decimal(Some((20, 2))));
    }
}
