//! Invoice business logic - authored input, derivation and storage of campaign invoices.
//!
//! [`derive_record`] is the one place where tax-inclusive amounts, profit and margin are
//! computed. Every create and update goes through it, so the stored derived columns always
//! agree with the stored `*_without_tax` sources. The database never computes them.

use crate::{
    core::profitability::{CURRENCY_SCALE, MAX_AMOUNT, Profitability, gross_up},
    entities::{CampaignInvoice, campaign_invoice},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::{fmt, str::FromStr};
use tracing::{debug, info, instrument, warn};

/// Settlement state of one side of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    /// Paid in full
    Clear,
    /// Nothing paid yet
    #[default]
    Pending,
    /// Partly paid
    Partial,
}

impl PaymentStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Clear, Self::Pending, Self::Partial];

    /// The stored and displayed name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Pending => "Pending",
            Self::Partial => "Partial",
        }
    }

    /// Reads a status column, treating anything unrecognised as `Pending`.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unrecognised payment status {value:?} in database, treating as Pending");
            Self::Pending
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            other => Err(Error::validation(format!(
                "Payment status must be Clear, Pending or Partial, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-authored fields of an invoice. Derived columns are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceInput {
    /// Client company
    pub company: String,
    /// Campaign name
    pub campaign_name: String,
    /// Campaign start
    pub date_from: NaiveDate,
    /// Campaign end
    pub date_to: NaiveDate,
    /// Customer invoice number
    pub customer_invoice_number: String,
    /// Customer billed amount before tax
    pub customer_amount_without_tax: Decimal,
    /// Customer received amount before tax
    pub customer_received_amount_without_tax: Decimal,
    /// Customer settlement state
    pub customer_payment_status: PaymentStatus,
    /// Customer payment date
    pub customer_payment_date: Option<NaiveDate>,
    /// Customer notes
    pub customer_remarks: Option<String>,
    /// Vendor name
    pub vendor_name: Option<String>,
    /// Vendor invoice number
    pub vendor_invoice_number: Option<String>,
    /// Vendor billed amount before tax
    pub vendor_amount_without_tax: Decimal,
    /// Vendor paid amount before tax
    pub vendor_paid_amount_without_tax: Decimal,
    /// Vendor settlement state
    pub vendor_payment_status: PaymentStatus,
    /// Vendor payment date
    pub vendor_payment_date: Option<NaiveDate>,
    /// Vendor notes
    pub vendor_remarks: Option<String>,
}

impl InvoiceInput {
    /// A blank invoice: empty text, zero amounts, both sides `Pending`,
    /// and a campaign running on `today` only.
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            company: String::new(),
            campaign_name: String::new(),
            date_from: today,
            date_to: today,
            customer_invoice_number: String::new(),
            customer_amount_without_tax: Decimal::ZERO,
            customer_received_amount_without_tax: Decimal::ZERO,
            customer_payment_status: PaymentStatus::Pending,
            customer_payment_date: None,
            customer_remarks: None,
            vendor_name: None,
            vendor_invoice_number: None,
            vendor_amount_without_tax: Decimal::ZERO,
            vendor_paid_amount_without_tax: Decimal::ZERO,
            vendor_payment_status: PaymentStatus::Pending,
            vendor_payment_date: None,
            vendor_remarks: None,
        }
    }

    fn amounts(&self) -> [(&'static str, Decimal); 4] {
        [
            (
                InvoiceField::CustomerAmount.as_str(),
                self.customer_amount_without_tax,
            ),
            (
                InvoiceField::CustomerReceivedAmount.as_str(),
                self.customer_received_amount_without_tax,
            ),
            (
                InvoiceField::VendorAmount.as_str(),
                self.vendor_amount_without_tax,
            ),
            (
                InvoiceField::VendorPaidAmount.as_str(),
                self.vendor_paid_amount_without_tax,
            ),
        ]
    }

    /// Checks required fields, the date range and every base amount.
    ///
    /// Amounts must lie between zero and [`MAX_AMOUNT`] and carry at most two decimal places,
    /// so that the stored value is exactly the one the derived columns were computed from.
    ///
    /// # Errors
    /// [`Error::Validation`] for missing text or an inverted date range,
    /// [`Error::InvalidAmount`] for a negative, oversized or over-precise amount.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("Company", &self.company),
            ("Campaign name", &self.campaign_name),
            ("Customer invoice number", &self.customer_invoice_number),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{label} is required")));
            }
        }

        if self.date_to < self.date_from {
            return Err(Error::validation(format!(
                "Campaign ends ({}) before it starts ({})",
                self.date_to, self.date_from
            )));
        }

        for (field, amount) in self.amounts() {
            if !amount_in_range(amount) {
                debug!("Rejecting out-of-range {field}: {amount}");
                return Err(Error::invalid_amount(amount));
            }
            if amount.normalize().scale() > CURRENCY_SCALE {
                debug!("Rejecting {field} with more than {CURRENCY_SCALE} decimals: {amount}");
                return Err(Error::invalid_amount(amount));
            }
        }

        Ok(())
    }

    /// Parses `raw` for `field` and stores it.
    ///
    /// Amounts must parse as non-negative decimals (thousands separators are allowed);
    /// a parse failure is an error, never a silent zero. Dates use `YYYY-MM-DD`.
    /// An empty value clears optional fields.
    ///
    /// # Errors
    /// [`Error::InvalidAmount`] for bad amounts, [`Error::Validation`] for bad dates or statuses.
    pub fn set_field(&mut self, field: InvoiceField, raw: &str) -> Result<()> {
        match field {
            InvoiceField::Company => self.company = raw.to_string(),
            InvoiceField::CampaignName => self.campaign_name = raw.to_string(),
            InvoiceField::DateFrom => self.date_from = parse_date(raw)?,
            InvoiceField::DateTo => self.date_to = parse_date(raw)?,
            InvoiceField::CustomerInvoiceNumber => self.customer_invoice_number = raw.to_string(),
            InvoiceField::CustomerAmount => self.customer_amount_without_tax = parse_amount(raw)?,
            InvoiceField::CustomerReceivedAmount => {
                self.customer_received_amount_without_tax = parse_amount(raw)?;
            }
            InvoiceField::CustomerPaymentStatus => self.customer_payment_status = raw.parse()?,
            InvoiceField::CustomerPaymentDate => self.customer_payment_date = parse_optional_date(raw)?,
            InvoiceField::CustomerRemarks => self.customer_remarks = optional_text(raw),
            InvoiceField::VendorName => self.vendor_name = optional_text(raw),
            InvoiceField::VendorInvoiceNumber => self.vendor_invoice_number = optional_text(raw),
            InvoiceField::VendorAmount => self.vendor_amount_without_tax = parse_amount(raw)?,
            InvoiceField::VendorPaidAmount => self.vendor_paid_amount_without_tax = parse_amount(raw)?,
            InvoiceField::VendorPaymentStatus => self.vendor_payment_status = raw.parse()?,
            InvoiceField::VendorPaymentDate => self.vendor_payment_date = parse_optional_date(raw)?,
            InvoiceField::VendorRemarks => self.vendor_remarks = optional_text(raw),
        }
        Ok(())
    }
}

impl From<&campaign_invoice::Model> for InvoiceInput {
    fn from(model: &campaign_invoice::Model) -> Self {
        Self {
            company: model.company.clone(),
            campaign_name: model.campaign_name.clone(),
            date_from: model.date_from,
            date_to: model.date_to,
            customer_invoice_number: model.customer_invoice_number.clone(),
            customer_amount_without_tax: model.customer_amount_without_tax,
            customer_received_amount_without_tax: model.customer_received_amount_without_tax,
            customer_payment_status: PaymentStatus::from_stored(&model.customer_payment_status),
            customer_payment_date: model.customer_payment_date,
            customer_remarks: model.customer_remarks.clone(),
            vendor_name: model.vendor_name.clone(),
            vendor_invoice_number: model.vendor_invoice_number.clone(),
            vendor_amount_without_tax: model.vendor_amount_without_tax,
            vendor_paid_amount_without_tax: model.vendor_paid_amount_without_tax,
            vendor_payment_status: PaymentStatus::from_stored(&model.vendor_payment_status),
            vendor_payment_date: model.vendor_payment_date,
            vendor_remarks: model.vendor_remarks.clone(),
        }
    }
}

fn amount_in_range(amount: Decimal) -> bool {
    !(amount.is_sign_negative() && !amount.is_zero()) && amount <= MAX_AMOUNT
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let amount = Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount {
        amount: raw.to_string(),
    })?;
    if !amount_in_range(amount) {
        return Err(Error::InvalidAmount {
            amount: raw.to_string(),
        });
    }
    Ok(amount)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| Error::validation(format!("Invalid date '{raw}' (expected YYYY-MM-DD): {e}")))
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw).map(Some)
}

fn optional_text(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// The editable fields of an invoice, named after their columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum InvoiceField {
    Company,
    CampaignName,
    DateFrom,
    DateTo,
    CustomerInvoiceNumber,
    CustomerAmount,
    CustomerReceivedAmount,
    CustomerPaymentStatus,
    CustomerPaymentDate,
    CustomerRemarks,
    VendorName,
    VendorInvoiceNumber,
    VendorAmount,
    VendorPaidAmount,
    VendorPaymentStatus,
    VendorPaymentDate,
    VendorRemarks,
}

impl InvoiceField {
    /// Every editable field, in form order.
    pub const ALL: [Self; 17] = [
        Self::Company,
        Self::CampaignName,
        Self::DateFrom,
        Self::DateTo,
        Self::CustomerInvoiceNumber,
        Self::CustomerAmount,
        Self::CustomerReceivedAmount,
        Self::CustomerPaymentStatus,
        Self::CustomerPaymentDate,
        Self::CustomerRemarks,
        Self::VendorName,
        Self::VendorInvoiceNumber,
        Self::VendorAmount,
        Self::VendorPaidAmount,
        Self::VendorPaymentStatus,
        Self::VendorPaymentDate,
        Self::VendorRemarks,
    ];

    /// Column name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::CampaignName => "campaign_name",
            Self::DateFrom => "date_from",
            Self::DateTo => "date_to",
            Self::CustomerInvoiceNumber => "customer_invoice_number",
            Self::CustomerAmount => "customer_amount_without_tax",
            Self::CustomerReceivedAmount => "customer_received_amount_without_tax",
            Self::CustomerPaymentStatus => "customer_payment_status",
            Self::CustomerPaymentDate => "customer_payment_date",
            Self::CustomerRemarks => "customer_remarks",
            Self::VendorName => "vendor_name",
            Self::VendorInvoiceNumber => "vendor_invoice_number",
            Self::VendorAmount => "vendor_amount_without_tax",
            Self::VendorPaidAmount => "vendor_paid_amount_without_tax",
            Self::VendorPaymentStatus => "vendor_payment_status",
            Self::VendorPaymentDate => "vendor_payment_date",
            Self::VendorRemarks => "vendor_remarks",
        }
    }
}

impl FromStr for InvoiceField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| Error::validation(format!("Unknown or derived field '{wanted}'")))
    }
}

impl fmt::Display for InvoiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An invoice input together with every column derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedInvoice {
    /// The authored fields the rest was computed from
    pub input: InvoiceInput,
    /// `gross_up(customer_amount_without_tax)`
    pub customer_amount_with_tax: Decimal,
    /// `gross_up(customer_received_amount_without_tax)`
    pub customer_received_amount_with_tax: Decimal,
    /// `gross_up(vendor_amount_without_tax)`
    pub vendor_amount_with_tax: Decimal,
    /// `gross_up(vendor_paid_amount_without_tax)`
    pub vendor_paid_amount_with_tax: Decimal,
    /// Received minus paid, before tax
    pub profit: Decimal,
    /// Margin percentage rounded to two places
    pub margin: Decimal,
}

impl DerivedInvoice {
    /// Writes every authored and derived column onto `model`, leaving id and timestamps alone.
    pub fn apply_to(self, model: &mut campaign_invoice::ActiveModel) {
        let input = self.input;
        model.company = Set(input.company);
        model.campaign_name = Set(input.campaign_name);
        model.date_from = Set(input.date_from);
        model.date_to = Set(input.date_to);
        model.customer_invoice_number = Set(input.customer_invoice_number);
        model.customer_amount_without_tax = Set(input.customer_amount_without_tax);
        model.customer_amount_with_tax = Set(self.customer_amount_with_tax);
        model.customer_received_amount_without_tax =
            Set(input.customer_received_amount_without_tax);
        model.customer_received_amount_with_tax = Set(self.customer_received_amount_with_tax);
        model.customer_payment_status = Set(input.customer_payment_status.as_str().to_string());
        model.customer_payment_date = Set(input.customer_payment_date);
        model.customer_remarks = Set(input.customer_remarks);
        model.vendor_name = Set(input.vendor_name);
        model.vendor_invoice_number = Set(input.vendor_invoice_number);
        model.vendor_amount_without_tax = Set(input.vendor_amount_without_tax);
        model.vendor_amount_with_tax = Set(self.vendor_amount_with_tax);
        model.vendor_paid_amount_without_tax = Set(input.vendor_paid_amount_without_tax);
        model.vendor_paid_amount_with_tax = Set(self.vendor_paid_amount_with_tax);
        model.vendor_payment_status = Set(input.vendor_payment_status.as_str().to_string());
        model.vendor_payment_date = Set(input.vendor_payment_date);
        model.vendor_remarks = Set(input.vendor_remarks);
        model.profit = Set(self.profit);
        model.margin = Set(self.margin);
    }
}

/// Validates an invoice and computes its tax-inclusive amounts, profit and margin.
///
/// Each `*_with_tax` value is recomputed from its `*_without_tax` source, so deriving an
/// input recovered from a stored record reproduces the stored derived values.
///
/// # Errors
/// Returns the validation error of [`InvoiceInput::validate`], or
/// [`Error::InvalidAmount`] for a negative tax rate.
pub fn derive_record(input: &InvoiceInput, tax_rate: Decimal) -> Result<DerivedInvoice> {
    input.validate()?;

    let summary = Profitability::new(
        input.customer_received_amount_without_tax,
        input.vendor_paid_amount_without_tax,
    )?;

    Ok(DerivedInvoice {
        customer_amount_with_tax: gross_up(input.customer_amount_without_tax, tax_rate)?,
        customer_received_amount_with_tax: gross_up(
            input.customer_received_amount_without_tax,
            tax_rate,
        )?,
        vendor_amount_with_tax: gross_up(input.vendor_amount_without_tax, tax_rate)?,
        vendor_paid_amount_with_tax: gross_up(input.vendor_paid_amount_without_tax, tax_rate)?,
        profit: summary.profit,
        margin: summary.rounded_margin(),
        input: input.clone(),
    })
}

/// Retrieves every invoice, newest first.
pub async fn list_invoices(db: &DatabaseConnection) -> Result<Vec<campaign_invoice::Model>> {
    CampaignInvoice::find()
        .order_by_desc(campaign_invoice::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an invoice by id, returning None if it does not exist.
pub async fn get_invoice_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<campaign_invoice::Model>> {
    CampaignInvoice::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an invoice by its full id or by a unique prefix of its hex id,
/// as shown in listings.
///
/// # Errors
/// [`Error::Validation`] if the prefix is empty or matches more than one invoice.
pub async fn find_invoice_by_reference(
    db: &DatabaseConnection,
    reference: &str,
) -> Result<Option<campaign_invoice::Model>> {
    let reference = reference.trim();
    if let Ok(id) = Uuid::parse_str(reference) {
        return get_invoice_by_id(db, id).await;
    }

    let prefix = reference.to_ascii_lowercase().replace('-', "");
    if prefix.is_empty() {
        return Err(Error::validation("Invoice id is required"));
    }

    let mut matches: Vec<campaign_invoice::Model> = list_invoices(db)
        .await?
        .into_iter()
        .filter(|inv| inv.id.simple().to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 | 1 => Ok(matches.pop()),
        n => Err(Error::validation(format!(
            "Id '{reference}' matches {n} invoices, use more characters"
        ))),
    }
}

/// Distinct campaign names, alphabetically, for autocomplete.
pub async fn list_campaign_names(db: &DatabaseConnection) -> Result<Vec<String>> {
    CampaignInvoice::find()
        .select_only()
        .column(campaign_invoice::Column::CampaignName)
        .distinct()
        .order_by_asc(campaign_invoice::Column::CampaignName)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Derives and inserts a new invoice with a fresh id.
///
/// Validation happens before the database is touched.
#[instrument(skip(db, input), fields(company = %input.company, campaign = %input.campaign_name))]
pub async fn create_invoice(
    db: &DatabaseConnection,
    input: &InvoiceInput,
    tax_rate: Decimal,
) -> Result<campaign_invoice::Model> {
    let derived = derive_record(input, tax_rate)?;

    let now = Utc::now();
    let mut invoice = campaign_invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    derived.apply_to(&mut invoice);

    let result = invoice.insert(db).await?;
    info!(id = %result.id, profit = %result.profit, "Invoice created");
    Ok(result)
}

/// Re-derives and overwrites an existing invoice. The id and `created_at` are kept.
///
/// # Errors
/// [`Error::InvoiceNotFound`] if no invoice has this id, or any validation error.
#[instrument(skip(db, input))]
pub async fn update_invoice(
    db: &DatabaseConnection,
    id: Uuid,
    input: &InvoiceInput,
    tax_rate: Decimal,
) -> Result<campaign_invoice::Model> {
    let derived = derive_record(input, tax_rate)?;

    let existing = CampaignInvoice::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::InvoiceNotFound { id })?;

    let mut invoice: campaign_invoice::ActiveModel = existing.into();
    derived.apply_to(&mut invoice);
    invoice.updated_at = Set(Utc::now());

    let result = invoice.update(db).await?;
    info!(id = %result.id, profit = %result.profit, "Invoice updated");
    Ok(result)
}

/// Permanently deletes an invoice.
///
/// # Errors
/// [`Error::InvoiceNotFound`] if nothing was deleted.
#[instrument(skip(db))]
pub async fn delete_invoice(db: &DatabaseConnection, id: Uuid) -> Result<()> {
    let result = CampaignInvoice::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::InvoiceNotFound { id });
    }
    info!(%id, "Invoice deleted");
    Ok(())
}
