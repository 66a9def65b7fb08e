//! Entity module - Contains the SeaORM entity definitions for the database.
//! The ledger has a single table; campaigns are derived by grouping its rows.

pub mod campaign_invoice;

pub use campaign_invoice::{
    Column as CampaignInvoiceColumn, Entity as CampaignInvoice, Model as CampaignInvoiceModel,
};
