//! Core business logic - framework-agnostic calculation, storage and editing of campaign invoices.

/// Draft editing state machine
pub mod editor;
/// Invoice input, derivation and storage
pub mod invoice;
/// Tax gross-up, profit and margin calculation
pub mod profitability;
/// Dashboard loading and display formatting
pub mod report;
/// Campaign and portfolio aggregation
pub mod totals;
