//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Campaign dashboard commands
pub mod campaign;

/// General utility commands
pub mod general;

/// Invoice listing and editing commands
pub mod invoice;

// Export commands
pub use campaign::*;
pub use general::*;
pub use invoice::*;
