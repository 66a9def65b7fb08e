//! Invoice editor state machine.
//!
//! The editor holds at most one draft. States and transitions:
//!
//! ```text
//! Viewing --begin_new/begin_edit--> Editing --submit--> Submitting --finish--> Viewing
//!                                     |  ^                  |
//!                                     |  +------fail--------+
//!                                     +--cancel--> Viewing
//! ```
//!
//! Drafts are only validated on `submit`; `set_field` only checks that a single value parses.

use crate::{
    core::invoice::{InvoiceField, InvoiceInput},
    entities::campaign_invoice,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use uuid::Uuid;

/// Whether a draft creates a new invoice or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    /// Not yet stored; the id is assigned on insert
    New,
    /// Editing the stored invoice with this id
    Existing(Uuid),
}

/// An invoice being created or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// What saving the draft will do
    pub target: DraftTarget,
    /// The authored fields so far
    pub input: InvoiceInput,
}

/// Current state of an editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No draft open
    #[default]
    Viewing,
    /// A draft is open for changes
    Editing(Draft),
    /// A draft has been handed off to be written
    Submitting(Draft),
}

impl EditorState {
    /// Short name used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Viewing => "viewing",
            Self::Editing(_) => "editing",
            Self::Submitting(_) => "submitting",
        }
    }
}

/// Owns an [`EditorState`] and enforces the allowed transitions.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: EditorState,
}

impl Editor {
    /// A new editor in the `Viewing` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// The open draft, if editing or submitting.
    #[must_use]
    pub const fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditorState::Viewing => None,
            EditorState::Editing(draft) | EditorState::Submitting(draft) => Some(draft),
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Opens a blank draft for a new invoice.
    pub fn begin_new(&mut self, today: NaiveDate) -> Result<&Draft> {
        self.begin(Draft {
            target: DraftTarget::New,
            input: InvoiceInput::blank(today),
        })
    }

    /// Opens a draft of a stored invoice.
    pub fn begin_edit(&mut self, invoice: &campaign_invoice::Model) -> Result<&Draft> {
        self.begin(Draft {
            target: DraftTarget::Existing(invoice.id),
            input: InvoiceInput::from(invoice),
        })
    }

    fn begin(&mut self, draft: Draft) -> Result<&Draft> {
        if self.state != EditorState::Viewing {
            return Err(self.invalid("start a new draft"));
        }
        self.state = EditorState::Editing(draft);
        self.draft().ok_or_else(|| self.invalid("start a new draft"))
    }

    /// Parses and stores one field of the open draft.
    ///
    /// A value that fails to parse leaves the draft unchanged.
    pub fn set_field(&mut self, field: InvoiceField, raw: &str) -> Result<()> {
        if let EditorState::Editing(draft) = &mut self.state {
            return draft.input.set_field(field, raw);
        }
        Err(self.invalid("change a field"))
    }

    /// Validates the draft and moves it to `Submitting`, returning it for the write.
    ///
    /// A draft that fails validation stays in `Editing`.
    pub fn submit(&mut self) -> Result<Draft> {
        let EditorState::Editing(draft) = &self.state else {
            return Err(self.invalid("submit"));
        };
        draft.input.validate()?;

        let draft = draft.clone();
        self.state = EditorState::Submitting(draft.clone());
        Ok(draft)
    }

    /// Closes the draft after a successful write.
    pub fn finish(&mut self) -> Result<()> {
        if !matches!(self.state, EditorState::Submitting(_)) {
            return Err(self.invalid("finish"));
        }
        self.state = EditorState::Viewing;
        Ok(())
    }

    /// Returns a draft whose write failed to `Editing`, unchanged.
    pub fn fail(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            EditorState::Submitting(draft) => {
                self.state = EditorState::Editing(draft);
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("recover from a failed save"))
            }
        }
    }

    /// Discards the open draft.
    pub fn cancel(&mut self) -> Result<()> {
        if !matches!(self.state, EditorState::Editing(_)) {
            return Err(self.invalid("cancel"));
        }
        self.state = EditorState::Viewing;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::invoice::derive_record;
    use crate::core::profitability::DEFAULT_TAX_RATE;
    use crate::test_utils::*;

    fn filled_editor() -> Editor {
        let mut editor = Editor::new();
        editor.begin_new(date(2024, 1, 1)).unwrap();
        editor.set_field(InvoiceField::Company, "Acme Corp").unwrap();
        editor.set_field(InvoiceField::CampaignName, "Summer Sale").unwrap();
        editor.set_field(InvoiceField::CustomerInvoiceNumber, "INV-9").unwrap();
        editor.set_field(InvoiceField::CustomerReceivedAmount, "500").unwrap();
        editor
    }

    #[test]
    fn test_starts_viewing() {
        let editor = Editor::new();
        assert_eq!(editor.state(), &EditorState::Viewing);
        assert!(editor.draft().is_none());
    }

    #[test]
    fn test_begin_new_uses_defaults() {
        let mut editor = Editor::new();
        let draft = editor.begin_new(date(2024, 5, 1)).unwrap();
        assert_eq!(draft.target, DraftTarget::New);
        assert_eq!(draft.input, InvoiceInput::blank(date(2024, 5, 1)));
        assert_eq!(editor.state().name(), "editing");
    }

    #[test]
    fn test_begin_edit_copies_stored_invoice() {
        let model = invoice_model("Acme Corp", "Summer Sale", "10000", "7000");
        let mut editor = Editor::new();
        let draft = editor.begin_edit(&model).unwrap();
        assert_eq!(draft.target, DraftTarget::Existing(model.id));
        assert_eq!(draft.input, InvoiceInput::from(&model));
    }

    #[test]
    fn test_only_one_draft_at_a_time() {
        let mut editor = filled_editor();
        let result = editor.begin_new(date(2024, 1, 1));
        assert!(matches!(
            result,
            Err(Error::InvalidTransition { state: "editing", .. })
        ));
    }

    #[test]
    fn test_set_field_requires_draft() {
        let mut editor = Editor::new();
        let result = editor.set_field(InvoiceField::Company, "Acme");
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[test]
    fn test_submit_finish_cycle() {
        let mut editor = filled_editor();
        let draft = editor.submit().unwrap();
        assert!(matches!(editor.state(), EditorState::Submitting(_)));
        assert!(editor.set_field(InvoiceField::Company, "Other").is_err());

        let derived = derive_record(&draft.input, DEFAULT_TAX_RATE).unwrap();
        assert_eq!(derived.customer_received_amount_with_tax, dec("590"));

        editor.finish().unwrap();
        assert_eq!(editor.state(), &EditorState::Viewing);
    }

    #[test]
    fn test_invalid_draft_stays_editing() {
        let mut editor = Editor::new();
        editor.begin_new(date(2024, 1, 1)).unwrap();
        assert!(matches!(editor.submit(), Err(Error::Validation { .. })));
        assert_eq!(editor.state().name(), "editing");
    }

    #[test]
    fn test_fail_keeps_draft() {
        let mut editor = filled_editor();
        let submitted = editor.submit().unwrap();
        editor.fail().unwrap();
        assert_eq!(editor.state(), &EditorState::Editing(submitted));
    }

    #[test]
    fn test_fail_outside_submitting_keeps_state() {
        let mut editor = filled_editor();
        let before = editor.state().clone();
        assert!(editor.fail().is_err());
        assert_eq!(editor.state(), &before);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut editor = filled_editor();
        editor.cancel().unwrap();
        assert!(editor.draft().is_none());
        assert!(editor.cancel().is_err());
    }

    #[test]
    fn test_cannot_cancel_while_submitting() {
        let mut editor = filled_editor();
        editor.submit().unwrap();
        assert!(editor.cancel().is_err());
        assert!(editor.finish().is_ok());
    }

    #[test]
    fn test_bad_value_leaves_draft_untouched() {
        let mut editor = filled_editor();
        let before = editor.draft().cloned();
        assert!(editor
            .set_field(InvoiceField::VendorAmount, "lots")
            .is_err());
        assert_eq!(editor.draft().cloned(), before);
    }

    #[test]
    fn test_oversized_amount_never_reaches_submitting() {
        let mut editor = filled_editor();
        let result = editor.set_field(
            InvoiceField::CustomerAmount,
            "79228162514264337593543950335",
        );
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        // A stored row outside the column range is caught on submit
        let mut model = invoice_model("Acme Corp", "Summer Sale", "10000", "7000");
        model.vendor_amount_without_tax = rust_decimal::Decimal::MAX;
        let mut editor = Editor::new();
        editor.begin_edit(&model).unwrap();
        assert!(matches!(editor.submit(), Err(Error::InvalidAmount { .. })));
        assert_eq!(editor.state().name(), "editing");
        assert!(editor.cancel().is_ok());
    }
}
