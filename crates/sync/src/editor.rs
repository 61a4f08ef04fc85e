//! Draft submission: validation plus change detection.
//!
//! The edit form's lifecycle is plain data here. Opening the form for a new
//! record is [`RecordEditor::New`]; opening it for an existing record
//! captures that record as [`RecordEditor::Existing`]. Submitting a draft
//! yields a [`SavePlan`]; cancelling is dropping the editor. There are no
//! intermediate persisted states.

use werkstatt_core::customer::{Customer, CustomerDraft};
use werkstatt_core::merge::{from_draft, merge};
use werkstatt_core::types::{RecordId, Timestamp};
use werkstatt_core::validate::{validate_draft, FieldViolation};

/// What a submitted draft should do to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePlan {
    /// Insert a new record; the store assigns the id.
    Create(Customer),
    /// Replace the record behind `id` wholesale.
    Update { id: RecordId, record: Customer },
    /// The draft changed nothing. No write is issued.
    Unchanged,
}

/// An open edit form.
#[derive(Debug, Clone)]
pub enum RecordEditor {
    /// Creating a record from scratch.
    New,
    /// Editing `original`, loaded from the live mirror.
    Existing { id: RecordId, original: Customer },
}

impl RecordEditor {
    /// Validate the draft and turn it into a [`SavePlan`].
    ///
    /// Validation failures block submission entirely; nothing reaches the
    /// store. For existing records an unchanged draft yields
    /// [`SavePlan::Unchanged`] so callers can skip the write.
    pub fn submit(
        &self,
        draft: &CustomerDraft,
        now: Timestamp,
    ) -> Result<SavePlan, Vec<FieldViolation>> {
        validate_draft(draft)?;

        Ok(match self {
            Self::New => SavePlan::Create(from_draft(draft, now)),
            Self::Existing { id, original } => match merge(original, draft, now) {
                Some(record) => SavePlan::Update {
                    id: id.clone(),
                    record,
                },
                None => SavePlan::Unchanged,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
