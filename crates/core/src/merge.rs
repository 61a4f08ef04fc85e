//! Field-level merge of an edit draft into a stored record.
//!
//! The merge stamps `last_edited` only on fields whose value actually
//! changed in this save. Untouched fields are carried over bit-identical,
//! old edit times included, so repeated saves of the same draft are
//! idempotent.

use crate::customer::{Customer, CustomerDraft, EditableField};
use crate::types::Timestamp;

/// Merge a draft into the previous record state.
///
/// Returns `None` when every field is unchanged; the caller must then skip
/// the write entirely (a no-op save never touches the store).
/// `created_at` is always carried over from `previous`.
pub fn merge(previous: &Customer, draft: &CustomerDraft, now: Timestamp) -> Option<Customer> {
    let mut changed = false;

    let merged = Customer {
        name: merge_field(&previous.name, &draft.name, now, &mut changed),
        address: merge_field(&previous.address, &draft.address, now, &mut changed),
        phone: merge_field(&previous.phone, &draft.phone, now, &mut changed),
        device: merge_field(&previous.device, &draft.device, now, &mut changed),
        error_description: merge_field(
            &previous.error_description,
            &draft.error_description,
            now,
            &mut changed,
        ),
        notes: merge_field(&previous.notes, &draft.notes, now, &mut changed),
        status: merge_field(&previous.status, &draft.status, now, &mut changed),
        error_code: merge_optional(
            previous.error_code.as_ref(),
            draft.normalized_error_code(),
            now,
            &mut changed,
        ),
        ticket_type: merge_optional(
            previous.ticket_type.as_ref(),
            draft.normalized_ticket_type(),
            now,
            &mut changed,
        ),
        created_at: previous.created_at,
    };

    changed.then_some(merged)
}

/// Build a brand-new record from a draft.
///
/// No field carries an edit time (creation is not an edit) and `created_at`
/// is stamped with `now`. The record id is left for the store to assign.
pub fn from_draft(draft: &CustomerDraft, now: Timestamp) -> Customer {
    Customer {
        name: EditableField::new(draft.name.clone()),
        address: EditableField::new(draft.address.clone()),
        phone: EditableField::new(draft.phone.clone()),
        device: EditableField::new(draft.device.clone()),
        error_description: EditableField::new(draft.error_description.clone()),
        notes: EditableField::new(draft.notes.clone()),
        status: EditableField::new(draft.status),
        error_code: draft
            .normalized_error_code()
            .map(|v| EditableField::new(v.to_string())),
        ticket_type: draft
            .normalized_ticket_type()
            .map(|v| EditableField::new(v.to_string())),
        created_at: now,
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Carry the previous field over unchanged, or replace it with the proposed
/// value stamped at `now` if the value differs.
fn merge_field<T: Clone + PartialEq>(
    previous: &EditableField<T>,
    proposed: &T,
    now: Timestamp,
    changed: &mut bool,
) -> EditableField<T> {
    if previous.value == *proposed {
        previous.clone()
    } else {
        *changed = true;
        EditableField::edited(proposed.clone(), now)
    }
}

/// Merge an optional extension field.
///
/// Clearing the input drops the stored field (and its edit time) entirely;
/// introducing or changing a value stamps `now`.
fn merge_optional(
    previous: Option<&EditableField<String>>,
    proposed: Option<&str>,
    now: Timestamp,
    changed: &mut bool,
) -> Option<EditableField<String>> {
    match (previous, proposed) {
        (None, None) => None,
        (Some(prev), Some(new)) if prev.value == new => Some(prev.clone()),
        (_, Some(new)) => {
            *changed = true;
            Some(EditableField::edited(new.to_string(), now))
        }
        (Some(_), None) => {
            *changed = true;
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
