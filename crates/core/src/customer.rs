//! The customer record model: editable fields, ticket status, and wire
//! shapes.
//!
//! Records are stored in the remote store as JSON objects keyed by id; the
//! id is never part of the stored value. Edit times live next to the values
//! themselves ([`EditableField`]) so the dashboard can show when each field
//! last changed without a separate audit log.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// EditableField
// ---------------------------------------------------------------------------

/// A value plus the time it was last edited.
///
/// `last_edited` stays `None` until the field's value is changed by a save;
/// creating a record does not count as an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableField<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<Timestamp>,
}

impl<T> EditableField<T> {
    /// A field that has never been edited.
    pub fn new(value: T) -> Self {
        Self {
            value,
            last_edited: None,
        }
    }

    /// A field stamped with an edit time.
    pub fn edited(value: T, at: Timestamp) -> Self {
        Self {
            value,
            last_edited: Some(at),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Repair ticket status.
///
/// Serialized in kebab-case (`"in-progress"`, `"ready-for-pickup"`, ...) to
/// match the stored record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    InProgress,
    Completed,
    Submitted,
    ReadyForPickup,
}

impl Status {
    /// Every status, in display order.
    pub const ALL: [Status; 4] = [
        Status::InProgress,
        Status::Completed,
        Status::Submitted,
        Status::ReadyForPickup,
    ];

    /// The wire name of this status (`"in-progress"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Submitted => "submitted",
            Status::ReadyForPickup => "ready-for-pickup",
        }
    }

    /// Parse a wire name back into a status. Returns `None` for anything
    /// that is not one of the four known names.
    pub fn parse(s: &str) -> Option<Status> {
        Status::ALL.iter().copied().find(|st| st.as_str() == s)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// One repair ticket as stored in the remote store.
///
/// `created_at` is set once when the record is created and never mutated
/// afterwards; every other field tracks its own edit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: EditableField<String>,
    pub address: EditableField<String>,
    pub phone: EditableField<String>,
    pub device: EditableField<String>,
    pub error_description: EditableField<String>,
    pub notes: EditableField<String>,
    pub status: EditableField<Status>,
    /// Manufacturer fault code, when the customer knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<EditableField<String>>,
    /// Ticket category (e.g. `"KD"` service call, `"Rkl"` complaint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<EditableField<String>>,
    pub created_at: Timestamp,
}

/// A customer record paired with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub customer: Customer,
}

// ---------------------------------------------------------------------------
// CustomerDraft
// ---------------------------------------------------------------------------

/// Proposed field values from an edit form.
///
/// Drafts carry plain values; [`crate::merge`] decides which edit
/// timestamps move when the draft is saved against an existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub device: String,
    pub error_description: String,
    pub notes: String,
    pub status: Status,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<String>,
}

impl CustomerDraft {
    /// The fault code with empty or whitespace-only input normalized away.
    pub fn normalized_error_code(&self) -> Option<&str> {
        normalize_optional(&self.error_code)
    }

    /// The ticket type with empty or whitespace-only input normalized away.
    pub fn normalized_ticket_type(&self) -> Option<&str> {
        normalize_optional(&self.ticket_type)
    }
}

/// Treat empty and whitespace-only optional input as absent.
fn normalize_optional(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
