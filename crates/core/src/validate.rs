//! Form-level draft validation.
//!
//! These are the same constraints the edit form enforces; a draft that
//! fails them never reaches the store. Notes and the optional extension
//! fields are unconstrained.

use serde::Serialize;

use crate::customer::CustomerDraft;

/// Minimum field lengths in characters (not bytes; names and addresses
/// routinely contain umlauts).
const MIN_NAME_LEN: usize = 2;
const MIN_ADDRESS_LEN: usize = 5;
const MIN_PHONE_LEN: usize = 7;
const MIN_DEVICE_LEN: usize = 2;
const MIN_ERROR_DESCRIPTION_LEN: usize = 5;

/// A single field-level violation. `field` uses the wire name so clients
/// can attach the message to the offending input directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a draft against the form constraints.
///
/// Collects every violation rather than stopping at the first, so the
/// caller can annotate all offending fields at once.
pub fn validate_draft(draft: &CustomerDraft) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    if chars(&draft.name) < MIN_NAME_LEN {
        violations.push(FieldViolation::new(
            "name",
            format!("Name must be at least {MIN_NAME_LEN} characters long"),
        ));
    }
    if chars(&draft.address) < MIN_ADDRESS_LEN {
        violations.push(FieldViolation::new(
            "address",
            format!("Address must be at least {MIN_ADDRESS_LEN} characters long"),
        ));
    }
    if chars(&draft.phone) < MIN_PHONE_LEN {
        violations.push(FieldViolation::new(
            "phone",
            format!("Enter a valid phone number (at least {MIN_PHONE_LEN} characters)"),
        ));
    }
    if chars(&draft.device) < MIN_DEVICE_LEN {
        violations.push(FieldViolation::new("device", "Device name is required"));
    }
    if chars(&draft.error_description) < MIN_ERROR_DESCRIPTION_LEN {
        violations.push(FieldViolation::new(
            "errorDescription",
            "Error description is required",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn chars(value: &str) -> usize {
    value.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Status;

    fn valid_draft() -> CustomerDraft {
        CustomerDraft {
            name: "Anna Schmidt".to_string(),
            address: "Hauptstraße 12, Köln".to_string(),
            phone: "0221 456789".to_string(),
            device: "Miele W1".to_string(),
            error_description: "Trommel dreht nicht".to_string(),
            notes: String::new(),
            status: Status::InProgress,
            error_code: None,
            ticket_type: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_draft(&valid_draft()).is_ok());
    }

    #[test]
    fn empty_notes_and_extensions_are_allowed() {
        let mut draft = valid_draft();
        draft.notes = String::new();
        draft.error_code = Some(String::new());
        draft.ticket_type = None;
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn minimum_boundaries_pass() {
        let mut draft = valid_draft();
        draft.name = "Al".to_string(); // exactly 2
        draft.address = "Weg 1".to_string(); // exactly 5
        draft.phone = "1234567".to_string(); // exactly 7
        draft.device = "W1".to_string(); // exactly 2
        draft.error_description = "kaput".to_string(); // exactly 5
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn too_short_name_is_reported() {
        let mut draft = valid_draft();
        draft.name = "A".to_string();

        let violations = validate_draft(&draft).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
        assert!(violations[0].message.contains("at least 2"));
    }

    #[test]
    fn violations_use_wire_field_names() {
        let mut draft = valid_draft();
        draft.error_description = "x".to_string();

        let violations = validate_draft(&draft).unwrap_err();
        assert_eq!(violations[0].field, "errorDescription");
    }

    #[test]
    fn all_violations_are_collected() {
        let draft = CustomerDraft {
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            device: String::new(),
            error_description: String::new(),
            notes: String::new(),
            status: Status::InProgress,
            error_code: None,
            ticket_type: None,
        };

        let violations = validate_draft(&draft).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            ["name", "address", "phone", "device", "errorDescription"]
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut draft = valid_draft();
        // Two characters, four bytes.
        draft.name = "Äö".to_string();
        assert!(validate_draft(&draft).is_ok());
    }
}
