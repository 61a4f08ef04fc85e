use crate::types::RecordId;

/// Domain errors shared across the workspace crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
