//! Handler for AI-backed customer notes refinement.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /customers/refine-notes`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    pub notes: String,
}

/// Response envelope for notes refinement.
///
/// Refinement failures are part of the payload, not HTTP errors: the form
/// keeps the original notes and shows the reason inline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub refined_notes: String,
    pub error: Option<String>,
}

/// POST /api/v1/customers/refine-notes
///
/// Run the notes through the refinement model. On failure the original
/// notes come back unchanged alongside the error message.
pub async fn refine_notes(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<RefineRequest>,
) -> Json<RefineResponse> {
    match state.refiner.refine(&input.notes).await {
        Ok(refined) => Json(RefineResponse {
            refined_notes: refined,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Notes refinement failed");
            Json(RefineResponse {
                refined_notes: input.notes,
                error: Some(e.to_string()),
            })
        }
    }
}
