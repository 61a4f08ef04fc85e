//! Handlers for the `/customers` resource (listing, editing, archive moves).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use werkstatt_core::customer::{CustomerDraft, Status};
use werkstatt_core::filter::ListFilter;
use werkstatt_core::page::VisibleWindow;
use werkstatt_store::StoreError;
use werkstatt_sync::{
    project, CollectionMirror, DirectoryError, LoadPhase, Projection, RecordEditor, SaveOutcome,
};

use crate::error::{ApiResult, AppError};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for the customer listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Free-text search across name, phone, address, device, and status.
    pub query: Option<String>,
    /// Status wire name, or `"all"`.
    pub status: Option<String>,
    /// Exact device name, or `"all"`.
    pub device: Option<String>,
    /// Requested window size; defaults to one page.
    pub visible: Option<usize>,
}

impl ListQuery {
    /// Translate raw query parameters into the filter + window pair.
    ///
    /// `"all"` is the dropdown's explicit no-filter choice and maps to no
    /// constraint. An unknown status name is a client error.
    fn into_view(self) -> Result<(ListFilter, VisibleWindow), AppError> {
        let status = match self.status.as_deref() {
            None | Some("all") => None,
            Some(s) => Some(
                Status::parse(s)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {s}")))?,
            ),
        };

        let device = self.device.filter(|d| d != "all");

        let filter = ListFilter {
            query: self.query.unwrap_or_default(),
            status,
            device,
        };

        let window = match self.visible {
            Some(limit) => VisibleWindow::with_limit(limit),
            None => VisibleWindow::new(),
        };

        Ok((filter, window))
    }
}

// ---------------------------------------------------------------------------
// Listing handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/customers
///
/// The live collection, filtered and windowed.
pub async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<Projection>> {
    list_partition(state.directory.live_mirror(), params).await
}

/// GET /api/v1/customers/archived
///
/// The archived collection, same filter semantics as the live listing.
pub async fn list_archived(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<Projection>> {
    list_partition(state.directory.archive_mirror(), params).await
}

/// GET /api/v1/customers/devices
///
/// Distinct device names across both collections, for the filter dropdown.
pub async fn list_devices(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<DataResponse<Vec<String>>>> {
    let devices = state.directory.device_options().await;
    Ok(Json(DataResponse { data: devices }))
}

/// Shared listing logic for the live and archived collections.
///
/// A mirror whose subscription failed makes the listing itself unavailable;
/// a mirror that is still loading returns an empty page with `loading: true`.
async fn list_partition(
    mirror: &CollectionMirror,
    params: ListQuery,
) -> ApiResult<Json<Projection>> {
    let (filter, window) = params.into_view()?;

    let phase = mirror.phase().await;
    if let LoadPhase::Failed(reason) = &phase {
        return Err(AppError::Store(StoreError::Subscribe(reason.clone())));
    }

    let records = mirror.records().await;
    Ok(Json(project(&records, &phase, &filter, window)))
}

// ---------------------------------------------------------------------------
// Write handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/customers
///
/// Accepted rather than Created: the store assigns the id, and the record
/// becomes visible through the next snapshot.
pub async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(draft): Json<CustomerDraft>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let plan = RecordEditor::New
        .submit(&draft, Utc::now())
        .map_err(AppError::Validation)?;
    state.directory.apply(plan).await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

/// PUT /api/v1/customers/{id}
///
/// Submit a full draft against an existing live record. Only changed fields
/// get a new edit timestamp; an unchanged draft writes nothing and reports
/// `"updated": false`.
pub async fn update_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(draft): Json<CustomerDraft>,
) -> ApiResult<Json<Value>> {
    let original = state
        .directory
        .live_mirror()
        .get(&id)
        .await
        .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;

    let editor = RecordEditor::Existing {
        id,
        original: original.customer,
    };
    let plan = editor
        .submit(&draft, Utc::now())
        .map_err(AppError::Validation)?;
    let outcome = state.directory.apply(plan).await?;

    Ok(Json(json!({ "updated": outcome == SaveOutcome::Updated })))
}

/// DELETE /api/v1/customers/{id}
///
/// Idempotent: deleting an id that is already gone still returns 204.
pub async fn delete_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.directory.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/customers/{id}/archive
///
/// Move a live record to the archive, values and edit timestamps untouched.
pub async fn archive_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.directory.archive(&id).await?;
    Ok(Json(json!({ "archived": true })))
}

/// POST /api/v1/customers/{id}/restore
///
/// Move an archived record back to the live collection.
pub async fn restore_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.directory.restore(&id).await?;
    Ok(Json(json!({ "restored": true })))
}
