//! Route definitions for the `/customers` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{customers, refine};
use crate::state::AppState;

/// Routes mounted at `/customers`. All of them require a Bearer token.
///
/// ```text
/// GET    /               -> list_customers
/// POST   /               -> create_customer
/// GET    /archived       -> list_archived
/// GET    /devices        -> list_devices
/// POST   /refine-notes   -> refine_notes
/// PUT    /{id}           -> update_customer
/// DELETE /{id}           -> delete_customer
/// POST   /{id}/archive   -> archive_customer
/// POST   /{id}/restore   -> restore_customer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/archived", get(customers::list_archived))
        .route("/devices", get(customers::list_devices))
        .route("/refine-notes", post(refine::refine_notes))
        .route(
            "/{id}",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .route("/{id}/archive", post(customers::archive_customer))
        .route("/{id}/restore", post(customers::restore_customer))
}
