// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use werkstatt_api::auth::jwt::{generate_access_token, JwtConfig};
use werkstatt_api::auth::provider::LocalIdentity;
use werkstatt_api::auth::sessions::SessionRegistry;
use werkstatt_api::config::ServerConfig;
use werkstatt_api::routes;
use werkstatt_api::state::AppState;
use werkstatt_api::ws::WsManager;
use werkstatt_refine::{NotesRefiner, RefineError};
use werkstatt_store::{MemoryStore, RecordStore};
use werkstatt_sync::CustomerDirectory;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Mint an access token the test app will accept.
pub fn test_token(email: &str) -> String {
    generate_access_token(email, &test_config().jwt).expect("test token generation")
}

/// Refiner double that tags the notes so tests can spot the round trip.
pub struct StubRefiner;

#[async_trait]
impl NotesRefiner for StubRefiner {
    async fn refine(&self, notes: &str) -> Result<String, RefineError> {
        Ok(format!("Refined: {notes}"))
    }
}

/// Refiner double whose calls always fail.
pub struct FailingRefiner;

#[async_trait]
impl NotesRefiner for FailingRefiner {
    async fn refine(&self, _notes: &str) -> Result<String, RefineError> {
        Err(RefineError::Api {
            status: 503,
            body: "upstream briefly offline".to_string(),
        })
    }
}

/// Build the full application router over the seeded in-memory store and
/// wait until the live mirror has caught up, so listings are deterministic.
pub async fn build_test_app() -> Router {
    let app = build_app_with(Arc::new(MemoryStore::seeded()), Arc::new(StubRefiner)).await;
    wait_until_connected(&app).await;
    app
}

/// Build the full application router with all middleware layers, using the
/// given store and refiner.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub async fn build_app_with(
    store: Arc<dyn RecordStore>,
    refiner: Arc<dyn NotesRefiner>,
) -> Router {
    let config = test_config();
    let directory = CustomerDirectory::start(store).await;

    let state = AppState {
        config: Arc::new(config),
        directory,
        identity: Arc::new(LocalIdentity::new()),
        sessions: Arc::new(SessionRegistry::new()),
        refiner,
        ws_manager: Arc::new(WsManager::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Poll the health endpoint until the live mirror reports ready.
async fn wait_until_connected(app: &Router) {
    for _ in 0..200 {
        let response = get(app.clone(), "/health").await;
        let json = body_json(response).await;
        if json["storeConnected"] == true {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("store mirror did not become ready in time");
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST with no body (archive, restore, logout).
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
