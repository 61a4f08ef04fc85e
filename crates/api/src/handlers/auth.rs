//! Handlers for the `/auth` resource (signup, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use werkstatt_core::CoreError;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::error::{ApiResult, AppError};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by signup, login, and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public account info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account and sign it in. Returns access and refresh tokens.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = state.identity.sign_up(&input.email, &input.password).await?;
    tracing::info!(%email, "Account created");

    let response = create_auth_response(&state, &email).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = state.identity.sign_in(&input.email, &input.password).await?;

    let response = create_auth_response(&state, &email).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    // 1. Hash the provided refresh token and redeem the matching session.
    //    Redeeming removes it, so the old token is dead either way (rotation).
    let token_hash = hash_refresh_token(&input.refresh_token);
    let email = state.sessions.consume(&token_hash).await.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    })?;

    // 2. Generate new tokens and record the new session.
    let response = create_auth_response(&state, &email).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all refresh sessions for the authenticated account. Returns 204.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    let revoked = state.sessions.revoke_all_for(&user.email).await;
    tracing::debug!(email = %user.email, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, record the session, and build the response.
async fn create_auth_response(state: &AppState, email: &str) -> ApiResult<AuthResponse> {
    let access_token = generate_access_token(email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    state
        .sessions
        .insert(
            refresh_hash,
            email.to_string(),
            state.config.jwt.refresh_token_expiry_days,
        )
        .await;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user: UserInfo {
            email: email.to_string(),
        },
    })
}
