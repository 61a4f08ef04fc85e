//! Integration tests for signup, login, token refresh, and logout.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app, get, get_auth, post_auth, post_json};
use serde_json::{json, Value};
use tower::ServiceExt;

fn credentials(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

// ---------------------------------------------------------------------------
// Test: signup creates an account and signs it in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_returns_tokens_and_user() {
    let app = build_test_app().await;

    let response = post_json(
        app,
        "/api/v1/auth/signup",
        credentials("Anna@Example.com", "secret-password"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["accessToken"].is_string());
    assert!(json["refreshToken"].is_string());
    assert_eq!(json["expiresIn"], 900, "15 minutes in seconds");
    // The email comes back normalized.
    assert_eq!(json["user"]["email"], "anna@example.com");
}

// ---------------------------------------------------------------------------
// Test: duplicate signup conflicts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = build_test_app().await;
    let body = credentials("anna@example.com", "secret-password");

    let first = post_json(app.clone(), "/api/v1/auth/signup", body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let json = body_json(second).await;
    assert_eq!(json["code"], "EMAIL_IN_USE");
}

// ---------------------------------------------------------------------------
// Test: weak password and malformed email are client errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weak_password_is_rejected() {
    let app = build_test_app().await;

    let response = post_json(
        app,
        "/api/v1/auth/signup",
        credentials("anna@example.com", "five5"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "WEAK_PASSWORD");
    assert!(
        json["error"].as_str().unwrap().contains("at least 6"),
        "message should state the minimum length"
    );
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let app = build_test_app().await;

    let response = post_json(
        app,
        "/api/v1/auth/signup",
        credentials("not-an-email", "secret-password"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_EMAIL");
}

// ---------------------------------------------------------------------------
// Test: login round trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_a_working_access_token() {
    let app = build_test_app().await;
    post_json(
        app.clone(),
        "/api/v1/auth/signup",
        credentials("anna@example.com", "secret-password"),
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        credentials("anna@example.com", "secret-password"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let access_token = json["accessToken"].as_str().unwrap();

    let listing = get_auth(app, "/api/v1/customers", access_token).await;
    assert_eq!(listing.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let app = build_test_app().await;
    post_json(
        app.clone(),
        "/api/v1/auth/signup",
        credentials("anna@example.com", "secret-password"),
    )
    .await;

    let wrong = post_json(
        app.clone(),
        "/api/v1/auth/login",
        credentials("anna@example.com", "wrong-password"),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_json = body_json(wrong).await;

    let unknown = post_json(
        app,
        "/api/v1/auth/login",
        credentials("bernd@example.com", "secret-password"),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_json = body_json(unknown).await;

    // Identical payloads, so responses do not reveal which accounts exist.
    assert_eq!(wrong_json["code"], "INVALID_CREDENTIALS");
    assert_eq!(wrong_json, unknown_json);
}

// ---------------------------------------------------------------------------
// Test: refresh rotation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_rotates_the_refresh_token() {
    let app = build_test_app().await;
    let signup = post_json(
        app.clone(),
        "/api/v1/auth/signup",
        credentials("anna@example.com", "secret-password"),
    )
    .await;
    let first = body_json(signup).await;
    let first_refresh = first["refreshToken"].as_str().unwrap().to_string();

    // Exchange the refresh token.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refreshToken": first_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    let second_refresh = second["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(second_refresh, first_refresh);

    // The old token is dead after one use.
    let replay = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refreshToken": first_refresh }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    // The new one still works.
    let again = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refreshToken": second_refresh }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_refresh_token_is_unauthorized() {
    let app = build_test_app().await;

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refreshToken": "never-issued" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: logout revokes every session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_revokes_refresh_sessions() {
    let app = build_test_app().await;
    let signup = post_json(
        app.clone(),
        "/api/v1/auth/signup",
        credentials("anna@example.com", "secret-password"),
    )
    .await;
    let tokens = body_json(signup).await;
    let access = tokens["accessToken"].as_str().unwrap();
    let refresh = tokens["refreshToken"].as_str().unwrap();

    let logout = post_auth(app.clone(), "/api/v1/auth/logout", access).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refreshToken": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: Bearer token enforcement on protected routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_route_requires_a_token() {
    let app = build_test_app().await;

    let response = get(app, "/api/v1/customers").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let app = build_test_app().await;

    let request = Request::builder()
        .uri("/api/v1/customers")
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Invalid Authorization format. Expected: Bearer <token>"
    );
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = build_test_app().await;

    let response = get_auth(app, "/api/v1/customers", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}
