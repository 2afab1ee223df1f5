//! Integration tests for admin authentication.
//!
//! Covers the shared-secret header for API clients and the login form
//! session for the dashboard pages.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sareine_integration_tests::{TestApp, json_body, location, text_body};

#[tokio::test]
async fn test_api_without_secret_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/api/admin/orders/list").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn test_api_with_wrong_secret_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::get("/api/admin/orders/list")
                .header("x-admin-secret", "not-the-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_with_secret_header_succeeds() {
    let app = TestApp::new();
    let response = app.get("/api/admin/orders/list").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["orders"], serde_json::json!([]));
}

#[tokio::test]
async fn test_pages_redirect_to_login() {
    let app = TestApp::new();
    for path in ["/", "/orders", "/preorders", "/products", "/settings"] {
        let response = app
            .send(Request::get(path).body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/login"), "{path}");
    }
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/login").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("name=\"secret\""));
}

#[tokio::test]
async fn test_login_with_wrong_secret_shows_error() {
    let app = TestApp::new();
    let response = app.post_form("/login", "secret=wrong", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/login?error=Invalid+admin+secret")
    );
}

#[tokio::test]
async fn test_login_session_opens_dashboard() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(
            Request::get("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("Dashboard"));

    // The session also authorises the JSON API
    let response = app
        .send(
            Request::get("/api/admin/settings")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app
        .send(
            Request::get("/orders")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_webhook_needs_no_session() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::post("/api/razorpay/webhook")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

    // Rejected for its missing signature, not for missing auth
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");
}
