//! Integration tests for the email API and the email log.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use sareine_admin::db::Store;
use sareine_admin::models::User;
use sareine_integration_tests::{TestApp, json_body};
use serde_json::json;

async fn seed_user(app: &TestApp, id: &str, email: Option<&str>) {
    let user: User = serde_json::from_value(json!({
        "id": id,
        "displayName": "Customer",
        "email": email,
    }))
    .unwrap();
    app.store.put_user(&user).await.unwrap();
}

#[tokio::test]
async fn test_unknown_email_type_is_rejected() {
    let app = TestApp::new();
    let response = app
        .post_json("/api/admin/emails/send", &json!({"type": "newsletter"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Unknown email type: newsletter"
    );
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_custom_email_is_sent_and_logged() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({
                "type": "custom",
                "recipientEmail": "meera@example.in",
                "subject": "About your order",
                "bodyText": "Your parcel is delayed by a day."
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "About your order");
    assert_eq!(sent[0].from_name, "Sareine");

    let body = json_body(app.get("/api/admin/emails/log").await).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["type"], "custom");
    assert_eq!(logs[0]["recipient"], "meera@example.in");
    assert_eq!(logs[0]["success"], true);
}

#[tokio::test]
async fn test_custom_email_requires_recipient() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({"type": "custom", "subject": "Hello"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Missing recipient email");
}

#[tokio::test]
async fn test_failed_send_is_logged_and_reported() {
    let app = TestApp::new();
    app.mailer.fail_for("bounce@example.in").await;

    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({"type": "welcome", "customerEmail": "bounce@example.in", "customerName": "Riya"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let logs = app.store.recent_email_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert_eq!(logs[0].recipient, "bounce@example.in");
}

#[tokio::test]
async fn test_order_email_for_missing_order() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({"type": "order_confirmation", "firestoreId": "ord-404"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Order not found");
}

#[tokio::test]
async fn test_promotional_email_goes_to_every_user_with_an_address() {
    let app = TestApp::new();
    seed_user(&app, "u1", Some("a@example.in")).await;
    seed_user(&app, "u2", Some("b@example.in")).await;
    seed_user(&app, "u3", None).await;
    app.mailer.fail_for("b@example.in").await;

    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({
                "type": "promotional",
                "subject": "Monsoon sale",
                "bodyText": "Everything 20% off this week.",
                "ctaText": "Shop now",
                "ctaUrl": "https://sareine.in/shop"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sent to 1/2 recipients");

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@example.in");

    let logs = app.store.recent_email_logs(10).await.unwrap();
    assert_eq!(logs[0].recipient, "bulk");
}

#[tokio::test]
async fn test_log_write_failure_does_not_fail_send() {
    let app = TestApp::new();
    app.store.set_reject_email_logs(true);

    let response = app
        .post_json(
            "/api/admin/emails/send",
            &json!({"type": "welcome", "recipientEmail": "new@example.in"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.mailer.sent().await.len(), 1);
}
