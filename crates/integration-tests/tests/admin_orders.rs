//! Integration tests for order management through the JSON API and pages.

#![allow(clippy::unwrap_used)]

use sareine_admin::db::Store;
use sareine_admin::middleware::ADMIN_SECRET_HEADER;
use sareine_admin::models::Order;
use sareine_core::{OrderId, OrderStatus};
use sareine_integration_tests::{ADMIN_SECRET, TestApp, json_body, location};
use serde_json::json;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

async fn seed_order(app: &TestApp, id: &str, status: &str, email: &str) {
    let order: Order = serde_json::from_value(json!({
        "id": id,
        "customerName": "Meera Iyer",
        "customerEmail": email,
        "amount": 1299,
        "status": status,
        "items": [{"name": "Rose Lip Balm", "price": 349, "quantity": 2}],
        "createdAt": "2026-02-01T09:30:00Z"
    }))
    .unwrap();
    app.store.put_order(&order).await.unwrap();
}

#[tokio::test]
async fn test_list_orders_filters_by_status() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;
    seed_order(&app, "ord-2", "dispatched", "asha@example.in").await;

    let body = json_body(app.get("/api/admin/orders/list?status=dispatched").await).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], "ord-2");

    let body = json_body(app.get("/api/admin/orders/list?search=ASHA").await).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_status_filter_is_bad_request() {
    let app = TestApp::new();
    let response = app.get("/api/admin/orders/list?status=shipped").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dispatch_updates_status_and_emails_customer() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"firestoreId": "ord-1", "status": "dispatched", "sendEmail": true}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    let order = app.store.get_order(&OrderId::new("ord-1")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Dispatched);
    assert!(order.updated_at.is_some());

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "meera@example.in");
    assert_eq!(sent[0].subject, "Your Order Has Been Shipped — Sareine");

    let logs = app.store.recent_email_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].success);
}

#[tokio::test]
async fn test_status_update_without_email_sends_nothing() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"id": "ord-1", "status": "delivered"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_failed_status_email_does_not_fail_update() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "dispatched", "bounce@example.in").await;
    app.mailer.fail_for("bounce@example.in").await;

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"id": "ord-1", "status": "delivered", "sendEmail": true}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let order = app.store.get_order(&OrderId::new("ord-1")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);

    let logs = app.store.recent_email_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert!(logs[0].error.is_some());
}

#[tokio::test]
async fn test_update_status_validation() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;

    let response = app
        .post_json("/api/admin/orders/update-status", &json!({"status": "paid"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Missing firestoreId or status");

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"id": "ord-1", "status": "teleported"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"id": "ord-404", "status": "paid"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Order not found");
}

#[tokio::test]
async fn test_store_outage_hides_database_details() {
    let app = TestApp::new();
    app.store.set_offline(true);

    let response = app.get("/api/admin/orders/list").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal server error");
}

#[tokio::test]
async fn test_status_form_redirects_with_flash() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;
    let cookie = app.login().await;

    let response = app
        .post_form("/orders/ord-1/status", "status=cancelled", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/orders?success=Order+status+updated")
    );

    let order = app.store.get_order(&OrderId::new("ord-1")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_update_status_with_both_id_fields_uses_firestore_id() {
    let app = TestApp::new();
    seed_order(&app, "ord-1", "paid", "meera@example.in").await;
    seed_order(&app, "ord-2", "paid", "asha@example.in").await;

    let response = app
        .post_json(
            "/api/admin/orders/update-status",
            &json!({"id": "ord-2", "firestoreId": "ord-1", "status": "delivered"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let first = app.store.get_order(&OrderId::new("ord-1")).await.unwrap().unwrap();
    let second = app.store.get_order(&OrderId::new("ord-2")).await.unwrap().unwrap();
    assert_eq!(first.status, OrderStatus::Delivered);
    assert_eq!(second.status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_malformed_json_body_answers_with_error_json() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::post("/api/admin/orders/update-status")
                .header(header::CONTENT_TYPE, "application/json")
                .header(ADMIN_SECRET_HEADER, ADMIN_SECRET)
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = json_body(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());
}
