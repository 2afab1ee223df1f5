//! Integration tests for products, customers, settings and stats.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use sareine_admin::db::Store;
use sareine_admin::models::{Order, User};
use sareine_integration_tests::{TestApp, json_body, location};
use serde_json::json;

#[tokio::test]
async fn test_product_lifecycle() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/admin/products/create",
            &json!({"name": "Rose Lip Balm", "price": "349", "slug": "rose-lip-balm"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    assert_eq!(created["success"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .post_json(
            "/api/admin/products/update",
            &json!({"id": id, "inStock": false, "tagline": "Soft, tinted care"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/admin/products/list").await).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Rose Lip Balm");
    assert_eq!(products[0]["inStock"], false);
    assert_eq!(products[0]["tagline"], "Soft, tinted care");

    let response = app
        .post_json("/api/admin/products/delete", &json!({"id": id}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.list_products().await.unwrap().is_empty());

    let response = app
        .post_json("/api/admin/products/delete", &json!({"id": id}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_create_requires_fields() {
    let app = TestApp::new();
    let response = app
        .post_json("/api/admin/products/create", &json!({"name": "No price"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Missing required fields: name, slug, price"
    );
}

#[tokio::test]
async fn test_product_form_with_invalid_price() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .post_form(
            "/products",
            "name=Kajal&slug=kajal&price=cheap",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/products?error=Invalid+price%3A+cheap")
    );
    assert!(app.store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_customers_include_order_totals() {
    let app = TestApp::new();
    let user: User = serde_json::from_value(json!({
        "id": "u1",
        "displayName": "Meera Iyer",
        "email": "meera@example.in"
    }))
    .unwrap();
    app.store.put_user(&user).await.unwrap();
    for (id, amount) in [("ord-1", 500), ("ord-2", 799)] {
        let order: Order = serde_json::from_value(json!({
            "id": id,
            "userId": "u1",
            "customerEmail": "meera@example.in",
            "amount": amount,
            "status": "paid"
        }))
        .unwrap();
        app.store.put_order(&order).await.unwrap();
    }

    let body = json_body(app.get("/api/admin/customers/list").await).await;
    let customers = body["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["orderCount"], 2);
    assert_eq!(customers[0]["totalSpend"], 1299);

    let body = json_body(app.get("/api/admin/customers/list?search=nobody").await).await;
    assert!(body["customers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_settings_default_until_saved() {
    let app = TestApp::new();

    let body = json_body(app.get("/api/admin/settings").await).await;
    assert_eq!(body["settings"]["preorderEnabled"], false);
    assert_eq!(body["settings"]["announcementText"], "");
    assert_eq!(body["settings"]["senderName"], "Sareine");

    let response = app
        .post_json(
            "/api/admin/settings",
            &json!({"preorderEnabled": true, "senderName": "Sareine Beauty"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/admin/settings").await).await;
    assert_eq!(body["settings"]["preorderEnabled"], true);
    assert_eq!(body["settings"]["senderName"], "Sareine Beauty");
    assert!(body["settings"]["updatedAt"].is_string());
}

#[tokio::test]
async fn test_sender_name_is_used_for_outgoing_mail() {
    let app = TestApp::new();
    app.post_json("/api/admin/settings", &json!({"senderName": "Sareine Beauty"}))
        .await;

    app.post_json(
        "/api/admin/emails/send",
        &json!({"type": "welcome", "recipientEmail": "new@example.in"}),
    )
    .await;

    let sent = app.mailer.sent().await;
    assert_eq!(sent[0].from_name, "Sareine Beauty");
}

#[tokio::test]
async fn test_stats_summarise_store() {
    let app = TestApp::new();
    let order: Order = serde_json::from_value(json!({
        "id": "ord-1",
        "customerEmail": "meera@example.in",
        "amount": 1299,
        "status": "paid",
        "createdAt": "2026-04-01T10:00:00Z"
    }))
    .unwrap();
    app.store.put_order(&order).await.unwrap();

    let response = app.get("/api/admin/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["totalOrders"], 1);
    assert_eq!(body["totalRevenue"], 1299);
}

#[tokio::test]
async fn test_product_update_validation() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/admin/products/update", &json!({"tagline": "No id"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Missing product id");

    let response = app
        .post_json(
            "/api/admin/products/update",
            &json!({"id": "missing", "tagline": "Ghost"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Product not found");
}

#[tokio::test]
async fn test_products_listed_by_name() {
    let app = TestApp::new();
    for (name, slug) in [("Rose Lip Balm", "rose"), ("Aloe Gel", "aloe"), ("Kajal", "kajal")] {
        let response = app
            .post_json(
                "/api/admin/products/create",
                &json!({"name": name, "price": 299, "slug": slug}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = json_body(app.get("/api/admin/products/list").await).await;
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Aloe Gel", "Kajal", "Rose Lip Balm"]);
}

#[tokio::test]
async fn test_product_create_with_unparseable_price() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/admin/products/create",
            &json!({"name": "Kajal", "slug": "kajal", "price": "abc"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid amount"));
    assert!(app.store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_settings_save_resets_omitted_fields() {
    let app = TestApp::new();
    app.post_json(
        "/api/admin/settings",
        &json!({"preorderEnabled": true, "announcementText": "Free shipping over ₹999"}),
    )
    .await;

    let response = app
        .post_json("/api/admin/settings", &json!({"preorderEnabled": true}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/admin/settings").await).await;
    assert_eq!(body["settings"]["preorderEnabled"], true);
    assert_eq!(body["settings"]["announcementText"], "");
    assert_eq!(body["settings"]["senderName"], "Sareine");
}

#[tokio::test]
async fn test_settings_null_fields_take_defaults() {
    let app = TestApp::new();
    app.post_json("/api/admin/settings", &json!({"senderName": "Sareine Beauty"}))
        .await;

    let response = app
        .post_json(
            "/api/admin/settings",
            &json!({"senderName": null, "announcementText": null, "preorderEnabled": null}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/admin/settings").await).await;
    assert_eq!(body["settings"]["senderName"], "Sareine");
    assert_eq!(body["settings"]["announcementText"], "");
    assert_eq!(body["settings"]["preorderEnabled"], false);
}
