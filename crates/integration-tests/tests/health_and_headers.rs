//! Integration tests for health probes, diagnostics and security headers.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sareine_integration_tests::{TestApp, json_body, text_body};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reflects_store() {
    let app = TestApp::new();
    let ready = Request::get("/health/ready").body(Body::empty()).unwrap();
    assert_eq!(app.send(ready).await.status(), StatusCode::OK);

    app.store.set_offline(true);
    let ready = Request::get("/health/ready").body(Body::empty()).unwrap();
    assert_eq!(app.send(ready).await.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new();
    for request in [
        Request::get("/health").body(Body::empty()).unwrap(),
        Request::get("/login").body(Body::empty()).unwrap(),
        Request::get("/api/admin/stats").body(Body::empty()).unwrap(),
    ] {
        let response = app.send(request).await;
        let headers = response.headers();
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key(header::REFERRER_POLICY));
        // Served over plain HTTP in tests
        assert!(!headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}

#[tokio::test]
async fn test_diagnostics_report_integrations() {
    let app = TestApp::new();
    let body = json_body(app.get("/api/admin/diagnostics").await).await;

    // The in-memory mailer can always deliver
    assert_eq!(body["smtp"]["configured"], true);
    assert_eq!(body["smtp"]["missing"], serde_json::json!([]));
    assert_eq!(body["paymentGateway"], true);
    assert_eq!(body["webhookSecret"], true);
    assert_eq!(body["storeReachable"], true);

    let app = TestApp::without_gateway();
    app.store.set_offline(true);
    let body = json_body(app.get("/api/admin/diagnostics").await).await;
    assert_eq!(body["paymentGateway"], false);
    assert_eq!(body["storeReachable"], false);
    assert_eq!(body["storeError"], "Store unavailable");
}
