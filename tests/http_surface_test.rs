mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use backoffice_api::config::AppConfig;
use backoffice_api::services::imports::ocr::VisionExtractor;
use backoffice_api::services::imports::{ImportItem, ImportPreview};
use backoffice_api::{app_router, AppState};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        log_level: "info".into(),
        log_json: false,
        auto_migrate: true,
        event_channel_capacity: 16,
        vision_api_key: None,
        vision_api_url: "http://localhost/unused".into(),
        vision_model: "test-model".into(),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Extractor returning a fixed preview, so handler tests stay off the network.
struct CannedVision(Vec<ImportItem>);

#[async_trait]
impl VisionExtractor for CannedVision {
    async fn extract_items(&self, _image: &[u8], _mime: &str) -> ImportPreview {
        ImportPreview {
            items: self.0.clone(),
            error: None,
        }
    }
}

async fn app_with_vision(items: Vec<ImportItem>) -> Router {
    let (db, events) = common::setup().await;
    let state = AppState::with_vision(db, events, &test_config(), Arc::new(CannedVision(items)));
    app_router(Arc::new(state))
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_and_status_respond_ok() {
    let app = app_with_vision(Vec::new()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["database"], "healthy");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/status")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn products_round_trip_through_the_json_api() {
    let app = app_with_vision(Vec::new()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/inventory")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "sku": "SHIRT-1",
                        "name": "Black shirt",
                        "max_stock": 40,
                        "initial_stock": 4
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["sku"], "SHIRT-1");
    assert_eq!(created["current_stock"], 4);
    // 4 of 40 sits exactly on the threshold and in the critical band
    assert_eq!(created["low_stock"], false);
    assert_eq!(created["status"], "critical");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/inventory")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn invalid_payloads_get_a_bad_request_error_body() {
    let app = app_with_vision(Vec::new()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/inventory")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"sku": "", "name": "Nameless", "max_stock": 10}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn invoice_preview_uses_the_configured_extractor() {
    let item = ImportItem {
        name: "Linen shirt".to_string(),
        sku: None,
        quantity: 2,
        price: None,
        max_stock: None,
        department: None,
        model: None,
        size: None,
        barcode: None,
    };
    let app = app_with_vision(vec![item]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/imports/invoice/preview")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "image_base64": BASE64.encode(b"scanned invoice"),
                        "mime": "image/png"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["items"][0]["name"], "Linen shirt");
    assert_eq!(preview["items"][0]["quantity"], 2);
}
