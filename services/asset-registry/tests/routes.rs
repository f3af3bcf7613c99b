// Route-level tests driving the router in-process

use asset_registry::{router, spawn_asset_store, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState {
        store: spawn_asset_store(64),
    })
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, body.map(|b| b.to_string())).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/assets", Some(json!({"id": "a1", "value": "x"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "message": "Asset created successfully",
            "asset": {"id": "a1", "value": "x"}
        })
    );

    let (status, body) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "a1", "value": "x"}));
}

#[tokio::test]
async fn test_get_missing_asset() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/assets/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Asset not found"}));
}

#[tokio::test]
async fn test_update_is_shallow_merge() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/assets",
        Some(json!({"id": "a1", "value": "x", "owner": "alice"})),
    )
    .await;

    let (status, body) = send(&app, Method::PUT, "/assets/a1", Some(json!({"value": "y"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset updated successfully");
    assert_eq!(body["asset"], json!({"id": "a1", "value": "y", "owner": "alice"}));

    let (_, body) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(body, json!({"id": "a1", "value": "y", "owner": "alice"}));
}

#[tokio::test]
async fn test_update_missing_asset() {
    let app = app();

    let (status, body) = send(&app, Method::PUT, "/assets/a1", Some(json!({"value": "y"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Asset not found"}));
}

#[tokio::test]
async fn test_update_can_change_id() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1"}))).await;

    send(&app, Method::PUT, "/assets/a1", Some(json!({"id": "a2"}))).await;

    let (status, _) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/assets/a2", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_with_non_object_body_changes_nothing() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1", "value": "x"}))).await;

    let (status, body) = send(&app, Method::PUT, "/assets/a1", Some(json!(["value", "y"]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asset"], json!({"id": "a1", "value": "x"}));
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1", "value": "x"}))).await;

    let (status, body) = send(&app, Method::DELETE, "/assets/a1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Asset deleted successfully"}));

    let (status, _) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/assets/a1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Asset not found"}));
}

#[tokio::test]
async fn test_duplicate_ids_first_match_wins() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1", "value": "first"}))).await;
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1", "value": "second"}))).await;

    let (_, body) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(body["value"], "first");

    let (_, body) = send(&app, Method::GET, "/assets", None).await;
    assert_eq!(
        body,
        json!([
            {"id": "a1", "value": "first"},
            {"id": "a1", "value": "second"}
        ])
    );

    // Deleting removes only the first; the second becomes reachable
    send(&app, Method::DELETE, "/assets/a1", None).await;
    let (_, body) = send(&app, Method::GET, "/assets/a1", None).await;
    assert_eq!(body["value"], "second");
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let app = app();
    for id in ["c", "a", "b"] {
        send(&app, Method::POST, "/assets", Some(json!({"id": id}))).await;
    }

    let (status, body) = send(&app, Method::GET, "/assets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": "c"}, {"id": "a"}, {"id": "b"}]));
}

#[tokio::test]
async fn test_empty_list() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/assets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_record_without_id_is_listed_only() {
    let app = app();

    let (status, _) = send(&app, Method::POST, "/assets", Some(json!({"value": "orphan"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::GET, "/assets/undefined", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/assets", None).await;
    assert_eq!(body, json!([{"value": "orphan"}]));
}

#[tokio::test]
async fn test_numeric_id_never_matches() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": 7, "value": "x"}))).await;

    let (status, _) = send(&app, Method::GET, "/assets/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = app();

    let (status, _) = send_raw(&app, Method::POST, "/assets", Some("{not json".to_string())).await;
    assert!(status.is_client_error());

    let (_, body) = send(&app, Method::GET, "/assets", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_health_reports_asset_count() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "a1"}))).await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "asset-registry");
    assert_eq!(body["assets"], 1);
}

#[tokio::test]
async fn test_metrics_exported() {
    let app = app();
    send(&app, Method::GET, "/assets/missing", None).await;

    let (status, bytes) = send_raw(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("asset_registry_http_requests_total"));
    assert!(text.contains("asset_registry_asset_lookups_missed_total"));
}

#[tokio::test]
async fn test_path_id_is_percent_decoded() {
    let app = app();
    send(&app, Method::POST, "/assets", Some(json!({"id": "asset 1"}))).await;

    let (status, body) = send(&app, Method::GET, "/assets/asset%201", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "asset 1");
}
