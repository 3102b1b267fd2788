//! Integration tests for rosterlink-gw API endpoints
//!
//! Tests cover routing, the health endpoint, request validation, and the
//! gateway-side error mapping when backing servers are down. All backing
//! endpoints point at a closed local port so connection failures are
//! immediate and deterministic; no external servers are required.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use rosterlink_common::config::GatewayConfig;
use rosterlink_gw::{build_router, AppState};

/// Test helper: config with every backing server on a closed port
fn dead_backend_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.sparql_endpoint = "http://127.0.0.1:1/repositories/roster".to_string();
    config.rest_endpoint = "http://127.0.0.1:1".to_string();
    config.graphql_endpoint = "http://127.0.0.1:1/graphql".to_string();
    for target in &mut config.probe_targets {
        target.url = "http://127.0.0.1:1".to_string();
    }
    config
}

/// Test helper: build the app router over the given config
fn setup_app(config: GatewayConfig) -> axum::Router {
    let state = AppState::new(config).expect("Should build app state");
    build_router(state)
}

/// Test helper: create a bodyless request
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(dead_backend_config());

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "rosterlink-gw");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = setup_app(dead_backend_config());

    let response = app
        .oneshot(test_request("GET", "/no/such/route"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sparql_query_requires_query_param() {
    let app = setup_app(dead_backend_config());

    let response = app
        .oneshot(test_request("GET", "/sparql/query"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sparql_entities_maps_dead_store_to_bad_gateway() {
    let app = setup_app(dead_backend_config());

    let response = app
        .oneshot(test_request("GET", "/sparql/entities"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_GATEWAY");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_rest_data_maps_dead_store_to_bad_gateway() {
    let app = setup_app(dead_backend_config());

    let response = app
        .oneshot(test_request("GET", "/rest/data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_graphql_query_unreachable_is_503() {
    let app = setup_app(dead_backend_config());

    let request = Request::builder()
        .method("POST")
        .uri("/graphql/query")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"query": "{ allTeams { id } }"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_graphql_transfer_unreachable_is_503() {
    let app = setup_app(dead_backend_config());

    let response = app
        .oneshot(test_request("POST", "/graphql/transfer"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_probe_reports_unreachable_targets() {
    let app = setup_app(dead_backend_config());

    let response = app.oneshot(test_request("GET", "/probe")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["all_reachable"], false);

    let targets = body["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 3);
    for target in targets {
        assert_eq!(target["status"], "unreachable");
        assert!(target["name"].is_string());
        assert!(target["url"].is_string());
    }
}

#[tokio::test]
async fn test_ranking_reports_query_failure_as_payload() {
    let app = setup_app(dead_backend_config());

    let response = app.oneshot(test_request("GET", "/ranking")).await.unwrap();
    // The ranking route reports failures in the body, not the status
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to query player data"));
    assert!(body["suggestion"].is_string());
}
