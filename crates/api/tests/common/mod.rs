#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use plotledger_core::commission::CommissionRates;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use plotledger_api::config::ServerConfig;
use plotledger_api::router::build_app_router;
use plotledger_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and the default commission rates.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        commission_rates: CommissionRates::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a broker profile and return its id.
pub async fn create_broker(app: &Router, name: &str, upline_id: Option<i64>) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/profiles",
        serde_json::json!({ "full_name": name, "upline_id": upline_id }),
    )
    .await;
    assert_eq!(response.status(), 201, "creating profile {name}");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a plot and return its id.
pub async fn create_plot(
    app: &Router,
    plot_number: &str,
    area_gaj: f64,
    broker_id: Option<i64>,
) -> i64 {
    let response = post_json(
        app.clone(),
        "/api/v1/plots",
        serde_json::json!({
            "project_name": "Green Valley",
            "plot_number": plot_number,
            "area_gaj": area_gaj,
            "total_amount": 1_000_000.0,
            "broker_id": broker_id,
        }),
    )
    .await;
    assert_eq!(response.status(), 201, "creating plot {plot_number}");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Total wallet balance of a profile as reported by the API.
pub async fn wallet_total(app: &Router, profile_id: i64) -> f64 {
    let response = get(app.clone(), &format!("/api/v1/profiles/{profile_id}/wallet")).await;
    assert_eq!(response.status(), 200);
    body_json(response).await["data"]["total_balance"]
        .as_f64()
        .unwrap()
}
