//! Integration tests for manual distribution and recalculation.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_broker, create_plot, get, post_json, put_json, wallet_total};
use serde_json::json;
use sqlx::PgPool;

async fn sell(app: &axum::Router, plot: i64) {
    let response = put_json(
        app.clone(),
        &format!("/api/v1/plots/{plot}/status"),
        json!({ "status": "sold" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_distribute_without_plot(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let chetan = create_broker(&app, "Chetan", Some(bhavesh)).await;

    let response = post_json(
        app.clone(),
        "/api/v1/commissions/distribute",
        json!({ "seller_id": chetan, "sale_area": 100.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["seller_commission"], 100_000.0);
    assert_eq!(json["data"]["upline_commissions"], 25_000.0);
    assert_eq!(json["data"]["total_distributed"], 125_000.0);
    assert_eq!(json["data"]["commissions_generated"], 2);

    assert_eq!(wallet_total(&app, chetan).await, 100_000.0);
    assert_eq!(wallet_total(&app, bhavesh).await, 20_000.0);
    assert_eq!(wallet_total(&app, asha).await, 5_000.0);

    let json = body_json(get(app.clone(), "/api/v1/commissions").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let json = body_json(get(app, &format!("/api/v1/profiles/{bhavesh}/transactions")).await).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["wallet_type"], "downline");
    assert_eq!(entries[0]["level"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_distribute_rejects_bad_input(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;

    let response = post_json(
        app.clone(),
        "/api/v1/commissions/distribute",
        json!({ "seller_id": asha, "sale_area": 0.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/commissions/distribute",
        json!({ "seller_id": 999999, "sale_area": 50.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repeat_distribution_for_plot_is_idempotent(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let plot = create_plot(&app, "A-1", 100.0, Some(bhavesh)).await;
    sell(&app, plot).await;

    let response = post_json(
        app.clone(),
        "/api/v1/commissions/distribute",
        json!({ "seller_id": bhavesh, "sale_area": 100.0, "plot_id": plot }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["already_calculated"], true);

    assert_eq!(wallet_total(&app, bhavesh).await, 100_000.0);
    assert_eq!(wallet_total(&app, asha).await, 20_000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_distribute_requires_sold_plot(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let plot = create_plot(&app, "A-1", 100.0, Some(asha)).await;
    put_json(
        app.clone(),
        &format!("/api/v1/plots/{plot}/status"),
        json!({ "status": "booked" }),
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/commissions/distribute",
        json!({ "seller_id": asha, "sale_area": 100.0, "plot_id": plot }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(wallet_total(&app, asha).await, 0.0);

    let json = body_json(get(app, &format!("/api/v1/profiles/{asha}/transactions")).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recalculate_plot(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let plot = create_plot(&app, "A-1", 100.0, Some(bhavesh)).await;
    let uri = format!("/api/v1/plots/{plot}/recalculate-commission");

    let response = post_json(app.clone(), &uri, json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    sell(&app, plot).await;
    let response = post_json(app.clone(), &uri, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["plot_id"], plot);
    assert_eq!(json["data"]["success"], true);

    assert_eq!(wallet_total(&app, bhavesh).await, 100_000.0);
    assert_eq!(wallet_total(&app, asha).await, 20_000.0);

    let response = post_json(
        app,
        "/api/v1/plots/999999/recalculate-commission",
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recalculate_all_rebuilds_wallets(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let sold = create_plot(&app, "A-1", 100.0, Some(bhavesh)).await;
    create_plot(&app, "A-2", 80.0, Some(bhavesh)).await;
    sell(&app, sold).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/wallets/{asha}/adjust"),
        json!({
            "direction": "credit",
            "wallet_type": "direct",
            "amount": 5_000.0,
            "description": "Festival bonus"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(wallet_total(&app, asha).await, 25_000.0);

    let response = post_json(app.clone(), "/api/v1/commissions/recalculate-all", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["plots_processed"], 1);
    assert_eq!(json["data"]["plots_failed"], 0);
    assert_eq!(json["data"]["total_distributed"], 120_000.0);

    assert_eq!(wallet_total(&app, bhavesh).await, 100_000.0);
    assert_eq!(wallet_total(&app, asha).await, 20_000.0);

    let json = body_json(get(app, &format!("/api/v1/profiles/{asha}/commissions")).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
