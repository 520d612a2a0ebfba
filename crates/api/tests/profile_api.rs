//! Integration tests for profiles, the referral tree and KYC verification.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_broker, create_plot, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_profile_defaults_to_broker(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "full_name": "Asha Verma", "phone": "9876543210" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "broker");
    assert_eq!(json["data"]["is_active"], true);
    assert!(json["data"]["upline_id"].is_null());

    let response = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "full_name": "Office", "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app, "/api/v1/profiles?role=admin").await).await;
    let admins = json["data"].as_array().unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0]["full_name"], "Office");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_profile_validation(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "full_name": "Asha", "role": "superuser" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app.clone(), "/api/v1/profiles", json!({ "full_name": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "full_name": "Asha", "upline_id": 999999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/api/v1/profiles?role=superuser").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upline_changes_reject_cycles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let chetan = create_broker(&app, "Chetan", Some(bhavesh)).await;

    let uri = format!("/api/v1/profiles/{asha}/upline");
    let response = put_json(app.clone(), &uri, json!({ "upline_id": chetan })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json(app.clone(), &uri, json!({ "upline_id": asha })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        app.clone(),
        &format!("/api/v1/profiles/{chetan}/upline"),
        json!({ "upline_id": asha }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["upline_id"], asha);

    let response = put_json(
        app.clone(),
        &format!("/api/v1/profiles/{bhavesh}/upline"),
        json!({ "upline_id": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["upline_id"].is_null());

    let json = body_json(get(app, &format!("/api/v1/profiles/{asha}/downline")).await).await;
    let downline = json["data"].as_array().unwrap();
    assert_eq!(downline.len(), 1);
    assert_eq!(downline[0]["id"], chetan);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_broker_portal_reads(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let bhavesh = create_broker(&app, "Bhavesh", Some(asha)).await;
    let plot = create_plot(&app, "A-1", 100.0, Some(bhavesh)).await;
    create_plot(&app, "A-2", 100.0, None).await;
    put_json(
        app.clone(),
        &format!("/api/v1/plots/{plot}/status"),
        json!({ "status": "sold" }),
    )
    .await;

    let json = body_json(get(app.clone(), &format!("/api/v1/profiles/{bhavesh}/plots")).await).await;
    let plots = json["data"].as_array().unwrap();
    assert_eq!(plots.len(), 1);
    assert_eq!(plots[0]["id"], plot);

    let json = body_json(get(app.clone(), &format!("/api/v1/profiles/{asha}/commissions")).await).await;
    let commissions = json["data"].as_array().unwrap();
    assert_eq!(commissions.len(), 1);
    assert_eq!(commissions[0]["seller_id"], bhavesh);
    assert_eq!(commissions[0]["seller_name"], "Bhavesh");
    assert_eq!(commissions[0]["level"], 1);

    let json = body_json(get(app, &format!("/api/v1/profiles/{bhavesh}/transactions")).await).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["wallet_type"], "direct");
    assert_eq!(entries[0]["plot_id"], plot);
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_review_flow(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;
    let admin = create_broker(&app, "Office", None).await;
    let submission = json!({
        "profile_id": asha,
        "document_type": "pan",
        "document_number": "abcde 1234f",
        "document_url": "https://files.example.com/kyc/asha-pan.jpg"
    });

    let response = post_json(app.clone(), "/api/v1/verifications", submission.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["document_number"], "ABCDE1234F");
    let first = json["data"]["id"].as_i64().unwrap();

    let response = post_json(app.clone(), "/api/v1/verifications", submission.clone()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let reject = format!("/api/v1/verifications/{first}/reject");
    let response = post_json(app.clone(), &reject, json!({ "reviewed_by": admin })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app.clone(),
        &reject,
        json!({ "reviewed_by": admin, "rejection_reason": "Photo is blurred" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["rejection_reason"], "Photo is blurred");
    assert!(json["data"]["reviewed_at"].is_string());

    let response = post_json(app.clone(), "/api/v1/verifications", submission).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await["data"]["id"].as_i64().unwrap();

    let approve = format!("/api/v1/verifications/{second}/approve");
    let response = post_json(app.clone(), &approve, json!({ "reviewed_by": admin })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    let response = post_json(app.clone(), &approve, json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(get(app, "/api/v1/verifications?status=approved").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_document_rules(pool: PgPool) {
    let app = common::build_test_app(pool);
    let asha = create_broker(&app, "Asha", None).await;

    for (document_type, number) in [("aadhaar", "1234 5678"), ("licence", "DL-0420"), ("pan", "")] {
        let response = post_json(
            app.clone(),
            "/api/v1/verifications",
            json!({
                "profile_id": asha,
                "document_type": document_type,
                "document_number": number,
                "document_url": "https://files.example.com/kyc/doc.jpg"
            }),
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{document_type} {number}"
        );
    }

    let response = post_json(
        app,
        "/api/v1/verifications",
        json!({
            "profile_id": asha,
            "document_type": "aadhaar",
            "document_number": "1234 5678 9012",
            "document_url": "not a url"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
