//! Integration tests for payment webhook consumption.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, create_project, TEST_WEBHOOK_SECRET};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use siteforge_api::handlers::webhooks::{sign_payload, SIGNATURE_HEADER};
use siteforge_db::repositories::{InvoiceRepo, ProjectRepo};

/// Post a signed payment event.
async fn post_event(
    app: axum::Router,
    payload: &serde_json::Value,
    secret: &str,
) -> axum::response::Response {
    let body = payload.to_string();
    let signature = sign_payload(secret, body.as_bytes());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhooks/payment")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_signature_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhooks/payment")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_secret_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let payload = json!({ "type": "checkout.completed", "id": "evt_1", "data": {} });
    let response = post_event(app, &payload, "wrong-secret").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn checkout_creates_project_with_plan_grant(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let payload = json!({
        "type": "checkout.completed",
        "id": "evt_checkout_1",
        "data": {
            "owner_id": 7,
            "owner_email": "new@example.com",
            "plan": "standard",
            "amount_cents": 1900,
        },
    });

    let response = post_event(app, &payload, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let project_id = body["project_id"].as_i64().unwrap();

    let project = ProjectRepo::find_by_id(&pool, project_id).await.unwrap().unwrap();
    assert_eq!(project.owner_id, 7);
    assert_eq!(project.plan, "standard");
    assert_eq!(project.token_balance, 500);
    assert_eq!(project.status_id, 1);

    let invoices = InvoiceRepo::list_by_project(&pool, project_id).await.unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].external_reference, "evt_checkout_1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_plan_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let payload = json!({
        "type": "checkout.completed",
        "id": "evt_2",
        "data": {
            "owner_id": 7,
            "owner_email": "new@example.com",
            "plan": "enterprise",
        },
    });
    let response = post_event(app, &payload, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_purchase_credits_the_balance(pool: PgPool) {
    let project = create_project(&pool, 1, 100).await;
    let app = build_test_app(pool.clone());

    let payload = json!({
        "type": "token_purchase.completed",
        "id": "evt_tokens_1",
        "data": { "project_id": project.id, "tokens": 500, "amount_cents": 900 },
    });
    let response = post_event(app, &payload, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["token_balance"], 600);

    let reloaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(reloaded.token_balance, 600);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_and_reactivate_roundtrip(pool: PgPool) {
    let project = create_project(&pool, 1, 100).await;
    common::generate_document(&pool, project.id).await;

    let cancel = json!({
        "type": "subscription.cancelled",
        "id": "evt_cancel_1",
        "data": { "project_id": project.id },
    });
    let response = post_event(build_test_app(pool.clone()), &cancel, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cancelled = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status_id, 6);
    assert!(cancelled.cancelled_at.is_some());

    let reactivate = json!({
        "type": "subscription.reactivated",
        "id": "evt_react_1",
        "data": { "project_id": project.id },
    });
    let response = post_event(build_test_app(pool.clone()), &reactivate, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::OK);

    let reactivated = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(reactivated.status_id, 3, "restored to its prior status");
    assert!(reactivated.cancelled_at.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_event_is_acknowledged(pool: PgPool) {
    let app = build_test_app(pool);
    let payload = json!({ "type": "refund.issued", "id": "evt_3", "data": {} });
    let response = post_event(app, &payload, TEST_WEBHOOK_SECRET).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ignored");
}

/// The shared signing helper really is HMAC-SHA256 over the raw body.
#[sqlx::test(migrations = "../db/migrations")]
async fn tampered_body_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let payload = json!({ "type": "checkout.completed", "id": "evt_4", "data": {} });
    let signature = sign_payload(TEST_WEBHOOK_SECRET, payload.to_string().as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhooks/payment")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(r#"{"type":"checkout.completed","id":"evt_5","data":{}}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
