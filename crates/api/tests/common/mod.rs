//! Shared helpers for API integration tests.
//!
//! Mirrors the router construction in `main.rs` via
//! [`siteforge_api::router::build_app_router`] so tests exercise the same
//! middleware stack (CORS, request ID, timeout, tracing, panic recovery)
//! that production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use siteforge_api::auth::jwt::{generate_access_token, JwtConfig};
use siteforge_api::config::ServerConfig;
use siteforge_api::router::build_app_router;
use siteforge_api::state::AppState;
use siteforge_core::rate_limit::{FixedWindowLimiter, RateLimitConfig};
use siteforge_core::types::DbId;
use siteforge_db::models::project::{CreateProject, Project};
use siteforge_db::repositories::ProjectRepo;
use siteforge_media::ImageChain;
use siteforge_model::{ModelClient, ModelConfig};

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

pub const DOC: &str = "<!DOCTYPE html>\n<html><head></head><body>site</body></html>";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cron_secret: TEST_CRON_SECRET.to_string(),
        payment_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        site_base_domain: "siteforge.test".to_string(),
        fallback_image_url: "https://cdn.test/fallback.png".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    }
}

/// Build the application router with no external subsystems configured.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, None)
}

/// Build the application router, optionally with a content model client.
pub fn build_test_app_with(pool: PgPool, model: Option<ModelClient>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        limiter: Arc::new(FixedWindowLimiter::new(RateLimitConfig::default())),
        model: model.map(Arc::new),
        images: Arc::new(ImageChain::new(
            Vec::new(),
            config.fallback_image_url.clone(),
        )),
        storage: None,
        mailer: None,
    };
    build_app_router(state, &config)
}

/// A model client pointing at a closed port: every call fails fast with a
/// connection error, exercising the failure paths without a network.
pub fn unreachable_model() -> ModelClient {
    ModelClient::new(ModelConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        api_key: "test".to_string(),
        model: "test-model".to_string(),
        timeout_secs: 2,
    })
}

/// Mint a Bearer header for the given account.
pub fn bearer(user_id: DbId, email: &str) -> String {
    let token = generate_access_token(
        user_id,
        email,
        &JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
    )
    .expect("token generation");
    format!("Bearer {token}")
}

/// Insert a draft project owned by `owner_id`.
pub async fn create_project(pool: &PgPool, owner_id: DbId, initial_tokens: i64) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            owner_id,
            owner_email: format!("owner{owner_id}@example.com"),
            plan: "starter".to_string(),
            initial_tokens,
        },
    )
    .await
    .expect("project insert")
}

/// Drive a project through generation so it holds a document.
pub async fn generate_document(pool: &PgPool, project_id: DbId) -> Project {
    ProjectRepo::begin_generation(pool, project_id)
        .await
        .expect("begin generation")
        .expect("draft project");
    ProjectRepo::complete_generation(pool, project_id, DOC)
        .await
        .expect("complete generation")
        .expect("processing project")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send one request through the router.
pub async fn send(
    app: Router,
    method: Method,
    path: &str,
    auth: Option<&str>,
    json: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = match json {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).expect("request build"))
        .await
        .expect("infallible")
}

pub async fn get(app: Router, path: &str) -> Response {
    send(app, Method::GET, path, None, None).await
}

/// Decode the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// Read the response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is UTF-8")
}
