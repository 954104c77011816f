//! Route definitions, one module per top-level resource.

pub mod cron;
pub mod health;
pub mod project;
pub mod sites;
pub mod trial;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects/...                  authenticated authoring + publishing
/// /trial/generate                unauthenticated, IP rate limited
/// /webhooks/payment              payment collaborator (HMAC signed)
/// /cron/...                      periodic trigger (shared secret)
/// /sites/{host}                  public published documents
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/trial", trial::router())
        .nest("/webhooks", webhooks::router())
        .nest("/cron", cron::router())
        .nest("/sites", sites::router())
}
