//! Unauthenticated trial generation.

use axum::extract::State;
use axum::Json;
use serde_json::json;
use siteforge_core::content::BusinessContent;

use crate::engine::orchestrator;
use crate::error::AppResult;
use crate::middleware::ClientIp;
use crate::state::AppState;

/// POST /api/v1/trial/generate
///
/// One-shot document generation from submitted business facts. Nothing is
/// persisted; the caller address is tightly rate limited since this is the
/// cheapest endpoint to abuse.
pub async fn generate(
    ClientIp(ip): ClientIp,
    State(state): State<AppState>,
    Json(content): Json<BusinessContent>,
) -> AppResult<Json<serde_json::Value>> {
    let document = orchestrator::trial_generate(&state, &ip, content).await?;
    Ok(Json(json!({ "document": document })))
}
