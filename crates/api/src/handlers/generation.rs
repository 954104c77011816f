//! Handler for first-time site generation.

use axum::extract::{Path, State};
use axum::Json;
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;

use crate::engine::orchestrator;
use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/generate
///
/// Blocks for up to the model deadline. Succeeds at most once per project;
/// later changes go through edits or the content form.
pub async fn generate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = orchestrator::generate_site(&state, &user, id).await?;
    Ok(Json(project))
}
