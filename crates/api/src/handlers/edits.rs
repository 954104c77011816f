//! Handlers for paid AI edits and undo.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;

use crate::engine::orchestrator;
use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Body for `POST /projects/{id}/edits`.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub request_text: String,
}

/// POST /api/v1/projects/{id}/edits
///
/// Debits the fixed per-edit token price up front; a failed edit is
/// recorded but not refunded.
pub async fn edit(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EditRequest>,
) -> AppResult<Json<Project>> {
    let project = orchestrator::apply_edit(&state, &user, id, &input.request_text).await?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/undo
///
/// Restores the snapshot of the most recent successful edit. Tokens are
/// not refunded and status does not change.
pub async fn undo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = orchestrator::undo_edit(&state, &user, id).await?;
    Ok(Json(project))
}
