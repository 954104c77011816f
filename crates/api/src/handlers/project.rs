//! Handlers for the `/projects` resource.
//!
//! Projects are created by the payment webhook when a checkout completes,
//! never directly through this resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use siteforge_core::types::DbId;
use siteforge_db::models::project::{EditAttemptView, Project, ProjectSummary};
use siteforge_db::repositories::ProjectRepo;

use crate::engine::owned_project;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /api/v1/projects
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProjectSummary>>> {
    let projects = ProjectRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = owned_project(&state.pool, id, &user).await?;
    Ok(Json(project))
}

/// GET /api/v1/projects/{id}/history
///
/// Edit attempts, oldest first, without snapshot bodies.
pub async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<EditAttemptView>>> {
    let project = owned_project(&state.pool, id, &user).await?;
    let entries = project
        .history()
        .map_err(|e| AppError::InternalError(format!("stored history is corrupt: {e}")))?;
    Ok(Json(entries.iter().map(EditAttemptView::from).collect()))
}

/// DELETE /api/v1/projects/{id}
///
/// Explicit owner deletion: immediate and permanent, dependent records
/// cascade away.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_project(&state.pool, id, &user).await?;
    ProjectRepo::hard_delete(&state.pool, id).await?;
    tracing::info!(project_id = id, user_id = user.user_id, "Project deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}
