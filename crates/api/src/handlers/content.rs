//! Handler for structured-content form submission (surgical update path).

use axum::extract::{Path, State};
use axum::Json;
use siteforge_core::content::BusinessContent;
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;

use crate::engine::orchestrator;
use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// PUT /api/v1/projects/{id}/content
///
/// Before generation this stores the business facts. Afterwards it diffs
/// against the stored version and applies only the changed fields to the
/// document; an unchanged submission is a no-op that never calls the model.
pub async fn put_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(content): Json<BusinessContent>,
) -> AppResult<Json<Project>> {
    let project = orchestrator::surgical_update(&state, &user, id, content).await?;
    Ok(Json(project))
}
