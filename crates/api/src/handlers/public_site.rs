//! Public serving of published documents.

use axum::extract::{Path, State};
use axum::response::Html;
use siteforge_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/sites/{host}
///
/// Resolve a subdomain label or verified custom domain to the published
/// document. The edge proxy maps the request's Host header onto this
/// route; unpublished projects are simply not found.
pub async fn serve(
    State(state): State<AppState>,
    Path(host): Path<String>,
) -> AppResult<Html<String>> {
    let host = host.trim().to_ascii_lowercase();
    let project = ProjectRepo::find_by_host(&state.pool, &host)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    let document = project.document.ok_or_else(|| {
        AppError::InternalError("published project has no document".into())
    })?;
    Ok(Html(document))
}
