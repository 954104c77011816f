//! The generation orchestrator and the time-driven lifecycle automatons.

pub mod lifecycle;
pub mod orchestrator;

use siteforge_core::error::CoreError;
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;
use siteforge_db::repositories::ProjectRepo;
use siteforge_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Load a project and verify the caller owns it.
///
/// Missing projects are 404; a project owned by someone else is 403 --
/// existence is not hidden, authorship is enforced.
pub async fn owned_project(pool: &DbPool, id: DbId, user: &AuthUser) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    if project.owner_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this project".into(),
        )));
    }
    Ok(project)
}
