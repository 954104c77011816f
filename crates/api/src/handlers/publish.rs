//! Handlers for publishing, unpublishing, and domains.

use axum::extract::{Path, State};
use axum::Json;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use siteforge_core::error::CoreError;
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;
use siteforge_db::repositories::ProjectRepo;

use crate::engine::owned_project;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Body for `POST /projects/{id}/publish`.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    /// Requested subdomain label; generated from the business name when
    /// absent. Ignored if the project already holds a subdomain.
    pub subdomain: Option<String>,
}

/// Body for `POST /projects/{id}/domain`.
#[derive(Debug, Deserialize)]
pub struct DomainRequest {
    pub custom_domain: String,
}

/// POST /api/v1/projects/{id}/publish
///
/// `Generated -> Published`. Publishing an already-published project is
/// rejected; use republish after content changes.
pub async fn publish(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PublishRequest>,
) -> AppResult<Json<Project>> {
    let project = owned_project(&state.pool, id, &user).await?;

    let subdomain = match input.subdomain {
        Some(requested) => validate_subdomain(&requested)?,
        None => derive_subdomain(&project)?,
    };

    let published = ProjectRepo::publish(&state.pool, id, &subdomain)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Only a generated, unpublished project can be published".into(),
            ))
        })?;

    tracing::info!(
        project_id = id,
        subdomain = %published.subdomain.as_deref().unwrap_or_default(),
        base_domain = %state.config.site_base_domain,
        "Project published"
    );
    Ok(Json(published))
}

/// POST /api/v1/projects/{id}/unpublish
pub async fn unpublish(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    owned_project(&state.pool, id, &user).await?;
    let project = ProjectRepo::unpublish(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict("The project is not published".into()))
    })?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/republish
///
/// Always allowed on a published project; only refreshes `published_at`.
pub async fn republish(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    owned_project(&state.pool, id, &user).await?;
    let project = ProjectRepo::republish(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict("The project is not published".into()))
    })?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/domain
///
/// Attach a custom domain. Provisioning and DNS verification are the
/// domain collaborator's job; until it confirms, the project stays
/// `Published`.
pub async fn set_domain(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DomainRequest>,
) -> AppResult<Json<Project>> {
    owned_project(&state.pool, id, &user).await?;

    let domain = input.custom_domain.trim().to_ascii_lowercase();
    if domain.is_empty() || !domain.contains('.') || domain.len() > 253 {
        return Err(AppError::Core(CoreError::Validation(
            "custom_domain must be a valid domain name".into(),
        )));
    }

    let project = ProjectRepo::set_custom_domain(&state.pool, id, &domain)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/domain/verified
///
/// Callback once the domain collaborator confirms DNS. `Published -> Live`;
/// a display-only refinement, editability is unchanged.
pub async fn domain_verified(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    owned_project(&state.pool, id, &user).await?;
    let project = ProjectRepo::mark_domain_verified(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The project must be published with a custom domain attached".into(),
            ))
        })?;
    Ok(Json(project))
}

// ---------------------------------------------------------------------------
// Subdomain helpers
// ---------------------------------------------------------------------------

/// Validate an owner-requested subdomain label.
fn validate_subdomain(requested: &str) -> AppResult<String> {
    let label = requested.trim().to_ascii_lowercase();
    let valid = (3..=63).contains(&label.len())
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !label.starts_with('-')
        && !label.ends_with('-');
    if valid {
        Ok(label)
    } else {
        Err(AppError::Core(CoreError::Validation(
            "subdomain must be 3-63 characters of letters, digits, and dashes".into(),
        )))
    }
}

/// Derive a subdomain from the business name plus a short random suffix to
/// dodge collisions.
fn derive_subdomain(project: &Project) -> AppResult<String> {
    let name = project
        .content()
        .ok()
        .flatten()
        .map(|content| content.business_name)
        .unwrap_or_else(|| format!("site-{}", project.id));

    let mut slug: String = name
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    let slug = slug.trim_matches('-');
    let slug = &slug[..slug.len().min(40)];

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_ascii_lowercase();

    if slug.len() < 3 {
        Ok(format!("site-{}-{suffix}", project.id))
    } else {
        Ok(format!("{slug}-{suffix}"))
    }
}
