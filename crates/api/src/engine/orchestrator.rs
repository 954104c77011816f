//! Generation orchestrator: create, paid edit, and surgical update.
//!
//! Each operation is a protocol over the external content model with the
//! same skeleton -- guard, call, sanitize, validate, commit -- and the same
//! promise: a failed attempt leaves `status` and `document` exactly as they
//! were. At most one visible mutation per attempt.

use chrono::Utc;

use siteforge_core::content::BusinessContent;
use siteforge_core::content_diff::diff_content;
use siteforge_core::document::{strip_code_fences, validate_document};
use siteforge_core::error::CoreError;
use siteforge_core::history::EditAttempt;
use siteforge_core::rate_limit::OperationClass;
use siteforge_core::status::ProjectStatus;
use siteforge_core::tokens::{DebitOutcome, EDIT_TOKEN_COST};
use siteforge_core::types::DbId;
use siteforge_db::models::project::Project;
use siteforge_db::repositories::ProjectRepo;
use siteforge_media::{AspectRatio, ImageQuery};
use siteforge_model::prompt;
use siteforge_model::{ModelClient, ModelError};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::owned_project;

/// Upper bound on a free-text edit request.
const MAX_REQUEST_TEXT_LEN: usize = 1000;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Generate the project's site for the first (and only automatic) time.
///
/// `Draft -> Processing -> Generated` on success; any failure reverts to
/// `Draft` with the document untouched. A project whose status is not
/// `Draft` is rejected outright -- repeat changes go through edits.
pub async fn generate_site(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
) -> AppResult<Project> {
    state
        .limiter
        .check(&user.user_id.to_string(), OperationClass::SiteGeneration)?;
    let model = require_model(state)?;

    let project = owned_project(&state.pool, project_id, user).await?;
    let content = stored_content(&project)?.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Submit your business details before generating".into(),
        ))
    })?;
    content.validate_all()?;

    // Single winner: the compare-and-swap admits exactly one request into
    // Processing, and only for a project that has never generated.
    if ProjectRepo::begin_generation(&state.pool, project_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "This project has already generated its site; use edits to change it".into(),
        )));
    }

    let hero_url = state.images.resolve(&image_query(&content)).await;
    let user_prompt = prompt::create_site(&content, Some(&hero_url));

    let raw = match model.complete(prompt::SYSTEM_PROMPT, &user_prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            revert_generation(state, project_id).await;
            return Err(model_error(project_id, e));
        }
    };

    let document = strip_code_fences(&raw);
    if let Err(e) = validate_document(&document) {
        revert_generation(state, project_id).await;
        return Err(e.into());
    }

    let completed = match ProjectRepo::complete_generation(&state.pool, project_id, &document).await
    {
        Ok(completed) => completed,
        Err(e) => {
            revert_generation(state, project_id).await;
            return Err(e.into());
        }
    };
    let project = completed.ok_or_else(|| {
        AppError::InternalError(format!(
            "project {project_id} left Processing while generation was in flight"
        ))
    })?;

    tracing::info!(
        project_id,
        document_version = project.document_version,
        "Site generated"
    );
    Ok(project)
}

// ---------------------------------------------------------------------------
// Paid edit
// ---------------------------------------------------------------------------

/// Apply a free-text edit to the generated document.
///
/// Tokens are debited before the model is called and are not refunded if
/// the edit fails -- the failed attempt is recorded for audit instead.
pub async fn apply_edit(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
    request_text: &str,
) -> AppResult<Project> {
    state
        .limiter
        .check(&user.user_id.to_string(), OperationClass::AiEdit)?;
    let model = require_model(state)?;

    let project = owned_project(&state.pool, project_id, user).await?;
    if !project.status().has_document() {
        return Err(AppError::Core(CoreError::Conflict(
            "Generate the site before requesting edits".into(),
        )));
    }

    let request_text = request_text.trim();
    if request_text.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Describe the change you want".into(),
        )));
    }
    if request_text.len() > MAX_REQUEST_TEXT_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Edit requests are limited to {MAX_REQUEST_TEXT_LEN} characters"
        ))));
    }

    let current_document = project
        .document
        .clone()
        .ok_or_else(|| AppError::InternalError("generated project has no document".into()))?;

    // Check-and-debit is one atomic step; on insufficient funds no model
    // call is made and nothing is recorded.
    match ProjectRepo::debit_tokens(&state.pool, project_id, EDIT_TOKEN_COST).await? {
        DebitOutcome::Applied { remaining } => {
            tracing::debug!(project_id, remaining, "Edit tokens debited");
        }
        DebitOutcome::Insufficient { required, balance } => {
            return Err(AppError::Core(CoreError::InsufficientTokens {
                required,
                balance,
            }));
        }
    }

    let user_prompt = prompt::edit_site(&current_document, request_text);
    let raw = match model.complete(prompt::SYSTEM_PROMPT, &user_prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            record_failure(state, project_id, request_text, failure_summary(&e)).await;
            return Err(model_error(project_id, e));
        }
    };

    let new_document = strip_code_fences(&raw);
    if let Err(e) = validate_document(&new_document) {
        record_failure(
            state,
            project_id,
            request_text,
            "the model returned something that was not a website".into(),
        )
        .await;
        return Err(e.into());
    }

    let attempt = EditAttempt::success(
        Utc::now(),
        request_text.to_string(),
        EDIT_TOKEN_COST,
        current_document,
    );
    let updated = ProjectRepo::apply_successful_edit(&state.pool, project_id, &new_document, attempt)
        .await?
        .ok_or_else(|| AppError::InternalError("project vanished mid-edit".into()))?;

    tracing::info!(
        project_id,
        document_version = updated.document_version,
        "Edit applied"
    );
    Ok(updated)
}

/// Restore the document to the snapshot of the most recent successful
/// edit. Never refunds tokens, never changes status.
pub async fn undo_edit(state: &AppState, user: &AuthUser, project_id: DbId) -> AppResult<Project> {
    owned_project(&state.pool, project_id, user).await?;

    ProjectRepo::undo_last_edit(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Nothing to undo".into())))
}

// ---------------------------------------------------------------------------
// Surgical update
// ---------------------------------------------------------------------------

/// Apply a structured-content form submission.
///
/// Before generation this just stores the facts. Afterwards, the stored and
/// submitted versions are diffed; with zero differences this is a no-op
/// success (no model call, `document_version` unchanged). Otherwise the
/// model is instructed to apply exactly the changed fields, preserving
/// manual edits.
pub async fn surgical_update(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
    content: BusinessContent,
) -> AppResult<Project> {
    content.validate_all()?;
    let project = owned_project(&state.pool, project_id, user).await?;
    if project.status() == ProjectStatus::Cancelled {
        return Err(AppError::Core(CoreError::Conflict(
            "Reactivate the subscription before editing this project".into(),
        )));
    }

    let content_json = serde_json::to_value(&content)
        .map_err(|e| AppError::InternalError(format!("content serialization failed: {e}")))?;

    if !project.status().has_document() {
        let updated = ProjectRepo::set_structured_content(&state.pool, project_id, &content_json)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }))?;
        return Ok(updated);
    }

    let previous = stored_content(&project)?;
    let changes = match &previous {
        Some(previous) => diff_content(previous, &content),
        // A generated project always has stored content; tolerate a gap by
        // treating the submission as a plain store.
        None => {
            tracing::warn!(project_id, "Generated project had no stored content");
            Vec::new()
        }
    };

    if changes.is_empty() {
        tracing::debug!(project_id, "Surgical update with no field changes, skipping model");
        return Ok(project);
    }

    let model = require_model(state)?;
    let current_document = project
        .document
        .clone()
        .ok_or_else(|| AppError::InternalError("generated project has no document".into()))?;

    // Nothing has been mutated yet, so a failure here needs no revert.
    let user_prompt = prompt::surgical_update(&current_document, &changes);
    let raw = model
        .complete(prompt::SYSTEM_PROMPT, &user_prompt)
        .await
        .map_err(|e| model_error(project_id, e))?;

    let new_document = strip_code_fences(&raw);
    validate_document(&new_document)?;

    let updated =
        ProjectRepo::apply_surgical_update(&state.pool, project_id, &new_document, &content_json)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "The project is no longer editable".into(),
                ))
            })?;

    tracing::info!(
        project_id,
        changed_fields = changes.len(),
        document_version = updated.document_version,
        "Surgical update applied"
    );
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Trial
// ---------------------------------------------------------------------------

/// Unauthenticated one-shot generation: nothing is persisted, the caller
/// address is rate limited instead of an account.
pub async fn trial_generate(
    state: &AppState,
    client_ip: &str,
    content: BusinessContent,
) -> AppResult<String> {
    state
        .limiter
        .check(client_ip, OperationClass::TrialGeneration)?;
    content.validate_all()?;
    let model = require_model(state)?;

    let hero_url = state.images.resolve(&image_query(&content)).await;
    let user_prompt = prompt::create_site(&content, Some(&hero_url));
    let raw = model
        .complete(prompt::SYSTEM_PROMPT, &user_prompt)
        .await
        .map_err(|e| {
            tracing::warn!(client_ip, "Trial generation failed");
            trial_model_error(e)
        })?;

    let document = strip_code_fences(&raw);
    validate_document(&document)?;
    Ok(document)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn require_model(state: &AppState) -> AppResult<std::sync::Arc<ModelClient>> {
    state
        .model
        .clone()
        .ok_or_else(|| AppError::Core(CoreError::NotConfigured("Content generation")))
}

fn stored_content(project: &Project) -> AppResult<Option<BusinessContent>> {
    project
        .content()
        .map_err(|e| AppError::InternalError(format!("stored content is corrupt: {e}")))
}

/// Derive the image search/generation query from the business facts.
fn image_query(content: &BusinessContent) -> ImageQuery {
    let subject = match &content.industry {
        Some(industry) => format!("{industry} business"),
        None => content.business_name.clone(),
    };
    ImageQuery {
        subject,
        style: content
            .primary_color
            .as_ref()
            .map(|color| format!("accent color {color}")),
        aspect_ratio: AspectRatio::Landscape,
    }
}

/// Best-effort revert of `Processing -> Draft`; a project must never be
/// left in `Processing` after a failed attempt.
async fn revert_generation(state: &AppState, project_id: DbId) {
    match ProjectRepo::fail_generation(&state.pool, project_id).await {
        Ok(true) => tracing::info!(project_id, "Generation reverted to draft"),
        Ok(false) => tracing::warn!(project_id, "Generation revert found no processing row"),
        Err(e) => tracing::error!(project_id, error = %e, "Generation revert failed"),
    }
}

/// Record a failed, non-refunded edit attempt. Failures here are logged
/// and swallowed: the caller is already returning the primary error.
async fn record_failure(state: &AppState, project_id: DbId, request_text: &str, summary: String) {
    let attempt = EditAttempt::failure(Utc::now(), request_text.to_string(), summary);
    if let Err(e) = ProjectRepo::record_failed_attempt(&state.pool, project_id, attempt).await {
        tracing::error!(project_id, error = %e, "Could not record failed edit attempt");
    }
}

/// User-safe summary for the audit record; never the raw provider text.
fn failure_summary(error: &ModelError) -> String {
    match error {
        ModelError::Timeout { secs } => format!("the request timed out after {secs}s"),
        ModelError::Empty => "the model returned an empty result".to_string(),
        ModelError::Api { .. } | ModelError::Request(_) => {
            "the generation service was unavailable".to_string()
        }
    }
}

/// Map a model failure to a domain error, logging the raw detail here and
/// keeping it out of the response.
fn model_error(project_id: DbId, error: ModelError) -> AppError {
    match error {
        ModelError::Timeout { secs } => AppError::Core(CoreError::Timeout { secs }),
        ModelError::Empty => {
            AppError::Core(CoreError::InvalidOutput("empty completion".to_string()))
        }
        ModelError::Api { status, body } => {
            tracing::error!(project_id, status, body = %body, "Content model API error");
            AppError::Core(CoreError::Internal(
                "content model returned an error".to_string(),
            ))
        }
        ModelError::Request(e) => {
            tracing::error!(project_id, error = %e, "Content model request failed");
            AppError::Core(CoreError::Internal(
                "content model request failed".to_string(),
            ))
        }
    }
}

fn trial_model_error(error: ModelError) -> AppError {
    // Trials have no project id to log against.
    model_error(0, error)
}
