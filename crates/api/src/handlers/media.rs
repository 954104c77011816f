//! Handlers for owner media uploads.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use siteforge_core::error::CoreError;
use siteforge_core::types::DbId;
use siteforge_db::models::media_asset::{CreateMediaAsset, MediaAsset};
use siteforge_db::repositories::MediaAssetRepo;
use siteforge_media::image_dimensions;

use crate::engine::owned_project;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Upload size ceiling: 5 MiB.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for upload, with their storage extension.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

/// POST /api/v1/projects/{id}/media  (multipart, field `file`)
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<MediaAsset>)> {
    let storage = state
        .storage
        .clone()
        .ok_or(AppError::Core(CoreError::NotConfigured("Object storage")))?;
    owned_project(&state.pool, id, &user).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .ok_or_else(|| AppError::BadRequest("file field needs a content type".into()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read upload: {e}")))?;
        upload = Some((content_type, bytes.to_vec()));
        break;
    }

    let Some((content_type, bytes)) = upload else {
        return Err(AppError::BadRequest("Missing multipart field: file".into()));
    };

    let extension = ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Only PNG, JPEG, and WebP images can be uploaded".into(),
            ))
        })?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Core(CoreError::Validation(
            "Uploads are limited to 5 MiB".into(),
        )));
    }

    let dimensions = image_dimensions(&bytes);
    let key = format!("projects/{id}/uploads/{}.{extension}", uuid::Uuid::new_v4());
    let url = storage
        .put(&key, bytes, &content_type)
        .await
        .map_err(|e| AppError::InternalError(format!("upload storage failed: {e}")))?;

    let asset = MediaAssetRepo::create(
        &state.pool,
        &CreateMediaAsset {
            project_id: id,
            storage_key: key,
            url,
            content_type,
            width: dimensions.map(|(w, _)| w as i32),
            height: dimensions.map(|(_, h)| h as i32),
        },
    )
    .await?;

    tracing::info!(project_id = id, asset_id = asset.id, "Media uploaded");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/v1/projects/{id}/media
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MediaAsset>>> {
    owned_project(&state.pool, id, &user).await?;
    let assets = MediaAssetRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(assets))
}

/// DELETE /api/v1/projects/{id}/media/{asset_id}
///
/// Removes the stored object, then the row. A storage failure is logged
/// and does not keep the row alive.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, asset_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_project(&state.pool, id, &user).await?;

    let asset = MediaAssetRepo::find_by_id(&state.pool, asset_id)
        .await?
        .filter(|asset| asset.project_id == id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Media asset",
            id: asset_id,
        }))?;

    if let Some(storage) = &state.storage {
        if let Err(e) = storage.delete(&asset.storage_key).await {
            tracing::warn!(asset_id, error = %e, "Stored object removal failed");
        }
    }
    MediaAssetRepo::delete(&state.pool, asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
