//! Repository for the `media_assets` table.

use sqlx::PgPool;

use siteforge_core::types::DbId;

use crate::models::media_asset::{CreateMediaAsset, MediaAsset};

/// Column list shared across queries.
const COLUMNS: &str =
    "id, project_id, storage_key, url, content_type, width, height, created_at";

/// Provides persistence operations for stored media objects.
pub struct MediaAssetRepo;

impl MediaAssetRepo {
    /// Record a stored object.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMediaAsset,
    ) -> Result<MediaAsset, sqlx::Error> {
        let query = format!(
            "INSERT INTO media_assets (project_id, storage_key, url, content_type, width, height)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MediaAsset>(&query)
            .bind(input.project_id)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(&input.content_type)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MediaAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_assets WHERE id = $1");
        sqlx::query_as::<_, MediaAsset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's assets, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MediaAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM media_assets
             WHERE project_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, MediaAsset>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an asset row. The caller is responsible for removing the
    /// stored object first.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
