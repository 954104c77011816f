//! Media asset entity model (images in object storage).

use serde::Serialize;
use siteforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `media_assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaAsset {
    pub id: DbId,
    pub project_id: DbId,
    /// Object storage key, needed to delete the object with the row.
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: Timestamp,
}

/// Input for recording a stored object.
#[derive(Debug, Clone)]
pub struct CreateMediaAsset {
    pub project_id: DbId,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}
