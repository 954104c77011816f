//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use siteforge_core::content::BusinessContent;
use siteforge_core::history::EditAttempt;
use siteforge_core::status::{ProjectStatus, StatusId};
use siteforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
///
/// `document` and `edit_history` can be large; list endpoints serialize
/// [`ProjectSummary`] instead.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_email: String,
    pub plan: String,
    pub status_id: StatusId,
    pub prior_status_id: Option<StatusId>,
    pub structured_content: Option<serde_json::Value>,
    pub document: Option<String>,
    pub document_version: i32,
    pub generated_once: bool,
    pub token_balance: i64,
    /// Raw history array; large (snapshots), so omitted from responses.
    /// The history endpoint serves [`EditAttemptView`]s instead.
    #[serde(skip_serializing)]
    pub edit_history: serde_json::Value,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub domain_verified_at: Option<Timestamp>,
    pub published_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub sent_reminder_milestones: Vec<i32>,
    pub nurture_notified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Decode the stored status id. Stored values always come from
    /// [`ProjectStatus::id`], so an unknown id indicates a corrupt row.
    pub fn status(&self) -> ProjectStatus {
        ProjectStatus::from_id(self.status_id).unwrap_or(ProjectStatus::Draft)
    }

    /// Deserialize the structured content, if the form was ever submitted.
    pub fn content(&self) -> Result<Option<BusinessContent>, serde_json::Error> {
        self.structured_content
            .clone()
            .map(serde_json::from_value)
            .transpose()
    }

    /// Deserialize the edit history array.
    pub fn history(&self) -> Result<Vec<EditAttempt>, serde_json::Error> {
        serde_json::from_value(self.edit_history.clone())
    }
}

/// Input for creating a project when a checkout completes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub owner_id: DbId,
    pub owner_email: String,
    pub plan: String,
    pub initial_tokens: i64,
}

/// Compact projection for list endpoints: no document body, no history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub status_id: StatusId,
    pub plan: String,
    pub token_balance: i64,
    pub document_version: i32,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub published_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One edit-history entry as exposed over the API: the snapshot body is
/// withheld (it can be as large as the document itself).
#[derive(Debug, Clone, Serialize)]
pub struct EditAttemptView {
    pub timestamp: Timestamp,
    pub request_text: String,
    pub succeeded: bool,
    pub tokens_consumed: Option<i64>,
    pub error_summary: Option<String>,
}

impl From<&EditAttempt> for EditAttemptView {
    fn from(attempt: &EditAttempt) -> Self {
        Self {
            timestamp: attempt.timestamp,
            request_text: attempt.request_text.clone(),
            succeeded: attempt.succeeded,
            tokens_consumed: attempt.tokens_consumed,
            error_summary: attempt.error_summary.clone(),
        }
    }
}
