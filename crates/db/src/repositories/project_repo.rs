//! Repository for the `projects` table.
//!
//! Every status mutation is a conditional UPDATE whose WHERE clause
//! restates the legal source states, so two concurrent requests cannot
//! both pass a check against a stale row. Token debits follow the same
//! pattern against the balance.

use sqlx::PgPool;

use siteforge_core::history::{self, EditAttempt};
use siteforge_core::status::ProjectStatus;
use siteforge_core::tokens::DebitOutcome;
use siteforge_core::types::DbId;

use crate::models::project::{CreateProject, Project, ProjectSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, owner_id, owner_email, plan, status_id, prior_status_id, \
    structured_content, document, document_version, generated_once, \
    token_balance, edit_history, subdomain, custom_domain, \
    domain_verified_at, published_at, cancelled_at, \
    sent_reminder_milestones, nurture_notified_at, created_at, updated_at";

/// Column list for the compact list projection.
const SUMMARY_COLUMNS: &str = "\
    id, status_id, plan, token_balance, document_version, subdomain, \
    custom_domain, published_at, cancelled_at, created_at, updated_at";

/// Provides persistence operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    // -----------------------------------------------------------------
    // Creation and lookup
    // -----------------------------------------------------------------

    /// Insert a new `Draft` project with its initial token grant.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, owner_email, plan, token_balance)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.owner_id)
            .bind(&input.owner_email)
            .bind(&input.plan)
            .bind(input.initial_tokens)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's projects, most recent first, without large columns.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM projects
             WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ProjectSummary>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve a published project by subdomain or verified custom domain.
    pub async fn find_by_host(pool: &PgPool, host: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE (subdomain = $1 OR custom_domain = $1) AND status_id IN ($2, $3)"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(host)
            .bind(ProjectStatus::Published.id())
            .bind(ProjectStatus::Live.id())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------
    // Structured content
    // -----------------------------------------------------------------

    /// Replace the stored structured content (form submission).
    pub async fn set_structured_content(
        pool: &PgPool,
        id: DbId,
        content: &serde_json::Value,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET structured_content = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------
    // Generation (create path)
    // -----------------------------------------------------------------

    /// Atomically move `Draft -> Processing` for a project that has never
    /// generated. Returns `None` when the guard fails -- some other request
    /// already started (or finished) generation.
    pub async fn begin_generation(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3 AND generated_once = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Processing.id())
            .bind(ProjectStatus::Draft.id())
            .fetch_optional(pool)
            .await
    }

    /// Store the generated document and move `Processing -> Generated`,
    /// bumping the document version and latching the one-time flag.
    pub async fn complete_generation(
        pool: &PgPool,
        id: DbId,
        document: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET document = $2,
                 document_version = document_version + 1,
                 generated_once = TRUE,
                 status_id = $3,
                 updated_at = NOW()
             WHERE id = $1 AND status_id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(document)
            .bind(ProjectStatus::Generated.id())
            .bind(ProjectStatus::Processing.id())
            .fetch_optional(pool)
            .await
    }

    /// Revert `Processing -> Draft` after a failed generation. The document
    /// column is untouched (it was never written for a failed attempt).
    pub async fn fail_generation(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ProjectStatus::Draft.id())
        .bind(ProjectStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------
    // Token ledger
    // -----------------------------------------------------------------

    /// Debit `amount` tokens if the balance allows, as one atomic
    /// check-and-decrement. Two concurrent debits can never both pass the
    /// sufficiency check against a stale balance.
    pub async fn debit_tokens(
        pool: &PgPool,
        id: DbId,
        amount: i64,
    ) -> Result<DebitOutcome, sqlx::Error> {
        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE projects
             SET token_balance = token_balance - $2, updated_at = NOW()
             WHERE id = $1 AND token_balance >= $2
             RETURNING token_balance",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(pool)
        .await?;

        match remaining {
            Some(remaining) => Ok(DebitOutcome::Applied { remaining }),
            None => {
                // Distinguish "missing project" from "insufficient funds".
                let balance: i64 =
                    sqlx::query_scalar("SELECT token_balance FROM projects WHERE id = $1")
                        .bind(id)
                        .fetch_one(pool)
                        .await?;
                Ok(DebitOutcome::Insufficient {
                    required: amount,
                    balance,
                })
            }
        }
    }

    /// Credit `amount` tokens, returning the new balance.
    pub async fn credit_tokens(pool: &PgPool, id: DbId, amount: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE projects
             SET token_balance = token_balance + $2, updated_at = NOW()
             WHERE id = $1
             RETURNING token_balance",
        )
        .bind(id)
        .bind(amount)
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------
    // Edit history
    // -----------------------------------------------------------------

    /// Apply a successful AI edit: replace the document, bump the version,
    /// and append the attempt record, all under the project row lock.
    pub async fn apply_successful_edit(
        pool: &PgPool,
        id: DbId,
        new_document: &str,
        attempt: EditAttempt,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked = Self::lock_row(&mut tx, id).await?;
        let Some(project) = locked else {
            return Ok(None);
        };

        let mut entries = project.history().map_err(decode_err)?;
        history::push_capped(&mut entries, attempt);
        let history_json = serde_json::to_value(&entries).map_err(decode_err)?;

        let query = format!(
            "UPDATE projects
             SET document = $2,
                 document_version = document_version + 1,
                 edit_history = $3,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(new_document)
            .bind(&history_json)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Record a failed AI edit attempt. The document and version are left
    /// exactly as they were; the attempt is audit-only.
    pub async fn record_failed_attempt(
        pool: &PgPool,
        id: DbId,
        attempt: EditAttempt,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(project) = Self::lock_row(&mut tx, id).await? else {
            return Ok(());
        };

        let mut entries = project.history().map_err(decode_err)?;
        history::push_capped(&mut entries, attempt);
        let history_json = serde_json::to_value(&entries).map_err(decode_err)?;

        sqlx::query("UPDATE projects SET edit_history = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&history_json)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Undo the most recent successful edit: restore its snapshot as the
    /// document and truncate the history from that record onward.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. Status and token
    /// balance are untouched.
    pub async fn undo_last_edit(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(project) = Self::lock_row(&mut tx, id).await? else {
            return Err(sqlx::Error::RowNotFound);
        };

        let mut entries = project.history().map_err(decode_err)?;
        let Ok(snapshot) = history::undo(&mut entries) else {
            return Ok(None);
        };
        let history_json = serde_json::to_value(&entries).map_err(decode_err)?;

        let query = format!(
            "UPDATE projects
             SET document = $2,
                 document_version = document_version + 1,
                 edit_history = $3,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&snapshot)
            .bind(&history_json)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Apply a surgical update: store the new structured content and the
    /// minimally edited document together, bumping the version. Guarded on
    /// a document being present.
    pub async fn apply_surgical_update(
        pool: &PgPool,
        id: DbId,
        document: &str,
        content: &serde_json::Value,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET document = $2,
                 structured_content = $3,
                 document_version = document_version + 1,
                 updated_at = NOW()
             WHERE id = $1 AND status_id IN ($4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(document)
            .bind(content)
            .bind(ProjectStatus::Generated.id())
            .bind(ProjectStatus::Published.id())
            .bind(ProjectStatus::Live.id())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------
    // Publishing
    // -----------------------------------------------------------------

    /// Move `Generated -> Published`, assigning the subdomain on first
    /// publish. Publishing an already-published project fails the guard.
    pub async fn publish(
        pool: &PgPool,
        id: DbId,
        subdomain: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET status_id = $2,
                 subdomain = COALESCE(subdomain, $3),
                 published_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1 AND status_id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Published.id())
            .bind(subdomain)
            .bind(ProjectStatus::Generated.id())
            .fetch_optional(pool)
            .await
    }

    /// Move `Published/Live -> Generated`, taking the site offline.
    pub async fn unpublish(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET status_id = $2, published_at = NULL, updated_at = NOW()
             WHERE id = $1 AND status_id IN ($3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Generated.id())
            .bind(ProjectStatus::Published.id())
            .bind(ProjectStatus::Live.id())
            .fetch_optional(pool)
            .await
    }

    /// Refresh `published_at` on an already-published project. Always
    /// allowed after a content change; only the timestamp moves.
    pub async fn republish(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET published_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status_id IN ($2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Published.id())
            .bind(ProjectStatus::Live.id())
            .fetch_optional(pool)
            .await
    }

    /// Attach a custom domain (not yet verified).
    pub async fn set_custom_domain(
        pool: &PgPool,
        id: DbId,
        domain: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET custom_domain = $2, domain_verified_at = NULL, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(domain)
            .fetch_optional(pool)
            .await
    }

    /// Record domain verification and move `Published -> Live`. A
    /// display-only refinement; editability does not change.
    pub async fn mark_domain_verified(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET domain_verified_at = NOW(), status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3 AND custom_domain IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Live.id())
            .bind(ProjectStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------
    // Cancellation lifecycle
    // -----------------------------------------------------------------

    /// Cancel the project's subscription: remember the current status for
    /// reactivation, stamp `cancelled_at`, move to `Cancelled`.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET prior_status_id = status_id,
                 status_id = $2,
                 cancelled_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1 AND status_id IN ($3, $4, $5, $6) AND cancelled_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Cancelled.id())
            .bind(ProjectStatus::Draft.id())
            .bind(ProjectStatus::Generated.id())
            .bind(ProjectStatus::Published.id())
            .bind(ProjectStatus::Live.id())
            .fetch_optional(pool)
            .await
    }

    /// Reactivate a cancelled project: restore the pre-cancellation status
    /// and clear `cancelled_at` and the reminder-milestone set together.
    pub async fn reactivate(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects
             SET status_id = COALESCE(prior_status_id, $2),
                 prior_status_id = NULL,
                 cancelled_at = NULL,
                 sent_reminder_milestones = '{{}}',
                 updated_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(ProjectStatus::Draft.id())
            .bind(ProjectStatus::Cancelled.id())
            .fetch_optional(pool)
            .await
    }

    /// All projects currently in their cancellation grace period.
    pub async fn list_cancelled(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE cancelled_at IS NOT NULL ORDER BY cancelled_at ASC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Mark one reminder milestone as sent. Returns `false` if it was
    /// already marked -- the caller must then skip the notification, which
    /// makes the automaton idempotent per milestone even across
    /// concurrent runs.
    pub async fn mark_milestone_sent(
        pool: &PgPool,
        id: DbId,
        day: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects
             SET sent_reminder_milestones = array_append(sent_reminder_milestones, $2),
                 updated_at = NOW()
             WHERE id = $1 AND NOT ($2 = ANY(sent_reminder_milestones))",
        )
        .bind(id)
        .bind(day)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------
    // Nurture job
    // -----------------------------------------------------------------

    /// Draft projects older than `cutoff` that never generated and were
    /// never nudged.
    pub async fn list_stale_drafts(
        pool: &PgPool,
        cutoff: siteforge_core::types::Timestamp,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE status_id = $1
               AND generated_once = FALSE
               AND nurture_notified_at IS NULL
               AND cancelled_at IS NULL
               AND created_at <= $2
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(ProjectStatus::Draft.id())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Latch the nurture reminder so it is sent at most once.
    pub async fn mark_nurture_notified(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET nurture_notified_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND nurture_notified_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------

    /// Permanently delete a project. Dependent media assets and invoices
    /// cascade away with it. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------

    /// Fetch the row `FOR UPDATE` inside an open transaction.
    async fn lock_row(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}

/// Map a JSON (de)serialization failure on a stored column to a sqlx
/// decode error, keeping repository signatures uniform.
fn decode_err(e: serde_json::Error) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}
