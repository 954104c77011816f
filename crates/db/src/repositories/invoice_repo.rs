//! Repository for the `invoices` table.

use sqlx::PgPool;

use siteforge_core::types::DbId;

use crate::models::invoice::{CreateInvoice, Invoice};

/// Column list shared across queries.
const COLUMNS: &str = "\
    id, project_id, event_type, external_reference, tokens_granted, \
    amount_cents, created_at";

/// Provides persistence operations for consumed payment events.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Record a consumed payment event.
    pub async fn create(pool: &PgPool, input: &CreateInvoice) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices
                 (project_id, event_type, external_reference, tokens_granted, amount_cents)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(input.project_id)
            .bind(&input.event_type)
            .bind(&input.external_reference)
            .bind(input.tokens_granted)
            .bind(input.amount_cents)
            .fetch_one(pool)
            .await
    }

    /// List a project's billing events, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE project_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
