//! Invoice entity model (audit trail of consumed payment events).

use serde::Serialize;
use siteforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub project_id: DbId,
    /// `checkout.completed` or `token_purchase.completed`.
    pub event_type: String,
    /// The payment collaborator's event id, for reconciliation.
    pub external_reference: String,
    pub tokens_granted: i64,
    pub amount_cents: Option<i64>,
    pub created_at: Timestamp,
}

/// Input for recording a consumed payment event.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub project_id: DbId,
    pub event_type: String,
    pub external_reference: String,
    pub tokens_granted: i64,
    pub amount_cents: Option<i64>,
}
