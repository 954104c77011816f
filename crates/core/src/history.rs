//! Append-only edit history and snapshot-based undo.
//!
//! Each AI edit attempt -- successful or not -- is recorded. Successful
//! attempts carry the full pre-edit document so they can be undone; failed
//! attempts are audit-only. The history is stored as an ordered JSONB array
//! on the project row so undo can mutate it and the document in one atomic
//! write.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Bounded history tail. Once exceeded, the oldest entries (and their
/// snapshots) are dropped, capping row growth at the cost of how far back
/// undo can reach.
pub const MAX_HISTORY_LEN: usize = 50;

/// One recorded edit attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAttempt {
    pub timestamp: Timestamp,
    /// The free-text instruction the owner submitted.
    pub request_text: String,
    pub succeeded: bool,
    /// Tokens debited for this attempt. Recorded on successes only, though
    /// failed attempts spend tokens too -- that spend is simply not refunded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_consumed: Option<i64>,
    /// Full document as it was before this edit applied. Only successes
    /// carry a snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_snapshot: Option<String>,
    /// Sanitized failure summary. Never the raw model error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
}

impl EditAttempt {
    /// Record a successful edit with its pre-edit snapshot.
    pub fn success(
        timestamp: Timestamp,
        request_text: String,
        tokens_consumed: i64,
        document_snapshot: String,
    ) -> Self {
        Self {
            timestamp,
            request_text,
            succeeded: true,
            tokens_consumed: Some(tokens_consumed),
            document_snapshot: Some(document_snapshot),
            error_summary: None,
        }
    }

    /// Record a failed edit. No snapshot: failed attempts cannot be undone
    /// past, and the tokens already debited are not returned.
    pub fn failure(timestamp: Timestamp, request_text: String, error_summary: String) -> Self {
        Self {
            timestamp,
            request_text,
            succeeded: false,
            tokens_consumed: None,
            document_snapshot: None,
            error_summary: Some(error_summary),
        }
    }
}

/// Append an attempt, dropping the oldest entries past [`MAX_HISTORY_LEN`].
pub fn push_capped(history: &mut Vec<EditAttempt>, attempt: EditAttempt) {
    history.push(attempt);
    if history.len() > MAX_HISTORY_LEN {
        let overflow = history.len() - MAX_HISTORY_LEN;
        history.drain(..overflow);
    }
}

/// Apply one undo step.
///
/// Finds the most recent successful attempt, returns its snapshot for
/// restoration, and truncates the history from that attempt onward -- so a
/// second undo lands on the next earlier success, never the same point
/// twice. Trailing failed attempts are dropped along with it.
pub fn undo(history: &mut Vec<EditAttempt>) -> Result<String, CoreError> {
    let index = history
        .iter()
        .rposition(|attempt| attempt.succeeded && attempt.document_snapshot.is_some())
        .ok_or_else(|| CoreError::Conflict("Nothing to undo".to_string()))?;

    let snapshot = history[index]
        .document_snapshot
        .take()
        .expect("checked above");
    history.truncate(index);
    Ok(snapshot)
}
