use crate::types::DbId;

/// Domain-level error type shared across the engine.
///
/// Every variant maps to a distinct, user-visible failure kind. Variants
/// other than `NotConfigured`, `Unauthorized`, `Forbidden`, and `Validation`
/// are retryable by the caller with the same or adjusted input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A required external subsystem (content model, object storage, SMTP)
    /// is not configured. Fails fast with no partial state change.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The token ledger rejected a debit. Carries the amount the operation
    /// required and the balance that remains, for display.
    #[error("Insufficient tokens: {required} required, {balance} available")]
    InsufficientTokens { required: i64, balance: i64 },

    /// The rate limiter rejected the request for this window.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// An external call exceeded its wall-clock deadline.
    #[error("External call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The content model returned something that is not a document.
    #[error("Model returned invalid output: {0}")]
    InvalidOutput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
