//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lifecycle transitions are
//! conditional UPDATEs (compare-and-swap on `status_id`) so concurrent
//! requests cannot race a stale status; edit-history mutations run in a
//! transaction holding the project row lock.

pub mod invoice_repo;
pub mod media_asset_repo;
pub mod project_repo;

pub use invoice_repo::InvoiceRepo;
pub use media_asset_repo::MediaAssetRepo;
pub use project_repo::ProjectRepo;
