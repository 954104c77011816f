//! Domain logic for the site generation and lifecycle engine.
//!
//! This crate contains pure business rules only -- no database access and no
//! network I/O. All data access goes through the repository layer in
//! `siteforge_db`; all external calls go through `siteforge_model` and
//! `siteforge_media`.

pub mod content;
pub mod content_diff;
pub mod document;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod rate_limit;
pub mod status;
pub mod tokens;
pub mod types;
