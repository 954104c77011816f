//! HTTP client and prompt builders for the external content model.
//!
//! The model is an external collaborator: this crate owns how the engine
//! calls it (request shape, authentication, hard timeout) and what it asks
//! for (prompt builders), while output sanitization and structural
//! validation live in `siteforge_core::document`.

pub mod client;
pub mod prompt;

pub use client::{ModelClient, ModelConfig, ModelError};
