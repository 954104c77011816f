//! HTTP handler functions, one module per resource.

pub mod content;
pub mod cron;
pub mod edits;
pub mod generation;
pub mod health;
pub mod media;
pub mod project;
pub mod public_site;
pub mod publish;
pub mod trial;
pub mod webhooks;
