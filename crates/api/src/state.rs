use std::sync::Arc;

use siteforge_core::rate_limit::FixedWindowLimiter;
use siteforge_media::{ImageChain, ObjectStorage};
use siteforge_model::ModelClient;
use siteforge_notify::EmailDelivery;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Optional
/// subsystems are `None` when unconfigured; operations that need them fail
/// fast with a configuration error instead of partially applying.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: siteforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Fixed-window request limiter (per-process, best-effort).
    pub limiter: Arc<FixedWindowLimiter>,
    /// External content model, if configured.
    pub model: Option<Arc<ModelClient>>,
    /// Ordered image acquisition chain (always answers via its fallback).
    pub images: Arc<ImageChain>,
    /// Object storage for uploads and generated images, if configured.
    pub storage: Option<Arc<ObjectStorage>>,
    /// SMTP delivery for owner notifications, if configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}
