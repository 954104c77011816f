//! Cron endpoints for the time-driven automatons.
//!
//! The periodic trigger is external (a scheduler hitting these routes);
//! both jobs are idempotent per calendar trigger and authenticated by a
//! shared secret header.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use siteforge_core::error::CoreError;

use crate::engine::lifecycle::{self, NurtureReport, SweepReport};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the shared cron secret.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// POST /api/v1/cron/cancellation-sweep
pub async fn cancellation_sweep(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SweepReport>> {
    require_cron_secret(&state, &headers)?;
    let report = lifecycle::run_cancellation_sweep(&state).await?;
    Ok(Json(report))
}

/// POST /api/v1/cron/nurture
pub async fn nurture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<NurtureReport>> {
    require_cron_secret(&state, &headers)?;
    let report = lifecycle::run_nurture_sweep(&state).await?;
    Ok(Json(report))
}

fn require_cron_secret(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let presented = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented == state.config.cron_secret {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Unauthorized(
            "Missing or invalid cron secret".into(),
        )))
    }
}
