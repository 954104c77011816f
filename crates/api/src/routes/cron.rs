//! Route definitions for the periodic trigger.

use axum::routing::post;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Routes mounted at `/cron`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cancellation-sweep", post(cron::cancellation_sweep))
        .route("/nurture", post(cron::nurture))
}
