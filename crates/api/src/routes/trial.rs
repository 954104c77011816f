//! Route definitions for unauthenticated trials.

use axum::routing::post;
use axum::Router;

use crate::handlers::trial;
use crate::state::AppState;

/// Routes mounted at `/trial`.
pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(trial::generate))
}
