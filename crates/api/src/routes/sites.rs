//! Route definitions for public site serving.

use axum::routing::get;
use axum::Router;

use crate::handlers::public_site;
use crate::state::AppState;

/// Routes mounted at `/sites`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{host}", get(public_site::serve))
}
