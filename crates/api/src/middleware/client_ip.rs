//! Client address extraction for rate limiting unauthenticated callers.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::state::AppState;

/// Best-effort client address: proxy headers first, then the socket peer.
///
/// Falls back to a fixed sentinel so the rate limiter still has a key --
/// unattributable callers then share one bucket, which errs on the side
/// of throttling.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(extract_client_ip(parts)))
    }
}

/// Try `X-Forwarded-For` first, then `X-Real-IP`, then `ConnectInfo`.
fn extract_client_ip(parts: &Parts) -> String {
    if let Some(forwarded) = parts.headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let candidate = first.trim();
                if !candidate.is_empty() {
                    return candidate.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = parts.headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let candidate = value.trim();
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
    }

    if let Some(connect_info) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}
