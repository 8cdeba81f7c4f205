//! Rate limit middleware for governed routes.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{ApiError, Result};
use crate::ratelimit::resolve_client_id;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Admits or rejects the request through the shared governor.
///
/// Rejected requests get a 429 with `Retry-After`; admitted responses carry
/// the remaining budget in `X-RateLimit-Remaining`.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_id = resolve_client_id(request.headers(), peer);

    let (allowed, retry_after, remaining) = {
        let mut governor = state.governor.write().await;
        let (allowed, retry_after) = governor.is_allowed(&client_id);
        (allowed, retry_after, governor.get_remaining(&client_id))
    };

    if !allowed {
        warn!(
            "Rate limit exceeded for client {}, retry after {}s",
            client_id, retry_after
        );
        return Err(ApiError::RateLimited { retry_after });
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
    Ok(response)
}
