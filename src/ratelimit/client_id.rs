//! Client identity resolution for rate governing.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Header carrying the authenticated user id, set by the auth layer upstream.
pub const USER_ID_HEADER: &str = "x-user-id";

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity used when nothing else is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the key a request is governed under.
///
/// Order: user id header, first hop of `X-Forwarded-For`, peer address,
/// then `"unknown"`.
pub fn resolve_client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(user_id) = header_str(headers, USER_ID_HEADER) {
        return user_id.to_string();
    }

    if let Some(first_hop) = header_str(headers, FORWARDED_FOR_HEADER)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return first_hop.to_string();
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
