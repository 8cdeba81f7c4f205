//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{
    cache_cleanup_handler, cache_clear_handler, cache_stats_handler, health_handler,
    market_handler, rate_limit_handler, AppState,
};
use super::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /market` - Market snapshot for a card (rate limited)
/// - `GET /rate-limit` - Caller's remaining request budget
/// - `GET /cache/stats` - Snapshot cache statistics
/// - `POST /cache/cleanup` - Evict expired snapshots
/// - `DELETE /cache` - Clear the snapshot cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Rate limit: sliding-window governor on `/market`
/// - CORS: configured origin, or any origin when unset
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.allowed_origin.as_deref());

    let governed = Router::new()
        .route("/market", post(market_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(governed)
        .route("/rate-limit", get(rate_limit_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/cleanup", post(cache_cleanup_handler))
        .route("/cache", delete(cache_clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            warn!("Invalid ALLOWED_ORIGIN, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_market_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/market")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"player":"Mike Trout","set_name":"2011 Topps Update"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "9");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/scan")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn allow_origin_header(allowed_origin: Option<&str>) -> Option<String> {
        let mut state = AppState::from_config(&Config::default()).unwrap();
        state.allowed_origin = allowed_origin.map(str::to_string);

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_configured_origin() {
        assert_eq!(
            allow_origin_header(Some("http://localhost:3000")).await.as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn test_cors_any_origin_when_unset_or_invalid() {
        assert_eq!(allow_origin_header(None).await.as_deref(), Some("*"));
        // An unusable origin falls back to any origin instead of failing startup
        assert_eq!(allow_origin_header(Some("bad\norigin")).await.as_deref(), Some("*"));
    }
}
