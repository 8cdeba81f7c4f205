//! API Module
//!
//! HTTP handlers, middleware and routing for the market REST API.
//!
//! # Endpoints
//! - `POST /market` - Market snapshot for a card
//! - `GET /rate-limit` - Remaining request budget
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/cleanup` - Evict expired entries
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
