//! Card Market - market pricing service for graded trading cards
//!
//! Aggregates sold listings from a chain of market data providers into
//! cached price snapshots, behind a per-client sliding-window rate governor.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
