//! Rate Limit Module
//!
//! Sliding-window governor guarding the expensive routes, plus the client
//! identity resolution it is keyed by.

mod client_id;
mod governor;


pub use client_id::{resolve_client_id, FORWARDED_FOR_HEADER, UNKNOWN_CLIENT, USER_ID_HEADER};
pub use governor::RateGovernor;
