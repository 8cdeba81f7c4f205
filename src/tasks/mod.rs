//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cleanup: evicts expired snapshots and prunes idle rate limit windows

mod cleanup;

pub use cleanup::spawn_cleanup_task;
