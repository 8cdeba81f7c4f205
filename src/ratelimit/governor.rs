//! Sliding-window rate governor.

use std::collections::{HashMap, VecDeque};

use crate::cache::current_timestamp_ms;

/// Sliding-window request limiter keyed by client identity.
///
/// Each client keeps the timestamps (Unix milliseconds) of its admitted
/// requests. Timestamps at or before `now - window` are purged before every
/// check, so a window never holds stale entries when it is consulted.
#[derive(Debug)]
pub struct RateGovernor {
    windows: HashMap<String, VecDeque<u64>>,
    max_requests: u32,
    window_seconds: u64,
}

impl RateGovernor {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            windows: HashMap::new(),
            max_requests,
            window_seconds,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Checks and records a request for `client_id`.
    ///
    /// Returns `(true, 0)` when admitted. When denied, returns `(false, retry_after)`
    /// where `retry_after` is the number of whole seconds until the oldest
    /// request leaves the window, plus one. It is never zero.
    pub fn is_allowed(&mut self, client_id: &str) -> (bool, u64) {
        self.is_allowed_at(client_id, current_timestamp_ms())
    }

    pub fn is_allowed_at(&mut self, client_id: &str, now_ms: u64) -> (bool, u64) {
        let window_ms = self.window_ms();
        let window_start = now_ms.saturating_sub(window_ms);

        let timestamps = self.windows.entry(client_id.to_string()).or_default();
        while timestamps.front().is_some_and(|ts| *ts <= window_start) {
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_requests as usize {
            let retry_after = match timestamps.front() {
                Some(oldest) => (oldest + window_ms).saturating_sub(now_ms) / 1000 + 1,
                // max_requests == 0: nothing will ever leave the window
                None => self.window_seconds.max(1),
            };
            return (false, retry_after);
        }

        timestamps.push_back(now_ms);
        (true, 0)
    }

    /// Number of requests `client_id` may still make in the current window.
    /// Does not record anything.
    pub fn get_remaining(&self, client_id: &str) -> u32 {
        self.get_remaining_at(client_id, current_timestamp_ms())
    }

    pub fn get_remaining_at(&self, client_id: &str, now_ms: u64) -> u32 {
        let window_start = now_ms.saturating_sub(self.window_ms());
        let used = self
            .windows
            .get(client_id)
            .map(|timestamps| timestamps.iter().filter(|ts| **ts > window_start).count())
            .unwrap_or(0);

        self.max_requests.saturating_sub(used as u32)
    }

    /// Forgets all recorded requests for one client.
    pub fn reset(&mut self, client_id: &str) {
        self.windows.remove(client_id);
    }

    pub fn reset_all(&mut self) {
        self.windows.clear();
    }

    /// Drops clients with no request left inside the window.
    ///
    /// Returns the number of clients removed.
    pub fn prune(&mut self) -> usize {
        self.prune_at(current_timestamp_ms())
    }

    pub fn prune_at(&mut self, now_ms: u64) -> usize {
        let window_start = now_ms.saturating_sub(self.window_ms());
        let before = self.windows.len();
        self.windows
            .retain(|_, timestamps| timestamps.back().is_some_and(|ts| *ts > window_start));
        before - self.windows.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn window_ms(&self) -> u64 {
        self.window_seconds * 1000
    }
}
