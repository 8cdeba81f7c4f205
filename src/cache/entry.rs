//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time to live in seconds
    pub ttl_seconds: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - TTL in seconds
    pub fn new(value: V, ttl_seconds: u64) -> Self {
        Self {
            value,
            created_at: current_timestamp_ms(),
            ttl_seconds,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry expires once strictly more than its TTL has elapsed since
    /// creation. At exactly `created_at + ttl` the entry is still live.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading (Unix milliseconds).
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) > self.ttl_seconds * 1000
    }

    // == Time To Live ==
    /// Returns remaining TTL in seconds, `0` once the entry has expired.
    pub fn ttl_remaining(&self) -> u64 {
        let elapsed = current_timestamp_ms().saturating_sub(self.created_at) / 1000;
        self.ttl_seconds.saturating_sub(elapsed)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), 60);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.ttl_seconds, 60);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(42u32, 1);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining_seconds() {
        let entry = CacheEntry::new("test_value", 10);

        let remaining = entry.ttl_remaining();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry {
            value: "test",
            created_at: current_timestamp_ms() - 5_000,
            ttl_seconds: 1,
        };

        assert_eq!(entry.ttl_remaining(), 0);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry {
            value: "test",
            created_at: 10_000,
            ttl_seconds: 5,
        };

        // Exactly at the TTL the entry is still valid
        assert!(!entry.is_expired_at(15_000));
        assert!(entry.is_expired_at(15_001));
    }
}
