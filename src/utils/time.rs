//! # Time Utilities
//!
//! Millisecond wall-clock helpers for identifier allocation.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// A clock before the epoch yields 0 rather than panicking; identifier
/// allocation stays monotonic through its own last-seen state.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
