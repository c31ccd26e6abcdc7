//! Cache-busting suffixes for cached cover URIs.

use std::sync::atomic::{AtomicI64, Ordering};
use time::UtcDateTime;

/// Hands out strictly increasing millisecond values.
///
/// Values follow the wall clock, but two calls within the same millisecond
/// (or after the clock stepped backwards) still get distinct, increasing
/// values, so every cover refresh produces a new URI.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicI64,
}
impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let millis = UtcDateTime::now().unix_timestamp_nanos() / 1_000_000;
        self.next_after(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    fn next_after(&self, now: i64) -> i64 {
        let mut previous = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last.compare_exchange_weak(previous, candidate, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}
