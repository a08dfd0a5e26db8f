//! Time sources for block timestamps and certificate `created_at` values

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use educhain_common::types::{now_millis, Timestamp};

/// Source of epoch-millisecond wall-clock readings
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> Timestamp;
}

/// Reads the system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        now_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        self.now.store(ts, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Wraps a [`Clock`] so successive readings never go backwards.
///
/// A source that steps back (NTP adjustment, manual clock) yields the
/// previous high-water mark instead.
#[derive(Debug)]
pub struct MonotonicClock {
    source: Arc<dyn Clock>,
    last: AtomicU64,
}

impl MonotonicClock {
    pub fn new(source: Arc<dyn Clock>) -> Self {
        Self::starting_at(source, 0)
    }

    /// Seed the high-water mark, e.g. from the newest block of an imported chain
    pub fn starting_at(source: Arc<dyn Clock>, floor: Timestamp) -> Self {
        Self {
            source,
            last: AtomicU64::new(floor),
        }
    }

    /// Next non-decreasing reading
    pub fn next(&self) -> Timestamp {
        let now = self.source.now_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }

    /// The underlying source, for building a sibling ledger on the same time base
    pub fn source(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.source)
    }
}
