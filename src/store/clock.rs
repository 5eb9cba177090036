//! Logical clock
//!
//! A strictly monotonic counter shared by every operation that needs a
//! timestamp: direct writes, transaction starts, and commits. Because all
//! readings come from one counter, timestamps from different operations are
//! totally ordered and never collide, which keeps the strict `>` conflict
//! comparison meaningful.

use std::sync::atomic::{AtomicU64, Ordering};

/// Strictly increasing logical time source
///
/// The first reading is 1; 0 therefore means "before any write".
#[derive(Debug, Default)]
pub struct LogicalClock {
    counter: AtomicU64,
}

impl LogicalClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Advance the clock and return the new reading
    pub fn tick(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recent reading without advancing
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}
