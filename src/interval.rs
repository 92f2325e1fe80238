//! Half-open time intervals on the wall clock.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Half-open range `[start, end)` where something is scheduled or busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Creates the interval `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "interval start must be <= end");
        Self { start, end }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if this interval overlaps with another interval.
    ///
    /// Endpoints are exclusive on the right, so back-to-back intervals do
    /// not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlap test requiring at least `buffer` of clearance between the two
    /// intervals. Equivalent to widening either interval by `buffer` on both
    /// sides and testing plain overlap.
    pub fn overlaps_with_buffer(&self, other: &TimeInterval, buffer: Duration) -> bool {
        self.start - buffer < other.end && self.end + buffer > other.start
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
