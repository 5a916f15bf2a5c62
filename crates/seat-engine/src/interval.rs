//! Half-open time intervals and the overlap rules used for booking conflicts.
//!
//! Two intervals overlap when `a.start < b.end && b.start < a.end`, so adjacent
//! intervals do NOT overlap. Booking conflicts are stricter: a frame that starts or
//! ends exactly on a booking's boundary also conflicts with it (see
//! [`Interval::conflicts_with`]).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How a candidate frame is tested against an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictRule {
    /// Plain half-open overlap.
    Strict,
    /// Overlap, or any shared endpoint.
    #[default]
    Touching,
}

/// A half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Interval of `minutes` length starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Strict half-open overlap. Adjacent intervals are not overlapping.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// `other` lies entirely inside `self`.
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether either endpoint of `self` coincides with either endpoint of `other`.
    pub fn shares_boundary(&self, other: &Interval) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }

    /// Booking conflict test for a candidate frame (`self`) against an existing booking.
    ///
    /// True on strict overlap, and also when the frame merely touches the booking at a
    /// boundary: the frame `[09:30, 10:00)` conflicts with a booking `[10:00, 10:30)`.
    pub fn conflicts_with(&self, booking: &Interval) -> bool {
        self.overlaps(booking) || self.shares_boundary(booking)
    }

    pub fn conflicts(&self, booking: &Interval, rule: ConflictRule) -> bool {
        match rule {
            ConflictRule::Strict => self.overlaps(booking),
            ConflictRule::Touching => self.conflicts_with(booking),
        }
    }

    /// Minutes shared by two intervals; 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &Interval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_minutes()
    }
}
