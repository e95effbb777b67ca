//! Half-open time intervals.

use chrono::{DateTime, Utc};

use crate::error::TimeSeriesError;

/// Timestamp type used throughout the lumi workspace (UTC, minute resolution
/// or finer).
pub type Timestamp = DateTime<Utc>;

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    start: Timestamp,
    end: Timestamp,
}

impl TimeSpan {
    /// Creates a new span after validating that `start < end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, TimeSeriesError> {
        if start >= end {
            return Err(TimeSeriesError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span start (inclusive).
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Span end (exclusive).
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Span extent.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Returns `true` if `t` lies in `[start, end)`.
    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.start && t < self.end
    }

    /// Intersection of two spans, or `None` if they are disjoint.
    pub fn intersect(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        TimeSpan::new(start, end).ok()
    }
}
