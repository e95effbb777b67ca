//! Error types for the lumi-timeseries crate.

/// Error type for all fallible operations in the lumi-timeseries crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeSeriesError {
    /// Returned when timestamps and values differ in length.
    #[error("length mismatch: {times} timestamps but {values} values")]
    LengthMismatch {
        /// Number of timestamps.
        times: usize,
        /// Number of values.
        values: usize,
    },

    /// Returned when timestamps are not strictly increasing.
    #[error("timestamps not strictly increasing at index {index}")]
    NotMonotonic {
        /// Index of the first offending timestamp.
        index: usize,
    },

    /// Returned when a time span has a non-positive extent.
    #[error("invalid time span: start {start} is not before end {end}")]
    InvalidSpan {
        /// Span start.
        start: chrono::DateTime<chrono::Utc>,
        /// Span end.
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Returned when a resampling rule has a non-positive duration.
    #[error("invalid resampling rule: duration must be positive, got {seconds} s")]
    InvalidRule {
        /// The offending duration in seconds.
        seconds: i64,
    },
}
