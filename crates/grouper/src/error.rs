//! Error types for the lumi-grouper crate.

/// Error type for all fallible operations in the lumi-grouper crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrouperError {
    /// Returned when sample timestamps are not strictly increasing.
    #[error("sample timestamps not strictly increasing at index {index}")]
    UnsortedSamples {
        /// Index of the first offending timestamp.
        index: usize,
    },

    /// Returned when the tick pooling factor is zero.
    #[error("tick pooling factor must be at least 1, got {n}")]
    InvalidPooling {
        /// The offending pooling factor.
        n: usize,
    },

    /// Returned when a fixed aggregation rule has a non-positive duration.
    #[error("fixed aggregation rule must have a positive duration, got {seconds} s")]
    InvalidRule {
        /// The offending duration in seconds.
        seconds: i64,
    },
}
