//! Error types for the lumi-psd crate.

/// Error type for all fallible operations in the lumi-psd crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PsdError {
    /// Returned when bin centers and widths have different lengths.
    #[error("bin grid length mismatch: {centers} centers vs {widths} widths")]
    GridLengthMismatch {
        /// Number of bin centers.
        centers: usize,
        /// Number of bin widths.
        widths: usize,
    },

    /// Returned when bin centers are not strictly increasing.
    #[error("bin centers not strictly increasing at index {index}")]
    UnsortedBins {
        /// Index of the first offending center.
        index: usize,
    },

    /// Returned when a bin width is not a positive finite number.
    #[error("bin width at index {index} must be positive and finite, got {width}")]
    InvalidWidth {
        /// Index of the offending bin.
        index: usize,
        /// The offending width.
        width: f64,
    },

    /// Returned when the concentration matrix does not match the
    /// timestamps and bin grid.
    #[error("PSD shape mismatch: {rows}x{cols} matrix for {times} timestamps and {bins} bins")]
    ShapeMismatch {
        /// Matrix row count.
        rows: usize,
        /// Matrix column count.
        cols: usize,
        /// Number of timestamps.
        times: usize,
        /// Number of diameter bins.
        bins: usize,
    },

    /// Returned when row timestamps are not strictly increasing.
    #[error("PSD timestamps not strictly increasing at index {index}")]
    UnsortedTimes {
        /// Index of the first offending timestamp.
        index: usize,
    },
}
