//! Error types for the lumi-density crate.

/// Error type for all fallible operations in the lumi-density crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DensityError {
    /// Returned when a regression has fewer than two usable points.
    #[error("linear reconciliation needs at least 2 finite points, got {n}")]
    InsufficientData {
        /// Number of usable points found.
        n: usize,
    },

    /// Returned when the regression design is degenerate (constant
    /// particle accumulation).
    #[error("particle accumulation has no spread, slope undefined")]
    DegenerateRegression,

    /// Returned when two series that must share timestamps do not.
    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Left series length.
        left: usize,
        /// Right series length.
        right: usize,
    },

    /// Returned when the beta search bounds are not an increasing finite
    /// pair.
    #[error("beta bounds must be finite with min < max, got [{min}, {max}]")]
    InvalidBetaBounds {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Returned when the minimum intensity threshold is negative or
    /// non-finite.
    #[error("minimum intensity must be non-negative and finite, got {value}")]
    InvalidIntensity {
        /// The offending threshold.
        value: f64,
    },
}
