//! Error types for the lumi-vfit crate.

use lumi_timeseries::Timestamp;

/// Error type for all fallible operations in the lumi-vfit crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VfitError {
    /// Returned when the KDE fraction is outside the open interval (0, 1).
    #[error("KDE fraction must be in (0, 1), got {frac}")]
    InvalidFraction {
        /// The offending fraction.
        frac: f64,
    },

    /// Returned when the diameter correction factor is not a positive
    /// finite number.
    #[error("diameter correction factor must be positive and finite, got {factor}")]
    InvalidCorrection {
        /// The offending factor.
        factor: f64,
    },

    /// Returned when the diameter grid has fewer than two bins or a
    /// non-increasing extent.
    #[error("diameter grid needs at least 2 increasing bins, got {bins} over [{start}, {end}]")]
    InvalidGrid {
        /// Number of grid bins.
        bins: usize,
        /// Grid start diameter in mm.
        start: f64,
        /// Grid end diameter in mm.
        end: f64,
    },

    /// Returned when a resampling rule is not a positive whole number of
    /// seconds.
    #[error("resampling rule must have a positive duration, got {seconds} s")]
    InvalidRule {
        /// The offending duration in seconds.
        seconds: i64,
    },

    /// Returned when a kernel density estimate cannot be formed because
    /// the sample has no spread in one of the dimensions.
    #[error("kernel density estimate undefined for {n_points} points with zero spread")]
    DegenerateKde {
        /// Number of points in the degenerate sample.
        n_points: usize,
    },

    /// Returned when the Nelder-Mead solver fails to produce a finite
    /// minimum.
    #[error("velocity fit did not converge on {n_points} points")]
    NonConvergence {
        /// Number of points handed to the solver.
        n_points: usize,
    },

    /// Returned when `velocity_at` is called before any fits were
    /// computed for the active aggregation rule.
    #[error("no velocity fits computed yet, call get_or_compute first")]
    Unfit,

    /// Returned when a group id has no stored fit.
    #[error("no velocity fit stored for group {id}")]
    UnknownGroup {
        /// The unknown group id.
        id: Timestamp,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn error_invalid_fraction() {
        let e = VfitError::InvalidFraction { frac: 1.5 };
        assert_eq!(e.to_string(), "KDE fraction must be in (0, 1), got 1.5");
    }

    #[test]
    fn error_degenerate_kde() {
        let e = VfitError::DegenerateKde { n_points: 7 };
        assert_eq!(
            e.to_string(),
            "kernel density estimate undefined for 7 points with zero spread"
        );
    }

    #[test]
    fn error_non_convergence() {
        let e = VfitError::NonConvergence { n_points: 12 };
        assert_eq!(e.to_string(), "velocity fit did not converge on 12 points");
    }

    #[test]
    fn error_unknown_group() {
        let id = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
        let e = VfitError::UnknownGroup { id };
        assert_eq!(
            e.to_string(),
            "no velocity fit stored for group 2014-02-01 00:00:00 UTC"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<VfitError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<VfitError>();
    }
}
