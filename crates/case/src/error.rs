//! Error types for the lumi-case crate.

use lumi_density::DensityError;
use lumi_grouper::GrouperError;
use lumi_psd::PsdError;
use lumi_timeseries::TimeSeriesError;
use lumi_vfit::VfitError;

/// Error type for all fallible operations in the lumi-case crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaseError {
    /// A time series operation failed.
    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),

    /// Grouping failed.
    #[error(transparent)]
    Grouper(#[from] GrouperError),

    /// Velocity fitting failed.
    #[error(transparent)]
    Vfit(#[from] VfitError),

    /// A PSD operation failed.
    #[error(transparent)]
    Psd(#[from] PsdError),

    /// Density reconciliation failed.
    #[error(transparent)]
    Density(#[from] DensityError),

    /// Returned when saved rate parameters are needed but none were
    /// stored yet.
    #[error("no rate parameters stored, run minimize_lsq first or pass explicit parameters")]
    MissingRateParams,

    /// Returned when the gauge record produces no aggregation groups.
    #[error("gauge record holds no accumulation ticks in the analysed span")]
    EmptyRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_missing_rate_params() {
        let e = CaseError::MissingRateParams;
        assert_eq!(
            e.to_string(),
            "no rate parameters stored, run minimize_lsq first or pass explicit parameters"
        );
    }

    #[test]
    fn transparent_wrapping_keeps_message() {
        let inner = GrouperError::InvalidPooling { n: 0 };
        let e = CaseError::from(inner.clone());
        assert_eq!(e.to_string(), inner.to_string());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<CaseError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<CaseError>();
    }
}
