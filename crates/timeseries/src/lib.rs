//! # lumi-timeseries
//!
//! Time series primitives for the lumi snowfall analysis toolkit: ordered
//! (timestamp, value) sequences, half-open spans, alignment (inner/outer
//! joins on timestamps), and fixed-rule resampling with right-closed,
//! right-labeled bins.
//!
//! Missing values are NaN and propagate through arithmetic; gaps in a
//! series are absent samples, never zeros.
//!
//! ## Quick start
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use lumi_timeseries::{resample_sum, TimeSeries};
//!
//! let t0 = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
//! let ts = TimeSeries::new(
//!     vec![
//!         t0 + Duration::minutes(4),
//!         t0 + Duration::minutes(8),
//!         t0 + Duration::minutes(20),
//!     ],
//!     vec![0.1, 0.2, 0.3],
//! )?;
//! let quarter_hourly = resample_sum(&ts, Duration::minutes(15))?;
//! assert_eq!(quarter_hourly.len(), 2);
//! # Ok::<(), lumi_timeseries::TimeSeriesError>(())
//! ```

mod error;
mod resample;
mod series;
mod span;

pub use error::TimeSeriesError;
pub use resample::{bin_label_right, resample_last, resample_mean, resample_sum};
pub use series::{align_inner, align_outer, AlignedTable, TimeSeries};
pub use span::{TimeSpan, Timestamp};
