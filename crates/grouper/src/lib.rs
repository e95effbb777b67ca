//! Adaptive event grouping of gauge accumulation ticks.
//!
//! A weighing gauge reports snowfall as discrete bucket increments
//! (ticks). This crate turns a tick series into aggregation windows: in
//! adaptive mode each tick opens a window that runs until the next tick,
//! so every window holds exactly one increment of accumulated mass; in
//! fixed mode samples are pooled into right-closed calendar bins instead.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use lumi_grouper::{assign, AggregationRule};
//! use lumi_timeseries::TimeSeries;
//!
//! let base = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
//! let samples: Vec<_> = (0..12).map(|m| base + Duration::minutes(m)).collect();
//! let ticks = TimeSeries::new(
//!     vec![base + Duration::minutes(2), base + Duration::minutes(8)],
//!     vec![0.2, 0.3],
//! )
//! .unwrap();
//!
//! let map = assign(AggregationRule::Adaptive, &samples, &ticks).unwrap();
//! assert_eq!(map.n_groups(), 2);
//! assert_eq!(map.group_of(base + Duration::minutes(5)), Some(base + Duration::minutes(2)));
//! ```

mod error;
mod group;
mod rule;
mod ticks;

pub use error::GrouperError;
pub use group::{assign, group_adaptive, group_fixed, AggregationGroup, GroupMap};
pub use rule::AggregationRule;
pub use ticks::{extract_ticks, pool_ticks};
