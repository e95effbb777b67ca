//! Snow event orchestration: ties the gauge record, the particle size
//! distribution table and the velocity observations together under one
//! aggregation rule and derives bulk density, precipitation rates and
//! radar reflectivity per window.
//!
//! The [`Case`] type is the entry point. Build one from the three
//! instrument records, then query derived series; all of them share the
//! group ids produced by the gauge-driven grouping.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use lumi_case::{Case, CaseConfig, GaugeSeries};
//! use lumi_psd::{BinGrid, PsdTable};
//! use lumi_timeseries::TimeSeries;
//! use lumi_vfit::VelocityPointCloud;
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), lumi_case::CaseError> {
//! let t0 = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
//! let times: Vec<_> = (0..3).map(|m| t0 + Duration::minutes(m)).collect();
//! let gauge = GaugeSeries::new(TimeSeries::new(
//!     times.clone(),
//!     vec![0.0, 0.2, 0.0],
//! )?);
//! let grid = BinGrid::uniform(0.5, 0.25, 4)?;
//! let psd = PsdTable::new(times, grid, Array2::zeros((3, 4)))?;
//! let case = Case::new(
//!     gauge,
//!     psd,
//!     VelocityPointCloud::empty(),
//!     CaseConfig::new(),
//! )?;
//! assert_eq!(case.groups().n_groups(), 1);
//! # Ok(())
//! # }
//! ```

mod case;
mod collab;
mod config;
mod error;
mod gauge;
mod reflectivity;

pub use case::{Case, RateParams};
pub use collab::{Instrument, MemoryCache, ScatteringSolver, SeriesCache};
pub use config::CaseConfig;
pub use error::CaseError;
pub use gauge::GaugeSeries;
pub use reflectivity::{reflectivity_tmatrix, z_rayleigh_xband};
