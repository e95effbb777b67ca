//! Fall velocity vs diameter fitting for particle imager data.
//!
//! Each aggregation window gets its own power-law relation `v = a d^b`
//! fitted to the window's particle observations. Before fitting, a 2-D
//! Gaussian kernel density estimate over the (diameter, velocity) plane
//! rejects ground clutter and splash artifacts: per diameter column only
//! the velocity band above half of the column's peak density survives.
//! Windows that cannot support a fit borrow the most recent good fit or
//! fall back to the family default, so every window always has an
//! answer; the provenance is recorded on the fit itself.
//!
//! ```
//! use lumi_vfit::{fit, PowerLaw, VelocityPoint, VelocityPointCloud, VfitConfig};
//! use chrono::{TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
//! let points: Vec<_> = (0..30)
//!     .map(|i| {
//!         let d = 0.5 + 0.1 * i as f64;
//!         VelocityPoint { time: t0, particle_id: i, diameter: d, velocity: 1.2 * d.powf(0.25) }
//!     })
//!     .collect();
//! let cloud = VelocityPointCloud::from_points(points);
//! let fit = fit(&cloud, &PowerLaw, &VfitConfig::new()).unwrap();
//! assert!(fit.is_own());
//! assert!((fit.params()[0] - 1.2).abs() < 1e-3);
//! ```

mod cloud;
mod config;
mod engine;
mod error;
mod family;
mod filter;
mod fit;
mod kde;

pub use cloud::{VelocityPoint, VelocityPointCloud};
pub use config::VfitConfig;
pub use engine::FitEngine;
pub use error::VfitError;
pub use family::{FitFamily, PowerLaw};
pub use filter::{filter_outliers, FilterOutput};
pub use fit::{fit, FitOutcome, VelocityFit};
pub use kde::{kde_grid, kde_peak, Kde2d, KdeGrid};
