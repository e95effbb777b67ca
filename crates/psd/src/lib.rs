//! Particle size distribution moments and normalized-gamma parameters.
//!
//! A [`PsdTable`] holds binned number concentrations `N(d)` per
//! timestamp over a shared diameter grid. Every derived quantity runs
//! through one midpoint integration primitive, `Σ_d f(d) · width(d)`,
//! so moments, rate integrals and the gamma parameter chain all agree
//! on the discretization. Degenerate rows surface as NaN, never as
//! panics: in particular the closed-form shape parameter `mu` is NaN
//! whenever the moment ratio `eta` equals 1.
//!
//! ```
//! use lumi_psd::{moment, BinGrid};
//! use ndarray::array;
//!
//! let grid = BinGrid::uniform(0.5, 0.5, 4).unwrap();
//! let row = array![10.0, 5.0, 1.0, 0.0];
//! let m0 = moment(&grid, row.view(), 0);
//! assert!((m0 - 8.0).abs() < 1e-12);
//! ```

mod error;
mod gamma;
mod moments;
mod series;
mod table;

pub use error::PsdError;
pub use gamma::{
    d0, d0_gamma, d_max, eta, gamma_params, mu_from_eta, nt, GammaPsdParams, MIN_CONCENTRATION,
    NEAR_ZERO_VOLUME,
};
pub use moments::{integrate_row, moment, sum_over_d};
pub use table::{BinGrid, PsdTable};
