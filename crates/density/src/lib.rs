//! Bulk density and rate parameter reconciliation.
//!
//! Particle-based precipitation rates (from the size distribution and
//! the fitted fall velocities) are reconciled with the weighing gauge:
//! either a power-law mass prefactor and exponent `(alpha, beta)` or a
//! constant bulk density `rho` is solved for so the particle-derived
//! accumulation matches the gauge. Beta is searched by Nelder-Mead
//! inside fixed bounds while alpha comes from a closed-form regression
//! at each candidate, so the search stays one-dimensional.

mod config;
mod density;
mod error;
mod kernels;
mod reconcile;

pub use config::DensityConfig;
pub use density::{density, density_lsq};
pub use error::DensityError;
pub use kernels::{r_ab, r_rho, RHO_W, TAU};
pub use reconcile::{accumulation_cost, alpha_lsq, fit_alpha_beta, AbFit};
