//! Normalized-gamma PSD parameter estimation from raw moments.

use ndarray::ArrayView1;
use statrs::function::gamma::gamma;

use crate::moments::{integrate_row, moment};
use crate::table::BinGrid;

/// Total third-moment volume below which the median-volume diameter is
/// reported as 0 (grid search over near-zero noise is meaningless).
pub const NEAR_ZERO_VOLUME: f64 = 1e-4;

/// Concentration below which a bin is considered empty for `d_max`.
pub const MIN_CONCENTRATION: f64 = 1e-4;

/// Normalized-gamma PSD parameters for one time step or group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaPsdParams {
    /// Intercept parameter N0.
    pub n0: f64,
    /// Shape parameter mu; NaN when the moment ratio eta equals 1.
    pub mu: f64,
    /// Slope parameter lambda.
    pub lambda: f64,
    /// Median-volume diameter from the measured distribution.
    pub d0: f64,
    /// Normalized intercept Nw.
    pub nw: f64,
    /// Mass-weighted mean diameter Dm = M4/M3.
    pub dm: f64,
}

/// Moment ratio `eta = M4^2 / (M6 * M2)`.
pub fn eta(grid: &BinGrid, row: ArrayView1<'_, f64>) -> f64 {
    let m2 = moment(grid, row, 2);
    let m4 = moment(grid, row, 4);
    let m6 = moment(grid, row, 6);
    m4 * m4 / (m6 * m2)
}

/// Closed-form gamma shape parameter from the moment ratio.
///
/// Undefined at `eta == 1` (the denominator vanishes); the result is
/// NaN there, a missing value rather than an error.
pub fn mu_from_eta(eta: f64) -> f64 {
    if eta == 1.0 {
        return f64::NAN;
    }
    ((7.0 - 11.0 * eta) - (eta * eta + 14.0 * eta + 1.0).sqrt()) / (2.0 * (eta - 1.0))
}

/// Median-volume diameter D0: the bin center where cumulative
/// third-moment volume is closest to half the total. 0 when the total
/// volume is below [`NEAR_ZERO_VOLUME`].
pub fn d0(grid: &BinGrid, row: ArrayView1<'_, f64>) -> f64 {
    let total = integrate_row(grid, row, |d, n| d.powi(3) * n);
    if !(total.is_finite() && total >= NEAR_ZERO_VOLUME) {
        return 0.0;
    }
    let half = total / 2.0;
    let mut cum = 0.0;
    let mut best = (f64::INFINITY, 0.0);
    for ((d, w), &n) in grid.iter().zip(row.iter()) {
        if n.is_finite() {
            cum += d.powi(3) * n * w;
        }
        let miss = (cum - half).abs();
        if miss < best.0 {
            best = (miss, d);
        }
    }
    best.1
}

/// Largest bin center whose concentration exceeds
/// [`MIN_CONCENTRATION`], 0 when no bin does.
pub fn d_max(grid: &BinGrid, row: ArrayView1<'_, f64>) -> f64 {
    grid.iter()
        .zip(row.iter())
        .filter(|(_, &n)| n > MIN_CONCENTRATION)
        .map(|((d, _), _)| d)
        .last()
        .unwrap_or(0.0)
}

/// Total concentration `Nt = M0`.
pub fn nt(grid: &BinGrid, row: ArrayView1<'_, f64>) -> f64 {
    moment(grid, row, 0)
}

/// Median-volume diameter of the fitted gamma model,
/// `(3.67 + mu) / lambda`.
pub fn d0_gamma(mu: f64, lambda: f64) -> f64 {
    (3.67 + mu) / lambda
}

/// Estimates the full normalized-gamma parameter set for one row.
///
/// All quantities are derived from raw moments through the shared
/// integration primitive; degenerate rows surface as NaN fields.
pub fn gamma_params(grid: &BinGrid, row: ArrayView1<'_, f64>) -> GammaPsdParams {
    let m2 = moment(grid, row, 2);
    let m3 = moment(grid, row, 3);
    let m4 = moment(grid, row, 4);
    let m6 = moment(grid, row, 6);

    let eta = m4 * m4 / (m6 * m2);
    let mu = mu_from_eta(eta);
    let lambda = (m2 * gamma(mu + 5.0) / (m4 * gamma(mu + 3.0))).sqrt();
    let n0 = m2 * lambda.powf(mu + 3.0) / gamma(mu + 3.0);
    let d0 = d0(grid, row);
    let nw = 3.67_f64.powi(4) / (6.0 * d0.powi(4)) * m3;
    let dm = m4 / m3;

    GammaPsdParams {
        n0,
        mu,
        lambda,
        d0,
        nw,
        dm,
    }
}
