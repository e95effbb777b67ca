//! Numerical integration over the diameter bin grid.

use ndarray::ArrayView1;

use crate::table::BinGrid;

/// Midpoint integration of a diameter-parameterized function:
/// `Σ_d f(d) · width(d)`. NaN values propagate.
///
/// Every derived quantity in this crate is expressed through this
/// primitive so that all integrals share one discretization.
pub fn sum_over_d<F: Fn(f64) -> f64>(grid: &BinGrid, f: F) -> f64 {
    grid.iter().map(|(d, w)| f(d) * w).sum()
}

/// Integrates `f(d, N(d))` against a concentration row:
/// `Σ_d f(d, N(d)) · width(d)`.
///
/// Bins with a non-finite concentration are treated as missing and
/// contribute nothing; a NaN produced by `f` itself (for example a
/// velocity from a default fit) still propagates.
pub fn integrate_row<F: Fn(f64, f64) -> f64>(grid: &BinGrid, row: ArrayView1<'_, f64>, f: F) -> f64 {
    grid.iter()
        .zip(row.iter())
        .filter(|(_, &n)| n.is_finite())
        .map(|((d, w), &n)| f(d, n) * w)
        .sum()
}

/// Raw PSD moment `M_n = Σ_d d^n · N(d) · width(d)`.
pub fn moment(grid: &BinGrid, row: ArrayView1<'_, f64>, n: i32) -> f64 {
    integrate_row(grid, row, |d, c| d.powi(n) * c)
}
