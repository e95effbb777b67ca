//! KDE-based outlier rejection on the diameter-velocity plane.

use crate::cloud::VelocityPointCloud;
use crate::config::VfitConfig;
use crate::error::VfitError;
use crate::kde::kde_grid;

/// Outcome of outlier filtering.
///
/// `band_std` and `band_half_width` are aligned to the full configured
/// diameter bin grid; entries are NaN for bins outside the evaluated
/// grid or where no velocity grid point cleared the density threshold.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Particles inside the retained velocity band of their diameter bin.
    pub filtered: VelocityPointCloud,
    /// Sample std of retained velocities per diameter bin.
    pub band_std: Vec<f64>,
    /// Half width of the retained velocity band per diameter bin.
    pub band_half_width: Vec<f64>,
}

/// Removes ground clutter and splash artifacts.
///
/// For each diameter column of the KDE grid, the velocity band where the
/// density exceeds `kde_frac` times the column maximum is kept (full
/// width at half maximum for the default fraction); particles outside
/// the band are discarded.
pub fn filter_outliers(
    cloud: &VelocityPointCloud,
    config: &VfitConfig,
) -> Result<FilterOutput, VfitError> {
    config.validate()?;
    let grid = kde_grid(cloud, config)?;
    let frac = config.kde_frac();
    let binwidth = config.binwidth();
    let n_bins = config.dbins().len();

    let mut kept = Vec::new();
    let mut band_std = vec![f64::NAN; n_bins];
    let mut band_half_width = vec![f64::NAN; n_bins];

    for (col, &d) in grid.d.iter().enumerate() {
        let column = grid.z.column(col);
        let z_max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let z_lim = z_max * frac;
        let passing: Vec<f64> = grid
            .v
            .iter()
            .zip(column.iter())
            .filter(|&(_, &z)| z > z_lim)
            .map(|(&v, _)| v)
            .collect();
        let (Some(&v_min), Some(&v_max)) = (passing.first(), passing.last()) else {
            continue;
        };

        let bin_points = cloud.points_in_bin(d, binwidth, Some((v_min, v_max)));
        band_half_width[col] = 0.5 * (v_max - v_min);
        band_std[col] = velocity_std(&bin_points);
        kept.extend(bin_points.into_iter().copied());
    }

    Ok(FilterOutput {
        filtered: VelocityPointCloud::from_points(kept),
        band_std,
        band_half_width,
    })
}

fn velocity_std(points: &[&crate::cloud::VelocityPoint]) -> f64 {
    if points.len() < 2 {
        return f64::NAN;
    }
    let n = points.len() as f64;
    let mean = points.iter().map(|p| p.velocity).sum::<f64>() / n;
    let var = points
        .iter()
        .map(|p| (p.velocity - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    var.sqrt()
}
