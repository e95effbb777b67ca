//! Gaussian kernel density estimation on the diameter-velocity plane.

use ndarray::Array2;

use crate::cloud::VelocityPointCloud;
use crate::config::VfitConfig;
use crate::error::VfitError;

/// A 2-D Gaussian product-kernel density estimate with Scott's rule
/// bandwidth per dimension.
#[derive(Debug, Clone)]
pub struct Kde2d {
    points: Vec<(f64, f64)>,
    bw_d: f64,
    bw_v: f64,
}

impl Kde2d {
    /// Builds the estimator from paired samples.
    ///
    /// Fails when fewer than two points are given or either dimension has
    /// zero spread (the bandwidth would collapse).
    pub fn new(diameters: &[f64], velocities: &[f64]) -> Result<Self, VfitError> {
        let n = diameters.len().min(velocities.len());
        if n < 2 {
            return Err(VfitError::DegenerateKde { n_points: n });
        }
        let bw_factor = (n as f64).powf(-1.0 / 6.0);
        let bw_d = sample_std(&diameters[..n]) * bw_factor;
        let bw_v = sample_std(&velocities[..n]) * bw_factor;
        if !(bw_d > 0.0 && bw_v > 0.0 && bw_d.is_finite() && bw_v.is_finite()) {
            return Err(VfitError::DegenerateKde { n_points: n });
        }
        let points = diameters[..n]
            .iter()
            .zip(&velocities[..n])
            .map(|(&d, &v)| (d, v))
            .collect();
        Ok(Self { points, bw_d, bw_v })
    }

    /// Density at `(d, v)`.
    pub fn density(&self, d: f64, v: f64) -> f64 {
        let norm = 1.0
            / (self.points.len() as f64
                * 2.0
                * std::f64::consts::PI
                * self.bw_d
                * self.bw_v);
        let sum: f64 = self
            .points
            .iter()
            .map(|&(pd, pv)| {
                let zd = (d - pd) / self.bw_d;
                let zv = (v - pv) / self.bw_v;
                (-0.5 * (zd * zd + zv * zv)).exp()
            })
            .sum();
        norm * sum
    }
}

/// Density evaluated on a diameter x velocity grid.
///
/// `z` is indexed `[velocity row, diameter column]`.
#[derive(Debug, Clone)]
pub struct KdeGrid {
    /// Diameter grid points (prefix of the configured bin grid).
    pub d: Vec<f64>,
    /// Velocity grid points spanning the observed range.
    pub v: Vec<f64>,
    /// Density matrix, one column per diameter grid point.
    pub z: Array2<f64>,
}

/// Evaluates the cloud's KDE on the fixed grid.
///
/// The diameter axis is the configured bin grid truncated a little past
/// the largest observed particle (20 bin widths of headroom); the
/// velocity axis spans the observed velocity range at one fifth of the
/// diameter resolution.
pub fn kde_grid(cloud: &VelocityPointCloud, config: &VfitConfig) -> Result<KdeGrid, VfitError> {
    let diameters = cloud.diameters();
    let velocities = cloud.velocities();
    let kernel = Kde2d::new(&diameters, &velocities)?;

    let (_, d_max) = cloud.d_range().ok_or(VfitError::DegenerateKde { n_points: 0 })?;
    let (v_min, v_max) = cloud.v_range().ok_or(VfitError::DegenerateKde { n_points: 0 })?;
    let cutoff = d_max + 20.0 * config.binwidth();
    let d: Vec<f64> = config.dbins().into_iter().filter(|&x| x < cutoff).collect();
    let n_v = config.n_vbins();
    let v: Vec<f64> = (0..n_v)
        .map(|i| v_min + (v_max - v_min) * i as f64 / (n_v - 1) as f64)
        .collect();

    let mut z = Array2::zeros((v.len(), d.len()));
    for (col, &dc) in d.iter().enumerate() {
        for (row, &vc) in v.iter().enumerate() {
            z[(row, col)] = kernel.density(dc, vc);
        }
    }
    Ok(KdeGrid { d, v, z })
}

/// The most probable velocity per diameter grid point.
pub fn kde_peak(grid: &KdeGrid) -> (Vec<f64>, Vec<f64>) {
    let peaks = grid
        .z
        .columns()
        .into_iter()
        .map(|col| {
            let mut best = 0;
            for (i, &z) in col.iter().enumerate() {
                if z > col[best] {
                    best = i;
                }
            }
            grid.v[best]
        })
        .collect();
    (grid.d.clone(), peaks)
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
