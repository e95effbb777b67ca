//! Per-window bulk density estimation.

use lumi_timeseries::{align_inner, TimeSeries};

use crate::config::DensityConfig;
use crate::error::DensityError;
use crate::reconcile::alpha_lsq;

/// Per-window bulk density: gauge amount divided by the particle-based
/// amount computed at unit density.
///
/// Windows where the gauge intensity is below the configured minimum are
/// masked to NaN (quantization noise dominates there), as are windows
/// whose ratio is non-finite or above the optional `rho_max` cap. The
/// three input series are joined on their common timestamps.
pub fn density(
    gauge_amount: &TimeSeries<f64>,
    particle_amount: &TimeSeries<f64>,
    gauge_intensity: &TimeSeries<f64>,
    config: &DensityConfig,
) -> Result<TimeSeries<f64>, DensityError> {
    config.validate()?;
    let (gauge, particle) = align_inner(gauge_amount, particle_amount);
    let (gauge, intensity) = align_inner(&gauge, gauge_intensity);
    // re-join particle onto the final time base
    let (_, particle) = align_inner(&gauge, &particle);

    let values = gauge
        .values()
        .iter()
        .zip(particle.values())
        .zip(intensity.values())
        .map(|((&g, &p), &i)| {
            if !(i.is_finite() && i >= config.min_intensity()) {
                return f64::NAN;
            }
            let rho = g / p;
            if !rho.is_finite() {
                return f64::NAN;
            }
            match config.rho_max() {
                Some(cap) if rho > cap => f64::NAN,
                _ => rho,
            }
        })
        .collect();
    Ok(TimeSeries::new(gauge.times().to_vec(), values)
        .expect("joined series keeps ordered timestamps"))
}

/// Constant bulk density over the whole record: the regression slope of
/// gauge accumulation on unit-density particle accumulation.
pub fn density_lsq(
    gauge_acc: &TimeSeries<f64>,
    particle_acc: &TimeSeries<f64>,
) -> Result<f64, DensityError> {
    let (gauge, particle) = align_inner(gauge_acc, particle_acc);
    alpha_lsq(gauge.values(), particle.values())
}
