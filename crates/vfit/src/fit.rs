//! Nelder-Mead least-squares fitting of a velocity family.

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;

use lumi_timeseries::Timestamp;

use crate::cloud::VelocityPointCloud;
use crate::config::VfitConfig;
use crate::error::VfitError;
use crate::family::FitFamily;

/// Provenance of a stored fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// The solver converged on this group's own data.
    Converged,
    /// Too little data; the family default parameters were substituted.
    Defaulted,
    /// The fit was borrowed from the named earlier group after a solver
    /// failure.
    Reused(Timestamp),
}

/// A fitted velocity-diameter relation.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityFit {
    family: &'static str,
    params: Vec<f64>,
    n_points: usize,
    d_range: Option<(f64, f64)>,
    outcome: FitOutcome,
}

impl VelocityFit {
    pub(crate) fn new(
        family: &'static str,
        params: Vec<f64>,
        n_points: usize,
        d_range: Option<(f64, f64)>,
        outcome: FitOutcome,
    ) -> Self {
        Self {
            family,
            params,
            n_points,
            d_range,
            outcome,
        }
    }

    pub(crate) fn reused_from(&self, origin: Timestamp) -> Self {
        Self {
            outcome: FitOutcome::Reused(origin),
            ..self.clone()
        }
    }

    /// Name of the fit family.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Fitted parameter vector.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Number of points behind the fit.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Diameter extent of the source data, `None` for a default fit.
    pub fn d_range(&self) -> Option<(f64, f64)> {
        self.d_range
    }

    /// Where the parameters came from.
    pub fn outcome(&self) -> FitOutcome {
        self.outcome
    }

    /// Returns `true` when the parameters were computed from this
    /// group's own data.
    pub fn is_own(&self) -> bool {
        self.outcome == FitOutcome::Converged
    }

    /// Evaluates the relation at diameter `d`.
    pub fn velocity<F: FitFamily>(&self, family: &F, d: f64) -> f64 {
        family.eval(&self.params, d)
    }
}

struct SquaredError<'a, F: FitFamily> {
    family: &'a F,
    diameters: &'a [f64],
    velocities: &'a [f64],
}

impl<F: FitFamily> CostFunction for SquaredError<'_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let sse: f64 = self
            .diameters
            .iter()
            .zip(self.velocities)
            .map(|(&d, &v)| {
                let e = self.family.eval(params, d) - v;
                e * e
            })
            .sum();
        if sse.is_finite() {
            Ok(sse)
        } else {
            Ok(f64::MAX)
        }
    }
}

/// Fits the family to the cloud by nonlinear least squares.
///
/// Fewer than `min_points` particles yield a `Defaulted` fit with the
/// family default parameters; sparse data produces unstable fits, so
/// skipping is policy rather than failure. Solver breakdown is reported
/// as [`VfitError::NonConvergence`].
pub fn fit<F: FitFamily>(
    cloud: &VelocityPointCloud,
    family: &F,
    config: &VfitConfig,
) -> Result<VelocityFit, VfitError> {
    if cloud.len() < config.min_points() {
        return Ok(VelocityFit::new(
            family.name(),
            family.default_params(),
            cloud.len(),
            None,
            FitOutcome::Defaulted,
        ));
    }
    let diameters = cloud.diameters();
    let velocities = cloud.velocities();
    let params = minimize(family, &diameters, &velocities).ok_or(VfitError::NonConvergence {
        n_points: cloud.len(),
    })?;
    Ok(VelocityFit::new(
        family.name(),
        params,
        cloud.len(),
        cloud.d_range(),
        FitOutcome::Converged,
    ))
}

fn minimize<F: FitFamily>(family: &F, diameters: &[f64], velocities: &[f64]) -> Option<Vec<f64>> {
    let seed = family.initial_guess(diameters, velocities);
    let dim = family.n_params();

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(seed.clone());
    for i in 0..dim {
        let mut vertex = seed.clone();
        vertex[i] += 0.5;
        simplex.push(vertex);
    }

    let cost = SquaredError {
        family,
        diameters,
        velocities,
    };
    let solver = NelderMead::new(simplex).with_sd_tolerance(1e-8).ok()?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(1000))
        .run()
        .ok()?;

    let best = result.state().best_param.clone()?;
    let best_cost = result.state().best_cost;
    if best_cost.is_finite() && best_cost < f64::MAX && best.iter().all(|p| p.is_finite()) {
        Some(best)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::VelocityPoint;
    use crate::family::PowerLaw;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn cloud_from(pairs: &[(f64, f64)]) -> VelocityPointCloud {
        let t0 = Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap();
        VelocityPointCloud::from_points(
            pairs
                .iter()
                .map(|&(d, v)| VelocityPoint {
                    time: t0,
                    particle_id: 0,
                    diameter: d,
                    velocity: v,
                })
                .collect(),
        )
    }

    #[test]
    fn exact_power_law_recovered() {
        let pairs: Vec<(f64, f64)> = (1..40)
            .map(|i| {
                let d = 0.4 + 0.1 * i as f64;
                (d, 1.2 * d.powf(0.25))
            })
            .collect();
        let cloud = cloud_from(&pairs);
        let fit = fit(&cloud, &PowerLaw, &VfitConfig::new()).unwrap();
        assert!(fit.is_own());
        assert_relative_eq!(fit.params()[0], 1.2, epsilon = 1e-4);
        assert_relative_eq!(fit.params()[1], 0.25, epsilon = 1e-4);
        assert_relative_eq!(fit.velocity(&PowerLaw, 1.0), 1.2, epsilon = 1e-3);
    }

    #[test]
    fn sparse_data_defaults() {
        let cloud = cloud_from(&[(1.0, 1.0), (2.0, 1.5)]);
        let fit = fit(&cloud, &PowerLaw, &VfitConfig::new()).unwrap();
        assert_eq!(fit.outcome(), FitOutcome::Defaulted);
        assert_eq!(fit.n_points(), 2);
        assert!(fit.params().iter().all(|p| p.is_nan()));
        assert!(fit.velocity(&PowerLaw, 1.0).is_nan());
    }

    #[test]
    fn fit_records_extent() {
        let pairs: Vec<(f64, f64)> = (0..20)
            .map(|i| {
                let d = 0.5 + 0.1 * i as f64;
                (d, d.powf(0.3))
            })
            .collect();
        let cloud = cloud_from(&pairs);
        let fit = fit(&cloud, &PowerLaw, &VfitConfig::new()).unwrap();
        let (lo, hi) = fit.d_range().unwrap();
        assert_relative_eq!(lo, 0.5);
        assert_relative_eq!(hi, 2.4, epsilon = 1e-9);
        assert_eq!(fit.n_points(), 20);
    }
}
