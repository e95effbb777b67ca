//! Parametric velocity-diameter fit families.

/// A named parametric family `v = f(params, d)`.
///
/// The engine is generic over the family so alternative forms can be
/// fitted without touching the solver or the cache.
pub trait FitFamily {
    /// Stable family name, used as part of the fit cache key.
    fn name(&self) -> &'static str;

    /// Number of free parameters.
    fn n_params(&self) -> usize;

    /// Parameters of the default (empty) fit, used when no data supports
    /// a real fit. Evaluating them yields NaN so the gap stays visible.
    fn default_params(&self) -> Vec<f64>;

    /// Evaluates the family at diameter `d` (mm), returning velocity in
    /// m/s.
    fn eval(&self, params: &[f64], d: f64) -> f64;

    /// A starting point for the nonlinear solver, estimated from data.
    fn initial_guess(&self, diameters: &[f64], velocities: &[f64]) -> Vec<f64>;
}

/// Power law `v = a * d^b`, the standard hydrometeor fall speed form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerLaw;

impl FitFamily for PowerLaw {
    fn name(&self) -> &'static str {
        "power-law"
    }

    fn n_params(&self) -> usize {
        2
    }

    fn default_params(&self) -> Vec<f64> {
        vec![f64::NAN, f64::NAN]
    }

    fn eval(&self, params: &[f64], d: f64) -> f64 {
        params[0] * d.powf(params[1])
    }

    /// Log-log linear regression: `ln v = ln a + b ln d`. Falls back to
    /// `a = 1, b = 0.5` when the sample is too small or degenerate.
    fn initial_guess(&self, diameters: &[f64], velocities: &[f64]) -> Vec<f64> {
        let pairs: Vec<(f64, f64)> = diameters
            .iter()
            .zip(velocities)
            .filter(|(&d, &v)| d > 0.0 && v > 0.0)
            .map(|(&d, &v)| (d.ln(), v.ln()))
            .collect();
        let n = pairs.len() as f64;
        if pairs.len() < 2 {
            return vec![1.0, 0.5];
        }
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        let sxy: f64 = pairs
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();
        if sxx <= f64::EPSILON {
            return vec![1.0, 0.5];
        }
        let b = sxy / sxx;
        let a = (mean_y - b * mean_x).exp();
        if a.is_finite() && b.is_finite() {
            vec![a, b]
        } else {
            vec![1.0, 0.5]
        }
    }
}
