//! Configuration for density and rate parameter reconciliation.

use crate::error::DensityError;

/// Configuration for the reconciliation solver and density estimator.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use lumi_density::DensityConfig;
///
/// let config = DensityConfig::new()
///     .with_rho_max(600.0)
///     .with_min_intensity(0.2);
/// ```
#[derive(Clone, Debug)]
pub struct DensityConfig {
    min_intensity: f64,
    rho_max: Option<f64>,
    beta_min: f64,
    beta_max: f64,
    beta_guess: f64,
}

impl DensityConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `min_intensity = 0.1` mm/h, `rho_max = None`,
    /// beta bounds `[1, 3]`, `beta_guess = 2.1`.
    pub fn new() -> Self {
        Self {
            min_intensity: 0.1,
            rho_max: None,
            beta_min: 1.0,
            beta_max: 3.0,
            beta_guess: 2.1,
        }
    }

    // --- Builder methods ---

    /// Sets the gauge intensity below which density windows are masked.
    pub fn with_min_intensity(mut self, v: f64) -> Self {
        self.min_intensity = v;
        self
    }

    /// Sets an upper density cap; windows above it become NaN.
    pub fn with_rho_max(mut self, v: f64) -> Self {
        self.rho_max = Some(v);
        self
    }

    /// Sets the beta search bounds.
    pub fn with_beta_bounds(mut self, min: f64, max: f64) -> Self {
        self.beta_min = min;
        self.beta_max = max;
        self
    }

    /// Sets the beta starting point for the search.
    pub fn with_beta_guess(mut self, b: f64) -> Self {
        self.beta_guess = b;
        self
    }

    // --- Accessors ---

    /// Gauge intensity mask threshold in mm/h.
    pub fn min_intensity(&self) -> f64 {
        self.min_intensity
    }

    /// Optional upper density cap in kg/m^3.
    pub fn rho_max(&self) -> Option<f64> {
        self.rho_max
    }

    /// Lower beta bound.
    pub fn beta_min(&self) -> f64 {
        self.beta_min
    }

    /// Upper beta bound.
    pub fn beta_max(&self) -> f64 {
        self.beta_max
    }

    /// Beta starting point.
    pub fn beta_guess(&self) -> f64 {
        self.beta_guess
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), DensityError> {
        if !(self.min_intensity.is_finite() && self.min_intensity >= 0.0) {
            return Err(DensityError::InvalidIntensity {
                value: self.min_intensity,
            });
        }
        if !(self.beta_min.is_finite() && self.beta_max.is_finite() && self.beta_min < self.beta_max)
        {
            return Err(DensityError::InvalidBetaBounds {
                min: self.beta_min,
                max: self.beta_max,
            });
        }
        Ok(())
    }
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self::new()
    }
}
