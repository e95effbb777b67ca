//! Configuration for velocity fitting.

use crate::error::VfitError;

/// Configuration for the velocity fit engine.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use lumi_vfit::VfitConfig;
///
/// let config = VfitConfig::new()
///     .with_kde_frac(0.4)
///     .with_correction_factor(1.05);
/// ```
#[derive(Clone, Debug)]
pub struct VfitConfig {
    d_min: f64,
    correction_factor: f64,
    min_points: usize,
    kde_frac: f64,
    grid_start: f64,
    grid_end: f64,
    grid_bins: usize,
}

impl VfitConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `d_min = 0.375` mm (shortest diameter the imager
    /// resolves reliably), `correction_factor = 1.0`, `min_points = 5`,
    /// `kde_frac = 0.5` (full width at half maximum), diameter grid of
    /// 206 bins over [0.375, 25.875] mm.
    pub fn new() -> Self {
        Self {
            d_min: 0.375,
            correction_factor: 1.0,
            min_points: 5,
            kde_frac: 0.5,
            grid_start: 0.375,
            grid_end: 25.875,
            grid_bins: 206,
        }
    }

    // --- Builder methods ---

    /// Sets the minimum accepted particle diameter in mm.
    pub fn with_d_min(mut self, d: f64) -> Self {
        self.d_min = d;
        self
    }

    /// Sets the geometric diameter correction divisor.
    pub fn with_correction_factor(mut self, f: f64) -> Self {
        self.correction_factor = f;
        self
    }

    /// Sets the minimum point count below which fitting is skipped.
    pub fn with_min_points(mut self, n: usize) -> Self {
        self.min_points = n;
        self
    }

    /// Sets the density fraction of the column maximum that bounds the
    /// retained velocity band.
    pub fn with_kde_frac(mut self, frac: f64) -> Self {
        self.kde_frac = frac;
        self
    }

    /// Sets the diameter grid extent and resolution.
    pub fn with_grid(mut self, start: f64, end: f64, bins: usize) -> Self {
        self.grid_start = start;
        self.grid_end = end;
        self.grid_bins = bins;
        self
    }

    // --- Accessors ---

    /// Minimum accepted particle diameter in mm.
    pub fn d_min(&self) -> f64 {
        self.d_min
    }

    /// Geometric diameter correction divisor.
    pub fn correction_factor(&self) -> f64 {
        self.correction_factor
    }

    /// Minimum point count below which fitting is skipped.
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Density fraction bounding the retained velocity band.
    pub fn kde_frac(&self) -> f64 {
        self.kde_frac
    }

    /// Diameter grid bin centers, evenly spaced.
    pub fn dbins(&self) -> Vec<f64> {
        let step = self.binwidth();
        (0..self.grid_bins)
            .map(|i| self.grid_start + step * i as f64)
            .collect()
    }

    /// Spacing of the diameter grid in mm.
    pub fn binwidth(&self) -> f64 {
        (self.grid_end - self.grid_start) / (self.grid_bins - 1) as f64
    }

    /// Number of velocity grid points used by the KDE, one fifth of the
    /// diameter grid resolution.
    pub fn n_vbins(&self) -> usize {
        (self.grid_bins as f64 / 5.0).round() as usize
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), VfitError> {
        if !(self.kde_frac > 0.0 && self.kde_frac < 1.0) {
            return Err(VfitError::InvalidFraction {
                frac: self.kde_frac,
            });
        }
        if !(self.correction_factor.is_finite() && self.correction_factor > 0.0) {
            return Err(VfitError::InvalidCorrection {
                factor: self.correction_factor,
            });
        }
        if self.grid_bins < 2 || self.grid_end <= self.grid_start {
            return Err(VfitError::InvalidGrid {
                bins: self.grid_bins,
                start: self.grid_start,
                end: self.grid_end,
            });
        }
        Ok(())
    }
}

impl Default for VfitConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_grid() {
        let config = VfitConfig::new();
        let dbins = config.dbins();
        assert_eq!(dbins.len(), 206);
        assert_relative_eq!(dbins[0], 0.375);
        assert_relative_eq!(dbins[205], 25.875, epsilon = 1e-9);
        assert_relative_eq!(config.binwidth(), 25.5 / 205.0);
        assert_eq!(config.n_vbins(), 41);
    }

    #[test]
    fn builder_overrides() {
        let config = VfitConfig::new()
            .with_d_min(0.5)
            .with_kde_frac(0.4)
            .with_min_points(10);
        assert_relative_eq!(config.d_min(), 0.5);
        assert_relative_eq!(config.kde_frac(), 0.4);
        assert_eq!(config.min_points(), 10);
    }

    #[test]
    fn validate_rejects_bad_fraction() {
        assert!(matches!(
            VfitConfig::new().with_kde_frac(0.0).validate(),
            Err(VfitError::InvalidFraction { .. })
        ));
        assert!(matches!(
            VfitConfig::new().with_kde_frac(1.0).validate(),
            Err(VfitError::InvalidFraction { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_correction() {
        assert!(matches!(
            VfitConfig::new().with_correction_factor(0.0).validate(),
            Err(VfitError::InvalidCorrection { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_grid() {
        assert!(matches!(
            VfitConfig::new().with_grid(1.0, 0.5, 10).validate(),
            Err(VfitError::InvalidGrid { .. })
        ));
        assert!(matches!(
            VfitConfig::new().with_grid(0.375, 25.875, 1).validate(),
            Err(VfitError::InvalidGrid { .. })
        ));
    }
}
