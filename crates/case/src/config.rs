//! Configuration for a case analysis.

use chrono::Duration;

use lumi_density::DensityConfig;
use lumi_grouper::{AggregationRule, GrouperError};
use lumi_vfit::VfitConfig;

use crate::error::CaseError;

/// Configuration shared by one analysis run.
///
/// The aggregation rule chosen here drives the grouper, the velocity
/// fit engine and every derived series, so all outputs agree on window
/// boundaries.
#[derive(Clone, Debug)]
pub struct CaseConfig {
    rule: AggregationRule,
    n_combined: usize,
    tdelta_cap: Duration,
    vfit: VfitConfig,
    density: DensityConfig,
}

impl CaseConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: adaptive rule, `n_combined = 1` (no tick pooling),
    /// window duration capped at one hour, default velocity-fit and
    /// density configurations.
    pub fn new() -> Self {
        Self {
            rule: AggregationRule::Adaptive,
            n_combined: 1,
            tdelta_cap: Duration::hours(1),
            vfit: VfitConfig::new(),
            density: DensityConfig::new(),
        }
    }

    // --- Builder methods ---

    /// Sets the aggregation rule.
    pub fn with_rule(mut self, rule: AggregationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the number of adjacent ticks pooled into one.
    pub fn with_n_combined(mut self, n: usize) -> Self {
        self.n_combined = n;
        self
    }

    /// Sets the cap on the window duration used for rate conversion.
    pub fn with_tdelta_cap(mut self, cap: Duration) -> Self {
        self.tdelta_cap = cap;
        self
    }

    /// Sets the velocity fit configuration.
    pub fn with_vfit(mut self, vfit: VfitConfig) -> Self {
        self.vfit = vfit;
        self
    }

    /// Sets the density reconciliation configuration.
    pub fn with_density(mut self, density: DensityConfig) -> Self {
        self.density = density;
        self
    }

    // --- Accessors ---

    /// The aggregation rule.
    pub fn rule(&self) -> AggregationRule {
        self.rule
    }

    /// Number of adjacent ticks pooled into one.
    pub fn n_combined(&self) -> usize {
        self.n_combined
    }

    /// Window duration cap.
    pub fn tdelta_cap(&self) -> Duration {
        self.tdelta_cap
    }

    /// Velocity fit configuration.
    pub fn vfit(&self) -> &VfitConfig {
        &self.vfit
    }

    /// Density configuration.
    pub fn density(&self) -> &DensityConfig {
        &self.density
    }

    /// Validates the configuration and both sub-configurations.
    pub fn validate(&self) -> Result<(), CaseError> {
        self.rule.validate()?;
        if self.n_combined == 0 {
            return Err(GrouperError::InvalidPooling { n: 0 }.into());
        }
        self.vfit.validate()?;
        self.density.validate()?;
        Ok(())
    }
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self::new()
    }
}
