//! Per-group fitting with fallback and a rule-keyed cache.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use lumi_grouper::{AggregationRule, GroupMap};
use lumi_timeseries::Timestamp;

use crate::cloud::VelocityPointCloud;
use crate::config::VfitConfig;
use crate::error::VfitError;
use crate::family::FitFamily;
use crate::filter::filter_outliers;
use crate::fit::{fit, FitOutcome, VelocityFit};

/// Fit cache state. Fits computed for one aggregation rule are invalid
/// under any other, so the rule is part of the state.
#[derive(Debug, Clone)]
enum FitState {
    Unfit,
    Fitted {
        rule: AggregationRule,
        fits: BTreeMap<Timestamp, VelocityFit>,
    },
}

/// Velocity fit engine: computes, caches and evaluates per-group fits.
///
/// The engine owns the fitted-parameter history. Fits are computed once
/// per aggregation rule via [`FitEngine::get_or_compute`] and reused
/// until the rule changes.
#[derive(Debug, Clone)]
pub struct FitEngine<F: FitFamily> {
    family: F,
    config: VfitConfig,
    state: FitState,
}

impl<F: FitFamily> FitEngine<F> {
    /// Creates an engine with no fits computed yet.
    pub fn new(family: F, config: VfitConfig) -> Self {
        Self {
            family,
            config,
            state: FitState::Unfit,
        }
    }

    /// The fit family.
    pub fn family(&self) -> &F {
        &self.family
    }

    /// The engine configuration.
    pub fn config(&self) -> &VfitConfig {
        &self.config
    }

    /// Filters and fits every group, in time order.
    ///
    /// Groups whose fit cannot be computed (too few particles, a
    /// degenerate KDE or solver non-convergence) borrow the most recent
    /// successful fit, marked `Reused`; when no success exists yet the
    /// family default fit stands in. The returned map covers every group
    /// of `groups`.
    pub fn fit_grouped(
        &self,
        cloud: &VelocityPointCloud,
        groups: &GroupMap,
    ) -> Result<BTreeMap<Timestamp, VelocityFit>, VfitError> {
        self.config.validate()?;
        let mut partitions = cloud.partition(groups);
        let mut fits = BTreeMap::new();
        let mut last_success: Option<(Timestamp, VelocityFit)> = None;

        for group in groups.groups() {
            let id = group.id();
            let part = partitions.remove(&id).unwrap_or_default();
            let attempted = self.fit_one(&part);
            let fit = match attempted {
                Ok(f) if f.is_own() => {
                    last_success = Some((id, f.clone()));
                    f
                }
                other => match &last_success {
                    Some((origin, prev)) => {
                        warn!(
                            group = %id,
                            origin = %origin,
                            n_points = part.len(),
                            "velocity fit unavailable, reusing earlier fit"
                        );
                        prev.reused_from(*origin)
                    }
                    None => {
                        warn!(
                            group = %id,
                            n_points = part.len(),
                            "velocity fit unavailable, no earlier fit, using default"
                        );
                        match other {
                            Ok(defaulted) => defaulted,
                            Err(_) => VelocityFit::new(
                                self.family.name(),
                                self.family.default_params(),
                                part.len(),
                                None,
                                FitOutcome::Defaulted,
                            ),
                        }
                    }
                },
            };
            fits.insert(id, fit);
        }
        Ok(fits)
    }

    /// Returns the cached fits for `groups`'s rule, computing them on
    /// first access or when the rule changed since the last computation.
    pub fn get_or_compute(
        &mut self,
        cloud: &VelocityPointCloud,
        groups: &GroupMap,
    ) -> Result<&BTreeMap<Timestamp, VelocityFit>, VfitError> {
        let needs_compute = match &self.state {
            FitState::Unfit => true,
            FitState::Fitted { rule, .. } => *rule != groups.rule(),
        };
        if needs_compute {
            debug!(rule = %groups.rule().label(), "computing velocity fits");
            let fits = self.fit_grouped(cloud, groups)?;
            self.state = FitState::Fitted {
                rule: groups.rule(),
                fits,
            };
        }
        match &self.state {
            FitState::Fitted { fits, .. } => Ok(fits),
            FitState::Unfit => unreachable!("state set above"),
        }
    }

    /// Evaluates the stored fit of `group_id` at diameter `d`.
    pub fn velocity_at(&self, d: f64, group_id: Timestamp) -> Result<f64, VfitError> {
        let FitState::Fitted { fits, .. } = &self.state else {
            return Err(VfitError::Unfit);
        };
        let fit = fits
            .get(&group_id)
            .ok_or(VfitError::UnknownGroup { id: group_id })?;
        Ok(fit.velocity(&self.family, d))
    }

    /// The stored fit for a group, if fits were computed.
    pub fn fit_for(&self, group_id: Timestamp) -> Option<&VelocityFit> {
        match &self.state {
            FitState::Fitted { fits, .. } => fits.get(&group_id),
            FitState::Unfit => None,
        }
    }

    /// Drops all cached fits.
    pub fn invalidate(&mut self) {
        self.state = FitState::Unfit;
    }

    fn fit_one(&self, part: &VelocityPointCloud) -> Result<VelocityFit, VfitError> {
        if part.len() < self.config.min_points() {
            // routed through the fallback chain by the caller
            return Err(VfitError::NonConvergence {
                n_points: part.len(),
            });
        }
        let filtered = filter_outliers(part, &self.config)?;
        fit(&filtered.filtered, &self.family, &self.config)
    }
}
