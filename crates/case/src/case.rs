//! One analysis case: three instrument records under a shared rule.

use std::collections::HashMap;

use tracing::{info, warn};

use lumi_density::{fit_alpha_beta, r_ab, r_rho, AbFit};
use lumi_grouper::{assign, GroupMap};
use lumi_psd::{integrate_row, GammaPsdParams, PsdTable};
use lumi_timeseries::{align_outer, AlignedTable, TimeSeries, TimeSpan, Timestamp};
use lumi_vfit::{FitEngine, PowerLaw, VelocityPointCloud};

use crate::collab::{Instrument, ScatteringSolver, SeriesCache};
use crate::config::CaseConfig;
use crate::error::CaseError;
use crate::gauge::GaugeSeries;
use crate::reflectivity;

/// Rate parameters for the particle-based intensity integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateParams {
    /// Power-law mass prefactor and exponent.
    AlphaBeta {
        /// Mass prefactor.
        alpha: f64,
        /// Mass exponent.
        beta: f64,
    },
    /// Constant bulk density in kg/m^3 (spherical particles).
    Rho(f64),
}

/// An analysis case tying the gauge record, the PSD table and the
/// velocity point cloud together under one aggregation rule.
///
/// The case owns the velocity fit engine and a memo of named derived
/// series; an injected [`SeriesCache`] may additionally persist them
/// across sessions. All derived series are keyed by group id.
pub struct Case {
    gauge: GaugeSeries,
    psd: PsdTable,
    cloud: VelocityPointCloud,
    config: CaseConfig,
    groups: GroupMap,
    grouped_psd: PsdTable,
    engine: FitEngine<PowerLaw>,
    ab: Option<(f64, f64)>,
    memo: HashMap<String, TimeSeries<f64>>,
    cache: Option<Box<dyn SeriesCache>>,
}

impl Case {
    /// Builds a case: validates the configuration, groups the gauge
    /// record and averages the PSD per group.
    ///
    /// An empty tick record is not an error; every derived series is
    /// then empty.
    pub fn new(
        gauge: GaugeSeries,
        psd: PsdTable,
        cloud: VelocityPointCloud,
        config: CaseConfig,
    ) -> Result<Self, CaseError> {
        config.validate()?;
        let ticks = gauge.ticks(config.n_combined())?;
        let groups = assign(config.rule(), gauge.sample_times(), &ticks)?;
        info!(
            rule = %config.rule().label(),
            n_groups = groups.n_groups(),
            "case initialised"
        );
        let grouped_psd = psd.grouped_mean(&groups)?;
        let engine = FitEngine::new(PowerLaw, config.vfit().clone());
        Ok(Self {
            gauge,
            psd,
            cloud,
            config,
            groups,
            grouped_psd,
            engine,
            ab: None,
            memo: HashMap::new(),
            cache: None,
        })
    }

    /// Attaches a cache collaborator for named derived series.
    pub fn with_cache(mut self, cache: Box<dyn SeriesCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The aggregation groups.
    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// The gauge record.
    pub fn gauge(&self) -> &GaugeSeries {
        &self.gauge
    }

    /// Per-group mean PSD.
    pub fn grouped_psd(&self) -> &PsdTable {
        &self.grouped_psd
    }

    /// Saved rate parameters, if `minimize_lsq` ran.
    pub fn ab(&self) -> Option<(f64, f64)> {
        self.ab
    }

    /// Stable identifier of this analysis: instrument extent plus rule.
    pub fn fingerprint(&self) -> String {
        format!("{}-{}", self.gauge.fingerprint(), self.config.rule().label())
    }

    /// A new case narrowed to `span`. Fits, memo and saved parameters
    /// are not carried over; the cache collaborator is dropped.
    pub fn between(&self, span: TimeSpan) -> Result<Self, CaseError> {
        Case::new(
            self.gauge.narrowed(span),
            self.psd.between(span),
            self.cloud.between(span),
            self.config.clone(),
        )
    }

    /// Particle-based precipitation intensity per group in mm/h.
    ///
    /// With `None` the saved parameters from `minimize_lsq` are used.
    pub fn intensity(&mut self, params: Option<RateParams>) -> Result<TimeSeries<f64>, CaseError> {
        let params = self.resolve_params(params)?;
        self.ensure_fits()?;
        let mut pairs = Vec::with_capacity(self.grouped_psd.n_rows());
        for (i, &id) in self.grouped_psd.times().iter().enumerate() {
            let row = self.grouped_psd.row(i);
            let r = match self.engine.fit_for(id) {
                Some(fit) => integrate_row(self.grouped_psd.grid(), row, |d, n| {
                    let v = fit.velocity(&PowerLaw, d);
                    match params {
                        RateParams::AlphaBeta { alpha, beta } => r_ab(d, alpha, beta, v, n),
                        RateParams::Rho(rho) => r_rho(d, rho, v, n),
                    }
                }),
                None => f64::NAN,
            };
            pairs.push((id, r));
        }
        Ok(TimeSeries::from_pairs(pairs).expect("group ids are ordered"))
    }

    /// Particle-based precipitation amount per group in mm.
    pub fn amount(&mut self, params: Option<RateParams>) -> Result<TimeSeries<f64>, CaseError> {
        let intensity = self.intensity(params)?;
        let tdelta = self.gauge.tdelta(&self.groups, self.config.tdelta_cap());
        let pairs = intensity
            .iter()
            .filter_map(|(t, &r)| tdelta.at(t).map(|&h| (t, r * h)))
            .collect();
        Ok(TimeSeries::from_pairs(pairs).expect("intensity series is ordered"))
    }

    /// Cumulative particle-based accumulation in mm.
    pub fn acc(&mut self, params: Option<RateParams>) -> Result<TimeSeries<f64>, CaseError> {
        Ok(self.amount(params)?.cumsum())
    }

    /// Finds `(alpha, beta)` by reconciling particle and gauge
    /// accumulation, and stores the result for later use.
    pub fn minimize_lsq(&mut self) -> Result<AbFit, CaseError> {
        if self.groups.is_empty() {
            return Err(CaseError::EmptyRecord);
        }
        self.ensure_fits()?;

        // snapshot per-group integrand inputs so the beta closure is a
        // pure function
        let gauge_amount = self.gauge.amount(&self.groups);
        let tdelta = self.gauge.tdelta(&self.groups, self.config.tdelta_cap());
        let ids = self.grouped_psd.times().to_vec();
        let gauge_vals: Vec<f64> = ids
            .iter()
            .map(|&id| gauge_amount.at(id).copied().unwrap_or(f64::NAN))
            .collect();
        let hours: Vec<f64> = ids
            .iter()
            .map(|&id| tdelta.at(id).copied().unwrap_or(f64::NAN))
            .collect();
        let grid = self.grouped_psd.grid().clone();
        let rows: Vec<Vec<f64>> = (0..self.grouped_psd.n_rows())
            .map(|i| self.grouped_psd.row(i).to_vec())
            .collect();
        let velocities: Vec<Vec<f64>> = ids
            .iter()
            .map(|&id| match self.engine.fit_for(id) {
                Some(fit) => grid
                    .centers()
                    .iter()
                    .map(|&d| fit.velocity(&PowerLaw, d))
                    .collect(),
                None => vec![f64::NAN; grid.len()],
            })
            .collect();

        let particle_for_beta = |beta: f64| -> Vec<f64> {
            ids.iter()
                .enumerate()
                .map(|(i, _)| {
                    let rate: f64 = grid
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| rows[i][*j].is_finite())
                        .map(|(j, (d, w))| r_ab(d, 1.0, beta, velocities[i][j], rows[i][j]) * w)
                        .sum();
                    rate * hours[i]
                })
                .collect()
        };

        let fit = fit_alpha_beta(&gauge_vals, particle_for_beta, self.config.density())?;
        if !fit.converged {
            warn!(beta = fit.beta, "rate parameter search did not converge");
        }
        self.ab = Some((fit.alpha, fit.beta));
        Ok(fit)
    }

    /// Per-window bulk density in kg/m^3.
    pub fn density(&mut self) -> Result<TimeSeries<f64>, CaseError> {
        if let Some(series) = self.recall("density") {
            return Ok(series);
        }
        // reference amount at unit density; the rho kernel is linear in rho
        let particle_unit = self.amount(Some(RateParams::Rho(1.0)))?;
        let gauge_amount = self.gauge.amount(&self.groups);
        let gauge_intensity = self
            .gauge
            .intensity(&self.groups, self.config.tdelta_cap());
        let rho = lumi_density::density(
            &gauge_amount,
            &particle_unit,
            &gauge_intensity,
            self.config.density(),
        )?;
        self.remember("density", &rho);
        Ok(rho)
    }

    /// Normalized-gamma parameters per group.
    pub fn gamma_series(&self) -> TimeSeries<GammaPsdParams> {
        self.grouped_psd.gamma_series()
    }

    /// Joins the named derived series into one table on the union of
    /// their timestamps. Series that fail to compute are skipped with a
    /// warning; the batch never aborts on one bad window.
    pub fn summary(&mut self) -> Result<AlignedTable, CaseError> {
        let mut columns: Vec<(&str, TimeSeries<f64>)> = vec![
            (
                "intensity",
                self.gauge.intensity(&self.groups, self.config.tdelta_cap()),
            ),
            ("n_t", self.grouped_psd.nt_series()),
            ("d_0", self.grouped_psd.d0_series()),
            ("d_max", self.grouped_psd.d_max_series()),
        ];
        let gamma = self.gamma_series();
        columns.push(("mu", gamma.map(|p| p.mu)));
        columns.push(("lambda", gamma.map(|p| p.lambda)));
        columns.push(("n_0", gamma.map(|p| p.n0)));
        columns.push(("n_w", gamma.map(|p| p.nw)));
        columns.push(("d_m", gamma.map(|p| p.dm)));

        match self.density() {
            Ok(rho) => columns.push(("density", rho)),
            Err(err) => warn!(%err, "density unavailable, skipped in summary"),
        }
        if self.ab.is_some() {
            match self.intensity(None) {
                Ok(r) => columns.push(("pip_intensity", r)),
                Err(err) => warn!(%err, "particle intensity unavailable, skipped in summary"),
            }
        }

        let refs: Vec<(&str, &TimeSeries<f64>)> =
            columns.iter().map(|(n, s)| (*n, s)).collect();
        Ok(align_outer(&refs))
    }

    /// Rayleigh X-band reflectivity per group in dBZ.
    pub fn z_rayleigh_xband(&mut self) -> Result<TimeSeries<f64>, CaseError> {
        let density = self.density()?;
        let m6 = self.grouped_psd.moment_series(6);
        Ok(reflectivity::z_rayleigh_xband(&density, &m6))
    }

    /// Reflectivity through a scattering solver per group in dBZ.
    pub fn reflectivity_tmatrix<S: ScatteringSolver>(
        &mut self,
        solver: &S,
        wavelength_mm: f64,
    ) -> Result<TimeSeries<f64>, CaseError> {
        let density = self.density()?;
        Ok(reflectivity::reflectivity_tmatrix(
            solver,
            wavelength_mm,
            &density,
            &self.grouped_psd,
        ))
    }

    /// Evaluates the stored velocity fit for a group.
    pub fn velocity_at(&mut self, d: f64, group_id: Timestamp) -> Result<f64, CaseError> {
        self.ensure_fits()?;
        Ok(self.engine.velocity_at(d, group_id)?)
    }

    fn ensure_fits(&mut self) -> Result<(), CaseError> {
        self.engine.get_or_compute(&self.cloud, &self.groups)?;
        Ok(())
    }

    fn resolve_params(&self, params: Option<RateParams>) -> Result<RateParams, CaseError> {
        match params {
            Some(p) => Ok(p),
            None => self
                .ab
                .map(|(alpha, beta)| RateParams::AlphaBeta { alpha, beta })
                .ok_or(CaseError::MissingRateParams),
        }
    }

    fn recall(&self, name: &str) -> Option<TimeSeries<f64>> {
        if let Some(series) = self.memo.get(name) {
            return Some(series.clone());
        }
        let fingerprint = self.fingerprint();
        self.cache
            .as_ref()
            .and_then(|c| c.get(&fingerprint, name))
    }

    fn remember(&mut self, name: &str, series: &TimeSeries<f64>) {
        self.memo.insert(name.to_string(), series.clone());
        let fingerprint = self.fingerprint();
        if let Some(cache) = self.cache.as_mut() {
            cache.put(&fingerprint, name, series);
        }
    }
}
