//! Builds a case from command-line inputs.

use anyhow::{bail, Result};
use chrono::Duration;
use tracing::info;

use lumi_case::{Case, CaseConfig, Instrument};
use lumi_grouper::AggregationRule;
use lumi_timeseries::TimeSpan;

use crate::cli::InputArgs;
use crate::input;

/// Reads the three instrument files and assembles a case, optionally
/// narrowed to the requested span.
pub fn build_case(args: &InputArgs) -> Result<Case> {
    let rule = match args.fixed {
        Some(seconds) => AggregationRule::Fixed(Duration::seconds(seconds)),
        None => AggregationRule::Adaptive,
    };
    let config = CaseConfig::new()
        .with_rule(rule)
        .with_n_combined(args.n_combined);

    info!(path = %args.gauge.display(), "reading gauge record");
    let gauge = input::read_gauge(&args.gauge)?;
    info!(path = %args.psd.display(), "reading PSD table");
    let psd = input::read_psd(&args.psd)?;
    info!(path = %args.velocity.display(), "reading velocity observations");
    let cloud = input::read_velocity(&args.velocity, config.vfit())?;
    info!(n_points = cloud.len(), "velocity observations loaded");

    let case = Case::new(gauge, psd, cloud, config)?;
    info!(
        n_groups = case.groups().n_groups(),
        fingerprint = %case.fingerprint(),
        "case assembled"
    );

    if args.start.is_none() && args.end.is_none() {
        return Ok(case);
    }
    let Some(full) = case.gauge().span() else {
        bail!("cannot narrow an empty gauge record");
    };
    let start = match &args.start {
        Some(raw) => input::parse_time(raw)?,
        None => full.start(),
    };
    let end = match &args.end {
        Some(raw) => input::parse_time(raw)?,
        None => full.end(),
    };
    let span = TimeSpan::new(start, end)?;
    info!(start = %start, end = %end, "narrowing analysis span");
    Ok(case.between(span)?)
}
