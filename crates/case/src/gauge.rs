//! Weighing gauge record.

use chrono::Duration;

use lumi_grouper::{extract_ticks, pool_ticks, GroupMap, GrouperError};
use lumi_timeseries::{TimeSeries, TimeSpan, Timestamp};

use crate::collab::Instrument;

/// A precipitation gauge record: per-sample accumulation increments in
/// mm (mostly zero, with discrete bucket ticks).
#[derive(Debug, Clone)]
pub struct GaugeSeries {
    amounts: TimeSeries<f64>,
}

impl GaugeSeries {
    /// Wraps a per-sample accumulation increment series.
    pub fn new(amounts: TimeSeries<f64>) -> Self {
        Self { amounts }
    }

    /// The raw increment series.
    pub fn amounts(&self) -> &TimeSeries<f64> {
        &self.amounts
    }

    /// Sample timestamps.
    pub fn sample_times(&self) -> &[Timestamp] {
        self.amounts.times()
    }

    /// Accumulation ticks, optionally pooled `n` at a time.
    pub fn ticks(&self, n_combined: usize) -> Result<TimeSeries<f64>, GrouperError> {
        pool_ticks(&self.amounts, n_combined)
    }

    /// Accumulated amount per aggregation group in mm: the sum of all
    /// tick increments inside each window, keyed by group id.
    pub fn amount(&self, map: &GroupMap) -> TimeSeries<f64> {
        let ticks = extract_ticks(&self.amounts);
        let mut pairs: Vec<(Timestamp, f64)> =
            map.groups().iter().map(|g| (g.id(), 0.0)).collect();
        for (t, &v) in ticks.iter() {
            if let Some(id) = map.locate(t) {
                if let Ok(i) = pairs.binary_search_by_key(&id, |p| p.0) {
                    pairs[i].1 += v;
                }
            }
        }
        TimeSeries::from_pairs(pairs).expect("group ids are strictly increasing")
    }

    /// Cumulative accumulation over the groups in mm.
    pub fn acc(&self, map: &GroupMap) -> TimeSeries<f64> {
        self.amount(map).cumsum()
    }

    /// Group durations in hours, capped so quiet spells between ticks
    /// do not dilute rate estimates.
    pub fn tdelta(&self, map: &GroupMap, cap: Duration) -> TimeSeries<f64> {
        let pairs = map
            .groups()
            .iter()
            .map(|g| {
                let d = map.duration_of(g.id(), cap).expect("own group id");
                (g.id(), d.num_seconds() as f64 / 3600.0)
            })
            .collect();
        TimeSeries::from_pairs(pairs).expect("group ids are strictly increasing")
    }

    /// Mean precipitation intensity per group in mm/h.
    pub fn intensity(&self, map: &GroupMap, cap: Duration) -> TimeSeries<f64> {
        let amount = self.amount(map);
        let tdelta = self.tdelta(map, cap);
        let values = amount
            .values()
            .iter()
            .zip(tdelta.values())
            .map(|(&a, &h)| a / h)
            .collect();
        TimeSeries::new(amount.times().to_vec(), values).expect("amount series is ordered")
    }
}

impl Instrument for GaugeSeries {
    fn name(&self) -> &'static str {
        "gauge"
    }

    fn span(&self) -> Option<TimeSpan> {
        let (first, last) = (self.amounts.first_time()?, self.amounts.last_time()?);
        TimeSpan::new(first, last + Duration::seconds(1)).ok()
    }

    fn narrowed(&self, span: TimeSpan) -> Self {
        Self {
            amounts: self.amounts.between(span),
        }
    }
}
