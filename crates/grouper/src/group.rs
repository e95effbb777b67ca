//! Group assignment: tick-driven adaptive windows and fixed calendar bins.

use chrono::Duration;
use tracing::debug;

use lumi_timeseries::{bin_label_right, TimeSeries, TimeSpan, Timestamp};

use crate::error::GrouperError;
use crate::rule::AggregationRule;
use crate::ticks::extract_ticks;

/// One aggregation window.
///
/// For adaptive grouping the span is `[opening tick, next tick)`; the
/// trailing window closes one second after its last member sample. For
/// fixed grouping the span is the nominal `[label - rule, label)` extent
/// of a right-closed bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationGroup {
    id: Timestamp,
    span: TimeSpan,
    n_samples: usize,
}

impl AggregationGroup {
    /// Group identifier (opening tick timestamp or fixed-bin right label).
    pub fn id(&self) -> Timestamp {
        self.id
    }

    /// Window extent.
    pub fn span(&self) -> TimeSpan {
        self.span
    }

    /// Number of member gauge samples.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

/// The result of grouping: a per-sample group-id series plus the ordered,
/// non-overlapping window list.
#[derive(Debug, Clone)]
pub struct GroupMap {
    rule: AggregationRule,
    assignments: TimeSeries<Timestamp>,
    groups: Vec<AggregationGroup>,
}

impl GroupMap {
    /// An empty grouping (zero ticks in range is not an error).
    pub fn empty(rule: AggregationRule) -> Self {
        Self {
            rule,
            assignments: TimeSeries::empty(),
            groups: Vec::new(),
        }
    }

    /// The rule this map was built under.
    pub fn rule(&self) -> AggregationRule {
        self.rule
    }

    /// Returns `true` if no groups were formed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Windows in time order.
    pub fn groups(&self) -> &[AggregationGroup] {
        &self.groups
    }

    /// Group ids in time order.
    pub fn group_ids(&self) -> Vec<Timestamp> {
        self.groups.iter().map(|g| g.id()).collect()
    }

    /// Per-sample group assignment (sample timestamp -> group id).
    pub fn assignments(&self) -> &TimeSeries<Timestamp> {
        &self.assignments
    }

    /// Group id of a known gauge sample timestamp.
    pub fn group_of(&self, sample_time: Timestamp) -> Option<Timestamp> {
        self.assignments.at(sample_time).copied()
    }

    /// Group id covering an arbitrary timestamp (e.g. a velocity particle
    /// or a PSD row that is not a gauge sample).
    pub fn locate(&self, t: Timestamp) -> Option<Timestamp> {
        match self.rule {
            AggregationRule::Adaptive => {
                let idx = self.groups.partition_point(|g| g.span().start() <= t);
                if idx == 0 {
                    return None;
                }
                let g = &self.groups[idx - 1];
                g.span().contains(t).then(|| g.id())
            }
            AggregationRule::Fixed(rule) => {
                let label = bin_label_right(t, rule).ok()?;
                self.groups
                    .binary_search_by_key(&label, |g| g.id())
                    .ok()
                    .map(|i| self.groups[i].id())
            }
        }
    }

    /// Window extent for a group id.
    pub fn span_of(&self, id: Timestamp) -> Option<TimeSpan> {
        self.groups
            .binary_search_by_key(&id, |g| g.id())
            .ok()
            .map(|i| self.groups[i].span())
    }

    /// Window duration for a group id, capped at `cap` (long quiet spells
    /// between ticks would otherwise dominate rate calculations).
    pub fn duration_of(&self, id: Timestamp, cap: Duration) -> Option<Duration> {
        self.span_of(id).map(|s| s.duration().min(cap))
    }
}

fn validate_sorted(sample_times: &[Timestamp]) -> Result<(), GrouperError> {
    for (i, w) in sample_times.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(GrouperError::UnsortedSamples { index: i + 1 });
        }
    }
    Ok(())
}

/// Groups samples into variable-length windows demarcated by accumulation
/// ticks.
///
/// Every tick opens a new window; a sample belongs to the window of the
/// last tick at or before it. Samples before the first tick get no group.
/// The trailing window (no closing tick) is retained when it has at least
/// one member sample. An empty tick series yields an empty grouping.
pub fn group_adaptive(
    sample_times: &[Timestamp],
    tick_amounts: &TimeSeries<f64>,
) -> Result<GroupMap, GrouperError> {
    validate_sorted(sample_times)?;
    let ticks = extract_ticks(tick_amounts);
    if ticks.is_empty() {
        debug!("no accumulation ticks in range, empty grouping");
        return Ok(GroupMap::empty(AggregationRule::Adaptive));
    }
    let tick_times = ticks.times();

    let mut assignment_pairs = Vec::new();
    let mut counts = vec![0usize; tick_times.len()];
    let mut last_member: Vec<Option<Timestamp>> = vec![None; tick_times.len()];
    for &s in sample_times {
        // index of the tick opening the window containing s
        let idx = tick_times.partition_point(|&tt| tt <= s);
        if idx == 0 {
            continue; // before the first tick
        }
        let gi = idx - 1;
        assignment_pairs.push((s, tick_times[gi]));
        counts[gi] += 1;
        last_member[gi] = Some(s);
    }

    let mut groups = Vec::new();
    for (gi, &tick) in tick_times.iter().enumerate() {
        let span = if gi + 1 < tick_times.len() {
            TimeSpan::new(tick, tick_times[gi + 1]).expect("ticks strictly increasing")
        } else {
            // trailing partial window, kept only if it has members
            match last_member[gi] {
                Some(last) => TimeSpan::new(tick, last + Duration::seconds(1))
                    .expect("member sample at or after its opening tick"),
                None => continue,
            }
        };
        groups.push(AggregationGroup {
            id: tick,
            span,
            n_samples: counts[gi],
        });
    }

    let assignments =
        TimeSeries::from_pairs(assignment_pairs).expect("samples validated strictly increasing");
    Ok(GroupMap {
        rule: AggregationRule::Adaptive,
        assignments,
        groups,
    })
}

/// Groups samples into fixed-duration calendar bins (right-closed,
/// right-labeled); the group id is the bin's right boundary.
pub fn group_fixed(
    sample_times: &[Timestamp],
    rule: Duration,
) -> Result<GroupMap, GrouperError> {
    validate_sorted(sample_times)?;
    if rule.num_seconds() <= 0 {
        return Err(GrouperError::InvalidRule {
            seconds: rule.num_seconds(),
        });
    }

    let mut assignment_pairs = Vec::with_capacity(sample_times.len());
    let mut groups: Vec<AggregationGroup> = Vec::new();
    for &s in sample_times {
        let label = bin_label_right(s, rule).map_err(|_| GrouperError::InvalidRule {
            seconds: rule.num_seconds(),
        })?;
        assignment_pairs.push((s, label));
        match groups.last_mut() {
            Some(g) if g.id == label => g.n_samples += 1,
            _ => groups.push(AggregationGroup {
                id: label,
                span: TimeSpan::new(label - rule, label).expect("positive rule"),
                n_samples: 1,
            }),
        }
    }

    let assignments =
        TimeSeries::from_pairs(assignment_pairs).expect("samples validated strictly increasing");
    Ok(GroupMap {
        rule: AggregationRule::Fixed(rule),
        assignments,
        groups,
    })
}

/// Dispatches on the aggregation rule.
///
/// In adaptive mode the tick amounts drive the boundaries; in fixed mode
/// they are ignored and only the sample timestamps matter.
pub fn assign(
    rule: AggregationRule,
    sample_times: &[Timestamp],
    tick_amounts: &TimeSeries<f64>,
) -> Result<GroupMap, GrouperError> {
    rule.validate()?;
    match rule {
        AggregationRule::Adaptive => group_adaptive(sample_times, tick_amounts),
        AggregationRule::Fixed(d) => group_fixed(sample_times, d),
    }
}
