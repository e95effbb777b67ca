//! Fixed-rule resampling on calendar boundaries.
//!
//! Bins are right-closed and right-labeled: a sample at time `t` belongs to
//! the bin labeled with the smallest rule boundary `>= t`, and the boundary
//! itself belongs to its own bin. Bins without samples are absent from the
//! output, not zero.

use chrono::{DateTime, Duration, Utc};

use crate::error::TimeSeriesError;
use crate::series::TimeSeries;
use crate::span::Timestamp;

/// Right-closed, right-labeled bin label for `t` under `rule`.
///
/// Boundaries are multiples of `rule` since the Unix epoch, which lines up
/// with calendar boundaries for the usual rules (1min, 15min, 1h, ...).
pub fn bin_label_right(t: Timestamp, rule: Duration) -> Result<Timestamp, TimeSeriesError> {
    let step = rule.num_seconds();
    if step <= 0 {
        return Err(TimeSeriesError::InvalidRule { seconds: step });
    }
    let secs = t.timestamp();
    let label = if secs.rem_euclid(step) == 0 {
        secs
    } else {
        (secs.div_euclid(step) + 1) * step
    };
    // label is derived from a valid timestamp, so it stays in range
    Ok(DateTime::<Utc>::from_timestamp(label, 0).expect("bin label in valid range"))
}

fn resample_with(
    ts: &TimeSeries<f64>,
    rule: Duration,
    agg: impl Fn(&[f64]) -> f64,
) -> Result<TimeSeries<f64>, TimeSeriesError> {
    let mut times = Vec::new();
    let mut values = Vec::new();
    let mut bucket: Vec<f64> = Vec::new();
    let mut current: Option<Timestamp> = None;

    for (t, &v) in ts.iter() {
        let label = bin_label_right(t, rule)?;
        match current {
            Some(c) if c == label => bucket.push(v),
            Some(c) => {
                times.push(c);
                values.push(agg(&bucket));
                bucket.clear();
                bucket.push(v);
                current = Some(label);
            }
            None => {
                bucket.push(v);
                current = Some(label);
            }
        }
    }
    if let Some(c) = current {
        times.push(c);
        values.push(agg(&bucket));
    }
    TimeSeries::new(times, values)
}

/// Sum of non-NaN samples per bin; all-NaN bins yield NaN.
pub fn resample_sum(
    ts: &TimeSeries<f64>,
    rule: Duration,
) -> Result<TimeSeries<f64>, TimeSeriesError> {
    resample_with(ts, rule, |xs| {
        let finite: Vec<f64> = xs.iter().copied().filter(|v| !v.is_nan()).collect();
        if finite.is_empty() {
            f64::NAN
        } else {
            finite.iter().sum()
        }
    })
}

/// Mean of non-NaN samples per bin; all-NaN bins yield NaN.
pub fn resample_mean(
    ts: &TimeSeries<f64>,
    rule: Duration,
) -> Result<TimeSeries<f64>, TimeSeriesError> {
    resample_with(ts, rule, |xs| {
        let finite: Vec<f64> = xs.iter().copied().filter(|v| !v.is_nan()).collect();
        if finite.is_empty() {
            f64::NAN
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        }
    })
}

/// Last sample per bin.
pub fn resample_last(
    ts: &TimeSeries<f64>,
    rule: Duration,
) -> Result<TimeSeries<f64>, TimeSeriesError> {
    resample_with(ts, rule, |xs| *xs.last().expect("non-empty bin"))
}
