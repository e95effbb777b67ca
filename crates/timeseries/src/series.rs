//! Ordered (timestamp, value) sequences.

use crate::error::TimeSeriesError;
use crate::span::{TimeSpan, Timestamp};

/// An ordered sequence of (timestamp, value) pairs with strictly increasing
/// timestamps.
///
/// Gaps are absent samples, not zeros. For `f64` payloads a missing value is
/// represented as NaN and propagates through arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T = f64> {
    times: Vec<Timestamp>,
    values: Vec<T>,
}

impl<T> TimeSeries<T> {
    /// Creates a new series after validating that `times` and `values` have
    /// equal length and that timestamps are strictly increasing.
    pub fn new(times: Vec<Timestamp>, values: Vec<T>) -> Result<Self, TimeSeriesError> {
        if times.len() != values.len() {
            return Err(TimeSeriesError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        for (i, w) in times.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(TimeSeriesError::NotMonotonic { index: i + 1 });
            }
        }
        Ok(Self { times, values })
    }

    /// An empty series.
    pub fn empty() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns `true` if the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Timestamps, strictly increasing.
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// Values, in timestamp order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// First timestamp, or `None` if empty.
    pub fn first_time(&self) -> Option<Timestamp> {
        self.times.first().copied()
    }

    /// Last timestamp, or `None` if empty.
    pub fn last_time(&self) -> Option<Timestamp> {
        self.times.last().copied()
    }

    /// Iterates over (timestamp, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, &T)> {
        self.times.iter().copied().zip(self.values.iter())
    }

    /// Value at an exact timestamp, via binary search.
    pub fn at(&self, t: Timestamp) -> Option<&T> {
        self.times.binary_search(&t).ok().map(|i| &self.values[i])
    }

    /// Maps values into a new series with the same timestamps.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> TimeSeries<U> {
        TimeSeries {
            times: self.times.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Builds a new series restricted to samples inside `span`.
    ///
    /// This is value construction, not in-place mutation: the original
    /// series is left untouched.
    pub fn between(&self, span: TimeSpan) -> TimeSeries<T> {
        let mut times = Vec::new();
        let mut values = Vec::new();
        for (t, v) in self.iter() {
            if span.contains(t) {
                times.push(t);
                values.push(v.clone());
            }
        }
        TimeSeries { times, values }
    }

    /// Builds a series from (timestamp, value) pairs, validating ordering.
    pub fn from_pairs(pairs: Vec<(Timestamp, T)>) -> Result<Self, TimeSeriesError> {
        let (times, values) = pairs.into_iter().unzip();
        Self::new(times, values)
    }
}

impl TimeSeries<f64> {
    /// First differences. The first sample becomes NaN so timestamps stay
    /// aligned with the source series.
    pub fn diff(&self) -> TimeSeries<f64> {
        let mut values = Vec::with_capacity(self.len());
        for (i, &v) in self.values.iter().enumerate() {
            if i == 0 {
                values.push(f64::NAN);
            } else {
                values.push(v - self.values[i - 1]);
            }
        }
        TimeSeries {
            times: self.times.clone(),
            values,
        }
    }

    /// Cumulative sum. NaN samples stay NaN and are skipped by the running
    /// total, so a missing sample does not poison the rest of the series.
    pub fn cumsum(&self) -> TimeSeries<f64> {
        let mut total = 0.0;
        let values = self
            .values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    f64::NAN
                } else {
                    total += v;
                    total
                }
            })
            .collect();
        TimeSeries {
            times: self.times.clone(),
            values,
        }
    }

    /// Sum of non-NaN values.
    pub fn nansum(&self) -> f64 {
        self.values.iter().filter(|v| !v.is_nan()).sum()
    }
}

/// A set of series aligned on the union of their timestamps.
///
/// Missing samples are NaN. Column order follows the input order.
#[derive(Debug, Clone)]
pub struct AlignedTable {
    times: Vec<Timestamp>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl AlignedTable {
    /// Timestamps (union of all inputs).
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// Column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column values by position.
    pub fn column(&self, i: usize) -> &[f64] {
        &self.columns[i]
    }

    /// Column values by name.
    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Merges named series into one table on the union of their timestamps
/// (outer join, NaN where a series has no sample).
pub fn align_outer(series: &[(&str, &TimeSeries<f64>)]) -> AlignedTable {
    let mut times: Vec<Timestamp> = series
        .iter()
        .flat_map(|(_, s)| s.times().iter().copied())
        .collect();
    times.sort_unstable();
    times.dedup();

    let mut names = Vec::with_capacity(series.len());
    let mut columns = Vec::with_capacity(series.len());
    for (name, s) in series {
        names.push(name.to_string());
        let col = times
            .iter()
            .map(|&t| s.at(t).copied().unwrap_or(f64::NAN))
            .collect();
        columns.push(col);
    }
    AlignedTable {
        times,
        names,
        columns,
    }
}

/// Restricts two series to their common timestamps (inner join).
pub fn align_inner(a: &TimeSeries<f64>, b: &TimeSeries<f64>) -> (TimeSeries<f64>, TimeSeries<f64>) {
    let mut times = Vec::new();
    let mut av = Vec::new();
    let mut bv = Vec::new();
    for (t, &x) in a.iter() {
        if let Some(&y) = b.at(t) {
            times.push(t);
            av.push(x);
            bv.push(y);
        }
    }
    (
        TimeSeries {
            times: times.clone(),
            values: av,
        },
        TimeSeries { times, values: bv },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn t(min: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
    }

    fn series(minutes: &[i64], values: &[f64]) -> TimeSeries<f64> {
        TimeSeries::new(minutes.iter().map(|&m| t(m)).collect(), values.to_vec()).unwrap()
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let r = TimeSeries::new(vec![t(0)], vec![1.0, 2.0]);
        assert!(matches!(r, Err(TimeSeriesError::LengthMismatch { .. })));
    }

    #[test]
    fn new_rejects_unsorted() {
        let r = TimeSeries::new(vec![t(1), t(0)], vec![1.0, 2.0]);
        assert!(matches!(
            r,
            Err(TimeSeriesError::NotMonotonic { index: 1 })
        ));
    }

    #[test]
    fn new_rejects_duplicates() {
        let r = TimeSeries::new(vec![t(0), t(0)], vec![1.0, 2.0]);
        assert!(matches!(r, Err(TimeSeriesError::NotMonotonic { .. })));
    }

    #[test]
    fn between_is_half_open() {
        let s = series(&[0, 5, 10, 15], &[1.0, 2.0, 3.0, 4.0]);
        let span = TimeSpan::new(t(5), t(15)).unwrap();
        let cut = s.between(span);
        assert_eq!(cut.times(), &[t(5), t(10)]);
        assert_eq!(cut.values(), &[2.0, 3.0]);
        // original untouched
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn diff_keeps_alignment() {
        let s = series(&[0, 1, 2], &[1.0, 3.0, 6.0]);
        let d = s.diff();
        assert_eq!(d.times(), s.times());
        assert!(d.values()[0].is_nan());
        assert_relative_eq!(d.values()[1], 2.0);
        assert_relative_eq!(d.values()[2], 3.0);
    }

    #[test]
    fn cumsum_skips_nan() {
        let s = series(&[0, 1, 2], &[1.0, f64::NAN, 2.0]);
        let c = s.cumsum();
        assert_relative_eq!(c.values()[0], 1.0);
        assert!(c.values()[1].is_nan());
        assert_relative_eq!(c.values()[2], 3.0);
    }

    #[test]
    fn align_outer_fills_nan() {
        let a = series(&[0, 10], &[1.0, 2.0]);
        let b = series(&[0, 5], &[10.0, 20.0]);
        let table = align_outer(&[("a", &a), ("b", &b)]);
        assert_eq!(table.times(), &[t(0), t(5), t(10)]);
        let col_a = table.column_by_name("a").unwrap();
        let col_b = table.column_by_name("b").unwrap();
        assert_relative_eq!(col_a[0], 1.0);
        assert!(col_a[1].is_nan());
        assert_relative_eq!(col_a[2], 2.0);
        assert_relative_eq!(col_b[1], 20.0);
        assert!(col_b[2].is_nan());
    }

    #[test]
    fn align_inner_common_timestamps() {
        let a = series(&[0, 5, 10], &[1.0, 2.0, 3.0]);
        let b = series(&[5, 10, 15], &[20.0, 30.0, 40.0]);
        let (ai, bi) = align_inner(&a, &b);
        assert_eq!(ai.times(), &[t(5), t(10)]);
        assert_eq!(ai.values(), &[2.0, 3.0]);
        assert_eq!(bi.values(), &[20.0, 30.0]);
    }

    #[test]
    fn at_exact_lookup() {
        let s = series(&[0, 5], &[1.0, 2.0]);
        assert_eq!(s.at(t(5)), Some(&2.0));
        assert_eq!(s.at(t(3)), None);
    }

    #[test]
    fn empty_series() {
        let s = TimeSeries::<f64>::empty();
        assert!(s.is_empty());
        assert_eq!(s.first_time(), None);
    }
}
