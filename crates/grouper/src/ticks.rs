//! Accumulation tick extraction and pooling.

use lumi_timeseries::TimeSeries;

use crate::error::GrouperError;

/// Extracts tick samples (finite, strictly positive accumulation) from a
/// gauge amount series.
pub fn extract_ticks(amounts: &TimeSeries<f64>) -> TimeSeries<f64> {
    let mut pairs = Vec::new();
    for (t, &v) in amounts.iter() {
        if v.is_finite() && v > 0.0 {
            pairs.push((t, v));
        }
    }
    TimeSeries::from_pairs(pairs).expect("subset of a valid series stays ordered")
}

/// Pools every `n` consecutive ticks into one, summing their amounts and
/// keeping the timestamp of the last tick in each block.
///
/// This reduces quantization noise from the gauge bucket resolution at the
/// cost of coarser windows. A trailing block of fewer than `n` ticks is
/// dropped. `n = 1` only strips non-tick samples.
pub fn pool_ticks(amounts: &TimeSeries<f64>, n: usize) -> Result<TimeSeries<f64>, GrouperError> {
    if n == 0 {
        return Err(GrouperError::InvalidPooling { n });
    }
    let ticks = extract_ticks(amounts);
    if n == 1 {
        return Ok(ticks);
    }
    let mut pairs = Vec::new();
    let times = ticks.times();
    let values = ticks.values();
    let mut i = 0;
    while i + n <= times.len() {
        let total: f64 = values[i..i + n].iter().sum();
        pairs.push((times[i + n - 1], total));
        i += n;
    }
    Ok(TimeSeries::from_pairs(pairs).expect("pooled ticks stay ordered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use lumi_timeseries::Timestamp;

    fn t(min: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
    }

    fn series(minutes: &[i64], values: &[f64]) -> TimeSeries<f64> {
        TimeSeries::new(minutes.iter().map(|&m| t(m)).collect(), values.to_vec()).unwrap()
    }

    #[test]
    fn extract_drops_zeros_and_nan() {
        let s = series(&[0, 1, 2, 3], &[0.0, 0.2, f64::NAN, 0.3]);
        let ticks = extract_ticks(&s);
        assert_eq!(ticks.times(), &[t(1), t(3)]);
    }

    #[test]
    fn pool_pairs_ticks() {
        let s = series(&[0, 5, 10, 15, 20], &[0.1, 0.2, 0.3, 0.4, 0.5]);
        let pooled = pool_ticks(&s, 2).unwrap();
        // blocks (0,5) and (10,15); trailing tick at 20 dropped
        assert_eq!(pooled.times(), &[t(5), t(15)]);
        assert_relative_eq!(pooled.values()[0], 0.3);
        assert_relative_eq!(pooled.values()[1], 0.7);
    }

    #[test]
    fn pool_identity() {
        let s = series(&[0, 5], &[0.1, 0.0]);
        let pooled = pool_ticks(&s, 1).unwrap();
        assert_eq!(pooled.times(), &[t(0)]);
    }

    #[test]
    fn pool_zero_rejected() {
        let s = series(&[0], &[0.1]);
        assert!(matches!(
            pool_ticks(&s, 0),
            Err(GrouperError::InvalidPooling { n: 0 })
        ));
    }
}
