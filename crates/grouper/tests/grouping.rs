//! Integration tests for tick-driven grouping.

use chrono::{Duration, TimeZone, Utc};
use lumi_grouper::{assign, group_adaptive, pool_ticks, AggregationRule};
use lumi_timeseries::{TimeSeries, Timestamp};

fn t(min: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
}

fn series(minutes: &[i64], values: &[f64]) -> TimeSeries<f64> {
    TimeSeries::new(minutes.iter().map(|&m| t(m)).collect(), values.to_vec()).unwrap()
}

#[test]
fn regrouping_on_group_boundaries_is_idempotent() {
    // A tick series with irregular spacing and interleaved zero samples.
    let samples: Vec<Timestamp> = (0..60).map(t).collect();
    let ticks = series(&[3, 7, 8, 21, 40, 55], &[0.1, 0.2, 0.1, 0.3, 0.2, 0.1]);
    let first = group_adaptive(&samples, &ticks).unwrap();

    // Collapse each group to a single tick at its id and regroup.
    let boundary_ticks = TimeSeries::new(
        first.group_ids(),
        vec![1.0; first.n_groups()],
    )
    .unwrap();
    let second = group_adaptive(&samples, &boundary_ticks).unwrap();

    assert_eq!(second.group_ids(), first.group_ids());
    for id in first.group_ids() {
        assert_eq!(second.span_of(id), first.span_of(id));
    }
}

#[test]
fn trailing_partial_group_is_retained() {
    let samples: Vec<Timestamp> = (0..10).map(t).collect();
    let ticks = series(&[2, 6], &[0.2, 0.3]);
    let map = group_adaptive(&samples, &ticks).unwrap();
    assert_eq!(map.group_ids(), vec![t(2), t(6)]);
    // trailing window extends one second past its last member sample
    let span = map.span_of(t(6)).unwrap();
    assert_eq!(span.end(), t(9) + Duration::seconds(1));
    assert!(span.contains(t(9)));
}

#[test]
fn quiet_record_yields_empty_grouping() {
    let samples: Vec<Timestamp> = (0..30).map(t).collect();
    let ticks = series(&[0, 10, 20], &[0.0, 0.0, 0.0]);
    let map = group_adaptive(&samples, &ticks).unwrap();
    assert!(map.is_empty());
    assert!(map.assignments().is_empty());
}

#[test]
fn samples_before_first_tick_are_unassigned() {
    let samples: Vec<Timestamp> = (0..10).map(t).collect();
    let ticks = series(&[5], &[0.2]);
    let map = group_adaptive(&samples, &ticks).unwrap();
    for m in 0..5 {
        assert_eq!(map.group_of(t(m)), None);
    }
    for m in 5..10 {
        assert_eq!(map.group_of(t(m)), Some(t(5)));
    }
}

#[test]
fn pooled_ticks_merge_adjacent_groups() {
    let samples: Vec<Timestamp> = (0..40).map(t).collect();
    let raw = series(&[2, 9, 17, 25], &[0.1, 0.2, 0.1, 0.3]);

    let fine = group_adaptive(&samples, &raw).unwrap();
    assert_eq!(fine.n_groups(), 4);

    let pooled = pool_ticks(&raw, 2).unwrap();
    let coarse = group_adaptive(&samples, &pooled).unwrap();
    // pooled ticks carry the closing timestamp of each block
    assert_eq!(coarse.group_ids(), vec![t(9), t(25)]);
    approx::assert_relative_eq!(pooled.values()[0], 0.3);
    approx::assert_relative_eq!(pooled.values()[1], 0.4);
}

#[test]
fn fixed_rule_labels_on_calendar_boundaries() {
    let samples = vec![t(1), t(7), t(14), t(15), t(29), t(31)];
    let ticks = series(&[1], &[0.2]);
    let map = assign(
        AggregationRule::Fixed(Duration::minutes(15)),
        &samples,
        &ticks,
    )
    .unwrap();
    assert_eq!(map.group_ids(), vec![t(15), t(30), t(45)]);
    assert_eq!(map.group_of(t(15)), Some(t(15)));
    assert_eq!(map.group_of(t(29)), Some(t(30)));
}
