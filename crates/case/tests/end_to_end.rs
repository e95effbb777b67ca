//! Full-pipeline scenarios: gauge ticks drive the grouping, the
//! velocity fits and the PSD integrals feed the derived series.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{Duration, TimeZone, Utc};
use ndarray::Array2;

use lumi_case::{Case, CaseConfig, CaseError, GaugeSeries, RateParams};
use lumi_density::r_ab;
use lumi_psd::{BinGrid, PsdTable};
use lumi_timeseries::{TimeSeries, Timestamp};
use lumi_vfit::{VelocityPoint, VelocityPointCloud};

fn t(min: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
}

fn gauge_with_ticks(ticks: &[(i64, f64)]) -> GaugeSeries {
    let times: Vec<Timestamp> = (0..=20).map(t).collect();
    let mut values = vec![0.0; times.len()];
    for &(min, amount) in ticks {
        values[min as usize] = amount;
    }
    GaugeSeries::new(TimeSeries::new(times, values).unwrap())
}

fn grid() -> BinGrid {
    BinGrid::uniform(0.5, 0.5, 4).unwrap()
}

/// Flat PSD: the same concentration in every bin at every minute.
fn flat_psd(n: f64) -> PsdTable {
    let times: Vec<Timestamp> = (0..=20).map(t).collect();
    let values = Array2::from_elem((times.len(), 4), n);
    PsdTable::new(times, grid(), values).unwrap()
}

/// Noiseless observations on v = d^0.5, spread over every minute.
fn power_law_cloud() -> VelocityPointCloud {
    let mut points = Vec::new();
    let mut id = 0u32;
    for min in 0..=20 {
        for i in 0..12 {
            let d = 0.5 + 0.17 * i as f64;
            points.push(VelocityPoint {
                time: t(min),
                particle_id: id,
                diameter: d,
                velocity: d.sqrt(),
            });
            id += 1;
        }
    }
    VelocityPointCloud::from_points(points)
}

#[test]
fn density_reconciles_gauge_and_particle_amounts() {
    let gauge = gauge_with_ticks(&[(2, 0.2), (12, 0.3)]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    assert_eq!(case.groups().group_ids(), vec![t(2), t(12)]);

    let particle_unit = case.amount(Some(RateParams::Rho(1.0))).unwrap();
    let rho = case.density().unwrap();
    assert_eq!(rho.times(), particle_unit.times());

    // rho is the ratio that makes the particle amount match the gauge
    let gauge_amounts = [0.2, 0.3];
    for i in 0..2 {
        let reconstructed = rho.values()[i] * particle_unit.values()[i];
        assert!(rho.values()[i] > 0.0);
        assert_relative_eq!(reconstructed, gauge_amounts[i], max_relative = 1e-9);
    }
}

#[test]
fn density_masked_when_gauge_intensity_is_low() {
    // 0.001 mm over ten minutes is 0.006 mm/h, far below the 0.1 mm/h floor
    let gauge = gauge_with_ticks(&[(2, 0.001), (12, 0.001)]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    let rho = case.density().unwrap();
    assert!(rho.values().iter().all(|v| v.is_nan()));
}

#[test]
fn minimize_lsq_recovers_rate_parameters() {
    let alpha_true = 0.004;
    let beta_true = 1.8;

    // per-group PSD shapes differ so beta is identifiable
    let shapes: [[f64; 4]; 3] = [
        [200.0, 100.0, 50.0, 10.0],
        [50.0, 100.0, 150.0, 100.0],
        [10.0, 50.0, 100.0, 200.0],
    ];
    let times: Vec<Timestamp> = (0..=20).map(t).collect();
    let mut values = Array2::zeros((times.len(), 4));
    for (i, _) in times.iter().enumerate() {
        let shape = match i {
            0..=11 => shapes[0],
            12..=17 => shapes[1],
            _ => shapes[2],
        };
        for j in 0..4 {
            values[[i, j]] = shape[j];
        }
    }
    let psd = PsdTable::new(times, grid(), values).unwrap();

    // windows: [t2, t12), [t12, t18), [t18, t20 + 1s)
    let hours = [600.0 / 3600.0, 360.0 / 3600.0, 121.0 / 3600.0];
    let amounts: Vec<f64> = shapes
        .iter()
        .zip(hours)
        .map(|(shape, h)| {
            let rate: f64 = grid()
                .iter()
                .zip(shape)
                .map(|((d, w), &n)| r_ab(d, alpha_true, beta_true, d.sqrt(), n) * w)
                .sum();
            rate * h
        })
        .collect();

    let gauge = gauge_with_ticks(&[(2, amounts[0]), (12, amounts[1]), (18, amounts[2])]);
    let mut case = Case::new(gauge, psd, power_law_cloud(), CaseConfig::new()).unwrap();
    let fit = case.minimize_lsq().unwrap();

    assert!(fit.converged);
    assert_abs_diff_eq!(fit.beta, beta_true, epsilon = 0.05);
    assert_relative_eq!(fit.alpha, alpha_true, max_relative = 0.05);
    assert_eq!(case.ab(), Some((fit.alpha, fit.beta)));

    // stored parameters now feed the particle intensity
    let intensity = case.intensity(None).unwrap();
    assert_eq!(intensity.len(), 3);
    assert!(intensity.values().iter().all(|v| v.is_finite()));
}

#[test]
fn intensity_requires_stored_parameters() {
    let gauge = gauge_with_ticks(&[(2, 0.2)]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    assert!(matches!(
        case.intensity(None),
        Err(CaseError::MissingRateParams)
    ));
}

#[test]
fn summary_joins_derived_series() {
    let gauge = gauge_with_ticks(&[(2, 0.2), (12, 0.3)]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    let table = case.summary().unwrap();

    for name in [
        "intensity", "n_t", "d_0", "d_max", "mu", "lambda", "n_0", "n_w", "d_m", "density",
    ] {
        assert!(
            table.column_by_name(name).is_some(),
            "missing column {name}"
        );
    }
    // no stored rate parameters, so no particle intensity column
    assert!(table.column_by_name("pip_intensity").is_none());
    assert_eq!(table.times(), &[t(2), t(12)]);
}

#[test]
fn rayleigh_reflectivity_follows_density() {
    let gauge = gauge_with_ticks(&[(2, 0.2), (12, 0.3)]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    let z = case.z_rayleigh_xband().unwrap();
    assert_eq!(z.len(), 2);
    assert!(z.values().iter().all(|v| v.is_finite()));
}

#[test]
fn empty_gauge_record_yields_no_groups() {
    let gauge = gauge_with_ticks(&[]);
    let mut case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    assert!(case.groups().is_empty());
    assert!(matches!(case.minimize_lsq(), Err(CaseError::EmptyRecord)));
}

#[test]
fn narrowing_rebuilds_the_grouping() {
    let gauge = gauge_with_ticks(&[(2, 0.2), (12, 0.3)]);
    let case = Case::new(gauge, flat_psd(100.0), power_law_cloud(), CaseConfig::new()).unwrap();
    let narrowed = case
        .between(lumi_timeseries::TimeSpan::new(t(0), t(10)).unwrap())
        .unwrap();
    assert_eq!(narrowed.groups().group_ids(), vec![t(2)]);
    // the original is untouched
    assert_eq!(case.groups().n_groups(), 2);
}
