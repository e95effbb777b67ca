//! Particle fall velocity observations.

use std::collections::BTreeMap;

use chrono::Duration;

use lumi_grouper::GroupMap;
use lumi_timeseries::{bin_label_right, TimeSeries, TimeSpan, Timestamp};

use crate::config::VfitConfig;
use crate::error::VfitError;

/// One particle observation from the video imager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityPoint {
    /// Observation time (minute resolution, many particles per minute).
    pub time: Timestamp,
    /// Particle identifier within its record.
    pub particle_id: u32,
    /// Area-equivalent diameter in mm, geometry corrected.
    pub diameter: f64,
    /// Vertical fall velocity in m/s.
    pub velocity: f64,
}

/// A quality-filtered cloud of (diameter, velocity) particle observations.
///
/// Construction applies the quality cut: non-finite values, non-positive
/// velocities and diameters at or below the configured minimum are
/// dropped, and the remaining diameters are divided by the geometric
/// correction factor. All physics downstream sees corrected diameters.
#[derive(Debug, Clone, Default)]
pub struct VelocityPointCloud {
    points: Vec<VelocityPoint>,
}

impl VelocityPointCloud {
    /// Builds a cloud from raw observations, applying the quality cut and
    /// diameter correction.
    pub fn from_observations(
        observations: impl IntoIterator<Item = VelocityPoint>,
        config: &VfitConfig,
    ) -> Result<Self, VfitError> {
        config.validate()?;
        let correction = config.correction_factor();
        let points = observations
            .into_iter()
            .filter(|p| {
                p.diameter.is_finite()
                    && p.velocity.is_finite()
                    && p.velocity > 0.0
                    && p.diameter > config.d_min()
            })
            .map(|p| VelocityPoint {
                diameter: p.diameter / correction,
                ..p
            })
            .collect();
        Ok(Self { points })
    }

    /// A cloud from already-corrected points, no filtering.
    pub fn from_points(points: Vec<VelocityPoint>) -> Self {
        Self { points }
    }

    /// A cloud with no particles.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the cloud holds no particles.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All particles.
    pub fn points(&self) -> &[VelocityPoint] {
        &self.points
    }

    /// Particle diameters in mm.
    pub fn diameters(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.diameter).collect()
    }

    /// Particle fall velocities in m/s.
    pub fn velocities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.velocity).collect()
    }

    /// Observed diameter range, `None` for an empty cloud.
    pub fn d_range(&self) -> Option<(f64, f64)> {
        range_of(self.points.iter().map(|p| p.diameter))
    }

    /// Observed velocity range, `None` for an empty cloud.
    pub fn v_range(&self) -> Option<(f64, f64)> {
        range_of(self.points.iter().map(|p| p.velocity))
    }

    /// A new cloud holding only the particles inside `span`.
    pub fn between(&self, span: TimeSpan) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| span.contains(p.time))
                .copied()
                .collect(),
        }
    }

    /// Splits the cloud by aggregation group. Particles outside every
    /// group are dropped.
    pub fn partition(&self, map: &GroupMap) -> BTreeMap<Timestamp, VelocityPointCloud> {
        let mut out: BTreeMap<Timestamp, VelocityPointCloud> = BTreeMap::new();
        for p in &self.points {
            if let Some(id) = map.locate(p.time) {
                out.entry(id).or_default().points.push(*p);
            }
        }
        out
    }

    /// Particles whose diameter falls in the open bin
    /// `(center - width/2, center + width/2)`, optionally restricted to an
    /// open velocity band.
    pub fn points_in_bin(
        &self,
        center: f64,
        width: f64,
        v_band: Option<(f64, f64)>,
    ) -> Vec<&VelocityPoint> {
        let lo = center - 0.5 * width;
        let hi = center + 0.5 * width;
        self.points
            .iter()
            .filter(|p| p.diameter > lo && p.diameter < hi)
            .filter(|p| match v_band {
                Some((vmin, vmax)) => p.velocity > vmin && p.velocity < vmax,
                None => true,
            })
            .collect()
    }

    /// Liquid-water-content proxy: sum of diameter cubed per fixed time
    /// bin (right-closed, right-labeled). Units are mm^3 per bin.
    pub fn lwc(&self, rule: Duration) -> Result<TimeSeries<f64>, VfitError> {
        if rule.num_seconds() <= 0 {
            return Err(VfitError::InvalidRule {
                seconds: rule.num_seconds(),
            });
        }
        let mut bins: BTreeMap<Timestamp, f64> = BTreeMap::new();
        for p in &self.points {
            let label = bin_label_right(p.time, rule).map_err(|_| VfitError::InvalidRule {
                seconds: rule.num_seconds(),
            })?;
            *bins.entry(label).or_insert(0.0) += p.diameter.powi(3);
        }
        Ok(TimeSeries::from_pairs(bins.into_iter().collect())
            .expect("BTreeMap keys are strictly increasing"))
    }
}

fn range_of(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut out: Option<(f64, f64)> = None;
    for v in values {
        out = Some(match out {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use lumi_grouper::group_adaptive;

    fn t(min: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
    }

    fn point(min: i64, d: f64, v: f64) -> VelocityPoint {
        VelocityPoint {
            time: t(min),
            particle_id: 0,
            diameter: d,
            velocity: v,
        }
    }

    #[test]
    fn quality_cut() {
        let raw = vec![
            point(0, 1.0, 1.2),
            point(0, 0.2, 1.0),        // below d_min
            point(1, 2.0, -0.5),       // falling upward
            point(1, f64::NAN, 1.0),   // bad diameter
            point(2, 1.5, f64::NAN),   // bad velocity
            point(2, 3.0, 0.8),
        ];
        let cloud = VelocityPointCloud::from_observations(raw, &VfitConfig::new()).unwrap();
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn diameter_correction_applied() {
        let raw = vec![point(0, 2.0, 1.0)];
        let config = VfitConfig::new().with_correction_factor(1.25);
        let cloud = VelocityPointCloud::from_observations(raw, &config).unwrap();
        assert_relative_eq!(cloud.points()[0].diameter, 1.6);
    }

    #[test]
    fn between_is_half_open() {
        let cloud = VelocityPointCloud::from_points(vec![
            point(0, 1.0, 1.0),
            point(5, 1.0, 1.0),
            point(10, 1.0, 1.0),
        ]);
        let span = TimeSpan::new(t(0), t(10)).unwrap();
        assert_eq!(cloud.between(span).len(), 2);
    }

    #[test]
    fn partition_by_groups() {
        let cloud = VelocityPointCloud::from_points(vec![
            point(0, 1.0, 1.0), // before first tick, dropped
            point(3, 1.0, 1.0),
            point(4, 1.0, 1.0),
            point(8, 1.0, 1.0),
        ]);
        let samples: Vec<Timestamp> = (0..10).map(t).collect();
        let ticks = TimeSeries::new(vec![t(2), t(7)], vec![0.2, 0.1]).unwrap();
        let map = group_adaptive(&samples, &ticks).unwrap();
        let parts = cloud.partition(&map);
        assert_eq!(parts[&t(2)].len(), 2);
        assert_eq!(parts[&t(7)].len(), 1);
    }

    #[test]
    fn bin_extraction_with_velocity_band() {
        let cloud = VelocityPointCloud::from_points(vec![
            point(0, 1.0, 1.0),
            point(0, 1.02, 5.0),
            point(0, 2.0, 1.0),
        ]);
        let all = cloud.points_in_bin(1.0, 0.1, None);
        assert_eq!(all.len(), 2);
        let banded = cloud.points_in_bin(1.0, 0.1, Some((0.5, 2.0)));
        assert_eq!(banded.len(), 1);
        assert_relative_eq!(banded[0].velocity, 1.0);
    }

    #[test]
    fn lwc_sums_cubes_per_bin() {
        let cloud = VelocityPointCloud::from_points(vec![
            point(1, 1.0, 1.0),
            point(2, 2.0, 1.0),
            point(16, 1.0, 1.0),
        ]);
        let lwc = cloud.lwc(Duration::minutes(15)).unwrap();
        assert_eq!(lwc.len(), 2);
        assert_eq!(lwc.times(), &[t(15), t(30)]);
        assert_relative_eq!(lwc.values()[0], 9.0);
        assert_relative_eq!(lwc.values()[1], 1.0);
    }

    #[test]
    fn lwc_rejects_bad_rule() {
        let cloud = VelocityPointCloud::from_points(vec![point(0, 1.0, 1.0)]);
        assert!(matches!(
            cloud.lwc(Duration::zero()),
            Err(VfitError::InvalidRule { seconds: 0 })
        ));
    }
}
