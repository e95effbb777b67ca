//! Particle size distribution table.

use ndarray::{Array2, ArrayView1};

use lumi_grouper::GroupMap;
use lumi_timeseries::{TimeSpan, Timestamp};

use crate::error::PsdError;

/// Diameter bin grid: strictly increasing centers with per-bin widths.
/// Widths need not be uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct BinGrid {
    centers: Vec<f64>,
    widths: Vec<f64>,
}

impl BinGrid {
    /// Creates a grid from centers and widths.
    pub fn new(centers: Vec<f64>, widths: Vec<f64>) -> Result<Self, PsdError> {
        if centers.len() != widths.len() {
            return Err(PsdError::GridLengthMismatch {
                centers: centers.len(),
                widths: widths.len(),
            });
        }
        for (i, w) in centers.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(PsdError::UnsortedBins { index: i + 1 });
            }
        }
        for (i, &w) in widths.iter().enumerate() {
            if !(w.is_finite() && w > 0.0) {
                return Err(PsdError::InvalidWidth { index: i, width: w });
            }
        }
        Ok(Self { centers, widths })
    }

    /// An evenly spaced grid of `n` bins starting at `start` with
    /// spacing `step`.
    pub fn uniform(start: f64, step: f64, n: usize) -> Result<Self, PsdError> {
        let centers = (0..n).map(|i| start + step * i as f64).collect();
        Self::new(centers, vec![step; n])
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Returns `true` for a grid with no bins.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Bin center diameters in mm.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Bin widths in mm.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Iterates over (center, width) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.centers.iter().copied().zip(self.widths.iter().copied())
    }
}

/// Time-resolved particle size distribution: one concentration row per
/// timestamp over a shared bin grid. Concentrations are 1/(mm m^3).
#[derive(Debug, Clone)]
pub struct PsdTable {
    times: Vec<Timestamp>,
    grid: BinGrid,
    values: Array2<f64>,
}

impl PsdTable {
    /// Creates a table, validating that the matrix shape matches the
    /// timestamps and grid and that timestamps are strictly increasing.
    pub fn new(
        times: Vec<Timestamp>,
        grid: BinGrid,
        values: Array2<f64>,
    ) -> Result<Self, PsdError> {
        let (rows, cols) = values.dim();
        if rows != times.len() || cols != grid.len() {
            return Err(PsdError::ShapeMismatch {
                rows,
                cols,
                times: times.len(),
                bins: grid.len(),
            });
        }
        for (i, w) in times.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(PsdError::UnsortedTimes { index: i + 1 });
            }
        }
        Ok(Self {
            times,
            grid,
            values,
        })
    }

    /// Row timestamps.
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// The shared bin grid.
    pub fn grid(&self) -> &BinGrid {
        &self.grid
    }

    /// The concentration matrix, rows in time order.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.times.len()
    }

    /// Concentration row by index.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    /// Concentration row at an exact timestamp.
    pub fn row_at(&self, t: Timestamp) -> Option<ArrayView1<'_, f64>> {
        self.times
            .binary_search(&t)
            .ok()
            .map(|i| self.values.row(i))
    }

    /// A new table holding only the rows inside `span`.
    pub fn between(&self, span: TimeSpan) -> Self {
        let keep: Vec<usize> = (0..self.n_rows())
            .filter(|&i| span.contains(self.times[i]))
            .collect();
        let times = keep.iter().map(|&i| self.times[i]).collect();
        let mut values = Array2::zeros((keep.len(), self.grid.len()));
        for (r, &i) in keep.iter().enumerate() {
            values.row_mut(r).assign(&self.values.row(i));
        }
        Self {
            times,
            grid: self.grid.clone(),
            values,
        }
    }

    /// Mean concentration per aggregation group, NaN entries skipped.
    ///
    /// Returns a table with one row per group that covers at least one
    /// source row; rows outside every group are dropped. Row timestamps
    /// are the group ids.
    pub fn grouped_mean(&self, map: &GroupMap) -> Result<Self, PsdError> {
        let mut ids: Vec<Timestamp> = Vec::new();
        let mut sums: Vec<Vec<f64>> = Vec::new();
        let mut counts: Vec<Vec<usize>> = Vec::new();

        for (i, &t) in self.times.iter().enumerate() {
            let Some(id) = map.locate(t) else { continue };
            let gi = match ids.binary_search(&id) {
                Ok(gi) => gi,
                Err(gi) => {
                    ids.insert(gi, id);
                    sums.insert(gi, vec![0.0; self.grid.len()]);
                    counts.insert(gi, vec![0; self.grid.len()]);
                    gi
                }
            };
            for (j, &v) in self.values.row(i).iter().enumerate() {
                if v.is_finite() {
                    sums[gi][j] += v;
                    counts[gi][j] += 1;
                }
            }
        }

        let mut values = Array2::from_elem((ids.len(), self.grid.len()), f64::NAN);
        for (gi, (sum, count)) in sums.iter().zip(&counts).enumerate() {
            for j in 0..self.grid.len() {
                if count[j] > 0 {
                    values[(gi, j)] = sum[j] / count[j] as f64;
                }
            }
        }
        Self::new(ids, self.grid.clone(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use lumi_grouper::group_adaptive;
    use lumi_timeseries::TimeSeries;
    use ndarray::array;

    fn t(min: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap() + Duration::minutes(min)
    }

    #[test]
    fn grid_validation() {
        assert!(BinGrid::new(vec![0.5, 1.0], vec![0.5, 0.5]).is_ok());
        assert!(matches!(
            BinGrid::new(vec![0.5, 0.5], vec![0.5, 0.5]),
            Err(PsdError::UnsortedBins { index: 1 })
        ));
        assert!(matches!(
            BinGrid::new(vec![0.5, 1.0], vec![0.5]),
            Err(PsdError::GridLengthMismatch { .. })
        ));
        assert!(matches!(
            BinGrid::new(vec![0.5, 1.0], vec![0.5, 0.0]),
            Err(PsdError::InvalidWidth { index: 1, .. })
        ));
    }

    #[test]
    fn uniform_grid() {
        let grid = BinGrid::uniform(0.25, 0.25, 4).unwrap();
        assert_eq!(grid.centers(), &[0.25, 0.5, 0.75, 1.0]);
        assert_eq!(grid.widths(), &[0.25; 4]);
    }

    #[test]
    fn table_shape_checked() {
        let grid = BinGrid::uniform(0.25, 0.25, 3).unwrap();
        let bad = PsdTable::new(vec![t(0), t(1)], grid.clone(), array![[1.0, 2.0, 3.0]]);
        assert!(matches!(bad, Err(PsdError::ShapeMismatch { .. })));
        let good = PsdTable::new(
            vec![t(0), t(1)],
            grid,
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        );
        assert!(good.is_ok());
    }

    #[test]
    fn between_is_half_open() {
        let grid = BinGrid::uniform(0.25, 0.25, 2).unwrap();
        let table = PsdTable::new(
            vec![t(0), t(5), t(10)],
            grid,
            array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
        )
        .unwrap();
        let narrowed = table.between(TimeSpan::new(t(0), t(10)).unwrap());
        assert_eq!(narrowed.n_rows(), 2);
        assert_eq!(narrowed.times(), &[t(0), t(5)]);
        // original untouched
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn grouped_mean_skips_nan() {
        let grid = BinGrid::uniform(0.25, 0.25, 2).unwrap();
        let table = PsdTable::new(
            vec![t(2), t(3), t(8)],
            grid,
            array![[1.0, f64::NAN], [3.0, 4.0], [10.0, 20.0]],
        )
        .unwrap();
        let samples: Vec<Timestamp> = (0..10).map(t).collect();
        let ticks = TimeSeries::new(vec![t(2), t(7)], vec![0.2, 0.1]).unwrap();
        let map = group_adaptive(&samples, &ticks).unwrap();

        let mean = table.grouped_mean(&map).unwrap();
        assert_eq!(mean.times(), &[t(2), t(7)]);
        assert_relative_eq!(mean.values()[(0, 0)], 2.0);
        // NaN skipped, not averaged in
        assert_relative_eq!(mean.values()[(0, 1)], 4.0);
        assert_relative_eq!(mean.values()[(1, 1)], 20.0);
    }
}
