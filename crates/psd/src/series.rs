//! Per-row derived series over a PSD table.

use lumi_timeseries::TimeSeries;

use crate::gamma::{d0, d_max, gamma_params, nt, GammaPsdParams};
use crate::moments::moment;
use crate::table::PsdTable;

impl PsdTable {
    /// Raw moment `M_n` per row.
    pub fn moment_series(&self, n: i32) -> TimeSeries<f64> {
        self.row_series(|grid, row| moment(grid, row, n))
    }

    /// Normalized-gamma parameters per row.
    pub fn gamma_series(&self) -> TimeSeries<GammaPsdParams> {
        self.row_series(gamma_params)
    }

    /// Median-volume diameter per row.
    pub fn d0_series(&self) -> TimeSeries<f64> {
        self.row_series(d0)
    }

    /// Largest occupied diameter per row.
    pub fn d_max_series(&self) -> TimeSeries<f64> {
        self.row_series(d_max)
    }

    /// Total concentration per row.
    pub fn nt_series(&self) -> TimeSeries<f64> {
        self.row_series(nt)
    }

    fn row_series<T, F>(&self, f: F) -> TimeSeries<T>
    where
        F: Fn(&crate::table::BinGrid, ndarray::ArrayView1<'_, f64>) -> T,
    {
        let values = (0..self.n_rows()).map(|i| f(self.grid(), self.row(i))).collect();
        TimeSeries::new(self.times().to_vec(), values)
            .expect("table timestamps validated at construction")
    }
}
