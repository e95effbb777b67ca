//! External collaborator traits.

use std::collections::HashMap;

use num_complex::Complex64;

use lumi_timeseries::{TimeSeries, TimeSpan};

/// Common capabilities of an instrument record.
///
/// `narrowed` is span restriction by value construction: the original
/// record is untouched and the result owns only the rows in range.
pub trait Instrument {
    /// Short instrument name, part of the cache fingerprint.
    fn name(&self) -> &'static str;

    /// The time extent of the held data, `None` when empty.
    fn span(&self) -> Option<TimeSpan>;

    /// A copy restricted to `span`.
    fn narrowed(&self, span: TimeSpan) -> Self
    where
        Self: Sized;

    /// Stable identifier for the record's extent, used as a cache key
    /// component. Format: `name-YYYYmmddHHMM-YYYYmmddHHMM`.
    fn fingerprint(&self) -> String {
        match self.span() {
            Some(span) => format!(
                "{}-{}-{}",
                self.name(),
                span.start().format("%Y%m%d%H%M"),
                span.end().format("%Y%m%d%H%M"),
            ),
            None => format!("{}-empty", self.name()),
        }
    }
}

/// Named-series cache collaborator.
///
/// Keyed by (analysis fingerprint, series name). Implementations may be
/// backed by anything; results must be identical with or without one.
pub trait SeriesCache {
    /// Looks up a stored series.
    fn get(&self, fingerprint: &str, name: &str) -> Option<TimeSeries<f64>>;

    /// Stores a series.
    fn put(&mut self, fingerprint: &str, name: &str, series: &TimeSeries<f64>);
}

/// Default in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<(String, String), TimeSeries<f64>>,
}

impl MemoryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SeriesCache for MemoryCache {
    fn get(&self, fingerprint: &str, name: &str) -> Option<TimeSeries<f64>> {
        self.entries
            .get(&(fingerprint.to_string(), name.to_string()))
            .cloned()
    }

    fn put(&mut self, fingerprint: &str, name: &str, series: &TimeSeries<f64>) {
        self.entries.insert(
            (fingerprint.to_string(), name.to_string()),
            series.clone(),
        );
    }
}

/// Opaque electromagnetic scattering solver.
///
/// Called once per density sample; the engine never looks inside the
/// scattering computation.
pub trait ScatteringSolver {
    /// Complex refractive index of a snow mixture of the given bulk
    /// density (g/cm^3) at the given wavelength (mm).
    fn refractive_index(&self, wavelength_mm: f64, density_g_cm3: f64) -> Complex64;

    /// Radar reflectivity in dBZ for a binned PSD (upper bin edges in
    /// mm, concentrations in 1/(mm m^3)).
    fn reflectivity(
        &self,
        wavelength_mm: f64,
        refractive_index: Complex64,
        bin_edges: &[f64],
        psd: &[f64],
    ) -> f64;
}
