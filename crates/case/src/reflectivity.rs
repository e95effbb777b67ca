//! Radar reflectivity from bulk density and the PSD.

use tracing::debug;

use lumi_psd::PsdTable;
use lumi_timeseries::{align_inner, TimeSeries};

use crate::collab::ScatteringSolver;

// Rayleigh prefactor for dry snow at X band: |K_ice|^2 = 0.93 scaled by
// solid ice density 917 kg/m^3.
const RAYLEIGH_CONSTANT: f64 = 0.2 / (0.93 * 917.0 * 917.0);

/// Rayleigh X-band reflectivity in dBZ:
/// `10·log10(0.2/(0.93·917²) · ρ² · M6)`.
///
/// Density and sixth-moment series are joined on common timestamps;
/// masked density windows stay NaN.
pub fn z_rayleigh_xband(density: &TimeSeries<f64>, m6: &TimeSeries<f64>) -> TimeSeries<f64> {
    let (density, m6) = align_inner(density, m6);
    let values = density
        .values()
        .iter()
        .zip(m6.values())
        .map(|(&rho, &m6)| 10.0 * (RAYLEIGH_CONSTANT * rho * rho * m6).log10())
        .collect();
    TimeSeries::new(density.times().to_vec(), values).expect("joined series stays ordered")
}

/// Reflectivity through the scattering collaborator, one call per
/// density sample.
///
/// The refractive index is derived from the window's bulk density
/// (kg/m^3, converted to g/cm^3 for the solver); windows with a
/// non-finite index, a masked density or no matching PSD row yield NaN
/// and the batch continues.
pub fn reflectivity_tmatrix<S: ScatteringSolver>(
    solver: &S,
    wavelength_mm: f64,
    density: &TimeSeries<f64>,
    psd: &PsdTable,
) -> TimeSeries<f64> {
    let edges: Vec<f64> = psd
        .grid()
        .iter()
        .map(|(center, width)| center + 0.5 * width)
        .collect();
    let values = density
        .iter()
        .map(|(t, &rho)| {
            let Some(row) = psd.row_at(t) else {
                debug!(time = %t, "no PSD row for density window, skipping");
                return f64::NAN;
            };
            if !rho.is_finite() {
                return f64::NAN;
            }
            let m = solver.refractive_index(wavelength_mm, 1e-3 * rho);
            if !(m.re.is_finite() && m.im.is_finite()) {
                debug!(time = %t, "non-finite refractive index, skipping");
                return f64::NAN;
            }
            let row: Vec<f64> = row.to_vec();
            solver.reflectivity(wavelength_mm, m, &edges, &row)
        })
        .collect();
    TimeSeries::new(density.times().to_vec(), values).expect("density series is ordered")
}
