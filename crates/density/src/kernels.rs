//! Physical rate kernels integrated over the diameter grid.

/// Density of liquid water, kg/m^3.
pub const RHO_W: f64 = 1000.0;

/// Full circle constant.
pub const TAU: f64 = 2.0 * std::f64::consts::PI;

/// Power-law mass rate kernel, (mm/h)/(mm bin).
///
/// `3.6/ρ_w · α · d^β · v(d) · N(d)` with `d` in mm, `v` in m/s and `N`
/// in 1/(mm m^3). Integrating over the bin grid yields precipitation
/// intensity in mm/h.
pub fn r_ab(d: f64, alpha: f64, beta: f64, v: f64, n: f64) -> f64 {
    3.6 / RHO_W * alpha * d.powf(beta) * v * n
}

/// Constant-density volumetric rate kernel, (mm/h)/(mm bin).
///
/// `3.6e-3·τ/12 · ρ/ρ_w · d³ · v(d) · N(d)`; spherical particles of
/// bulk density `ρ` kg/m^3.
pub fn r_rho(d: f64, rho: f64, v: f64, n: f64) -> f64 {
    3.6e-3 * TAU / 12.0 * rho / RHO_W * d.powi(3) * v * n
}
