//! Chevron plate correlations.
//!
//! Chevron angles are measured from the flow direction, in degrees at the
//! public surface and radians inside the Han-Lee-Kim groups.

use std::f64::consts::FRAC_PI_2;

use super::TwoPhase;

/// Chisholm-Wanniarachchi single-phase Nusselt number.
pub fn chisholm_wanniarachchi_nu(re: f64, pr: f64, beta_deg: f64, phi: f64) -> f64 {
    0.72 * re.powf(0.59) * pr.powf(0.4) * phi.powf(0.41) * (beta_deg / 30.0).powf(0.66)
}

/// Chisholm-Wanniarachchi Darcy friction factor (four times the Fanning form).
pub fn chisholm_wanniarachchi_friction(re: f64, beta_deg: f64, phi: f64) -> f64 {
    if re <= 0.0 {
        return 0.0;
    }
    4.0 * 0.8 * re.powf(-0.25) * phi.powf(1.25) * (beta_deg / 30.0).powf(3.6)
}

/// Mass flux of the all-liquid flow with the same momentum.
fn equivalent_mass_flux(tp: &TwoPhase, g: f64) -> f64 {
    g * ((1.0 - tp.x) + tp.x * tp.density_ratio().sqrt())
}

/// Yan-Lin evaporation coefficient.
///
/// Returns the coefficient and the liquid-only Reynolds number.
pub(crate) fn yan_lin_nu(tp: &TwoPhase, g: f64, dh: f64, heat_flux: f64) -> (f64, f64) {
    let l = &tp.liquid;
    let re = g * dh / l.mu;
    let g_eq = equivalent_mass_flux(tp, g);
    let bo_eq = if g_eq > 0.0 && tp.h_fg > 0.0 {
        (heat_flux.abs() / (g_eq * tp.h_fg)).max(1e-5)
    } else {
        1e-5
    };
    let nu = 1.926
        * l.prandtl().cbrt()
        * bo_eq.powf(0.3)
        * re.powf(0.5)
        * ((1.0 - tp.x) + tp.x * tp.density_ratio().sqrt());
    (nu * l.k / dh, re)
}

fn han_lee_kim_groups(dh: f64, beta_deg: f64, pitch: f64) -> (f64, f64) {
    let ratio = pitch / dh;
    let angle = FRAC_PI_2 - beta_deg.to_radians();
    (ratio, angle)
}

/// Han-Lee-Kim condensation coefficient.
///
/// Returns the coefficient and the equivalent Reynolds number.
pub(crate) fn han_lee_kim_nu(tp: &TwoPhase, g: f64, dh: f64, beta_deg: f64, pitch: f64) -> (f64, f64) {
    let l = &tp.liquid;
    let (ratio, angle) = han_lee_kim_groups(dh, beta_deg, pitch);
    let ge1 = 11.22 * ratio.powf(-2.83) * angle.powf(-4.5);
    let ge2 = 0.35 * ratio.powf(0.23) * angle.powf(1.48);
    let re_eq = equivalent_mass_flux(tp, g) * dh / l.mu;
    let nu = ge1 * re_eq.powf(ge2) * l.prandtl().cbrt();
    (nu * l.k / dh, re_eq)
}

/// Han-Lee-Kim Darcy friction factor (four times the Fanning form).
pub(crate) fn han_lee_kim_friction(tp: &TwoPhase, g: f64, dh: f64, beta_deg: f64, pitch: f64) -> f64 {
    let (ratio, angle) = han_lee_kim_groups(dh, beta_deg, pitch);
    let ge3 = 3521.1 * ratio.powf(4.17) * angle.powf(-7.75);
    let ge4 = -1.024 * ratio.powf(0.0925) * angle.powf(-1.3);
    let re_eq = equivalent_mass_flux(tp, g) * dh / tp.liquid.mu;
    if re_eq <= 0.0 {
        return 0.0;
    }
    4.0 * ge3 * re_eq.powf(ge4)
}
