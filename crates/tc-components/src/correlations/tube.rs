//! Round-tube correlations and the generic single-phase defaults.

use super::{Transport, TwoPhase};

/// Reynolds number below which tube flow is treated as laminar.
pub const RE_LAMINAR: f64 = 2300.0;

/// Fully developed laminar Nusselt number at constant wall temperature.
const NU_LAMINAR: f64 = 3.66;

/// Gnielinski Nusselt number, with the laminar constant below [`RE_LAMINAR`].
pub fn gnielinski(re: f64, pr: f64) -> f64 {
    if re < RE_LAMINAR {
        return NU_LAMINAR;
    }
    let f = (0.79 * re.ln() - 1.64).powi(-2);
    let nu = (f / 8.0) * (re - 1000.0) * pr / (1.0 + 12.7 * (f / 8.0).sqrt() * (pr.powf(2.0 / 3.0) - 1.0));
    nu.max(NU_LAMINAR)
}

/// Dittus-Boelter Nusselt number; exponent 0.4 when heated, 0.3 when cooled.
pub fn dittus_boelter(re: f64, pr: f64, heating: bool) -> f64 {
    let n = if heating { 0.4 } else { 0.3 };
    (0.023 * re.powf(0.8) * pr.powf(n)).max(NU_LAMINAR)
}

/// Swamee-Jain explicit Darcy friction factor; `64/Re` when laminar.
pub fn swamee_jain(re: f64, rel_roughness: f64) -> f64 {
    if re <= 0.0 {
        return 0.0;
    }
    if re < RE_LAMINAR {
        return 64.0 / re;
    }
    let arg = rel_roughness / 3.7 + 5.74 / re.powf(0.9);
    0.25 / arg.log10().powi(2)
}

/// Blasius smooth-tube Darcy friction factor; `64/Re` when laminar.
pub fn blasius(re: f64) -> f64 {
    if re <= 0.0 {
        return 0.0;
    }
    if re < RE_LAMINAR {
        64.0 / re
    } else {
        0.316 * re.powf(-0.25)
    }
}

/// McAdams homogeneous two-phase viscosity.
pub fn homogeneous_viscosity(x: f64, mu_l: f64, mu_v: f64) -> f64 {
    1.0 / (x / mu_v + (1.0 - x) / mu_l)
}

fn liquid_film(liquid: &Transport, g_liquid: f64, dh: f64, heating: bool) -> (f64, f64) {
    let re = g_liquid * dh / liquid.mu;
    let nu = dittus_boelter(re, liquid.prandtl(), heating);
    (nu * liquid.k / dh, re)
}

/// Gungor-Winterton (1987) flow boiling coefficient.
///
/// Returns the coefficient and the liquid-fraction Reynolds number.
pub(crate) fn gungor_winterton(tp: &TwoPhase, g: f64, dh: f64, heat_flux: f64) -> (f64, f64) {
    let x = tp.x;
    let (alpha_l, re_l) = liquid_film(&tp.liquid, g * (1.0 - x), dh, true);
    let bo = if g > 0.0 && tp.h_fg > 0.0 {
        heat_flux.abs() / (g * tp.h_fg)
    } else {
        0.0
    };
    let martinelli = (x / (1.0 - x)).powf(0.75) * tp.density_ratio().powf(0.41);
    let e = 1.0 + 3000.0 * bo.powf(0.86) + 1.12 * martinelli;
    (alpha_l * e, re_l)
}

/// Shah (1979) film condensation coefficient.
///
/// Returns the coefficient and the liquid-only Reynolds number.
pub(crate) fn shah_condensation(tp: &TwoPhase, g: f64, dh: f64, p_crit: f64) -> (f64, f64) {
    let x = tp.x;
    let (alpha_lo, re_lo) = liquid_film(&tp.liquid, g, dh, false);
    let p_red = (tp.p / p_crit).clamp(1e-4, 0.99);
    let factor = (1.0 - x).powf(0.8) + 3.8 * x.powf(0.76) * (1.0 - x).powf(0.04) / p_red.powf(0.38);
    (alpha_lo * factor, re_lo)
}
