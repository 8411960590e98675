//! Heat-transfer and friction correlations.
//!
//! Each channel carries a [`MethodTable`] mapping flow regimes to a heat
//! method and a friction method. [`evaluate`] looks the regime up (falling
//! back to aggregate regimes), evaluates both methods at the cell-mean state
//! and returns the film coefficient and the Darcy friction factor.

mod plate;
mod tube;

use tc_core::UnitPhase;
use tc_fluids::{Properties, Saturation};

use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, ChannelKind};
use crate::warning::Warning;

use plate::{han_lee_kim_friction, han_lee_kim_nu, yan_lin_nu};
use tube::{gungor_winterton, shah_condensation};

pub use plate::{chisholm_wanniarachchi_friction, chisholm_wanniarachchi_nu};
pub use tube::{RE_LAMINAR, blasius, dittus_boelter, gnielinski, homogeneous_viscosity, swamee_jain};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatMethod {
    Gnielinski,
    DittusBoelter,
    ChisholmWanniarachchi,
    GungorWinterton,
    Shah,
    YanLin,
    HanLeeKim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrictionMethod {
    SwameeJain,
    Blasius,
    ChisholmWanniarachchi,
    Homogeneous,
    HanLeeKim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Methods {
    pub heat: HeatMethod,
    pub friction: FrictionMethod,
}

impl Methods {
    pub const fn new(heat: HeatMethod, friction: FrictionMethod) -> Self {
        Self { heat, friction }
    }

    /// Dittus-Boelter and Blasius on liquid-only or bulk properties.
    pub const CONSERVATIVE: Methods = Methods::new(HeatMethod::DittusBoelter, FrictionMethod::Blasius);
}

/// Regime -> method lookup for one channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodTable {
    entries: Vec<(UnitPhase, Methods)>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the methods for `regime`.
    pub fn with(mut self, regime: UnitPhase, methods: Methods) -> Self {
        match self.entries.iter_mut().find(|(r, _)| *r == regime) {
            Some(entry) => entry.1 = methods,
            None => self.entries.push((regime, methods)),
        }
        self
    }

    /// Exact regime first, then its aggregate fallbacks in order.
    pub fn lookup(&self, regime: UnitPhase) -> Option<Methods> {
        let find = |key: UnitPhase| {
            self.entries
                .iter()
                .find(|(r, _)| *r == key)
                .map(|(_, m)| *m)
        };
        find(regime).or_else(|| regime.fallbacks().iter().find_map(|key| find(*key)))
    }

    pub fn tube() -> Self {
        use FrictionMethod as F;
        use HeatMethod as H;
        Self::new()
            .with(UnitPhase::AllSinglePhase, Methods::new(H::Gnielinski, F::SwameeJain))
            .with(
                UnitPhase::TwoPhaseEvaporating,
                Methods::new(H::GungorWinterton, F::Homogeneous),
            )
            .with(UnitPhase::TwoPhaseCondensing, Methods::new(H::Shah, F::Homogeneous))
    }

    pub fn chevron_plate() -> Self {
        use FrictionMethod as F;
        use HeatMethod as H;
        Self::new()
            .with(
                UnitPhase::AllSinglePhase,
                Methods::new(H::ChisholmWanniarachchi, F::ChisholmWanniarachchi),
            )
            .with(UnitPhase::TwoPhaseEvaporating, Methods::new(H::YanLin, F::Homogeneous))
            .with(UnitPhase::TwoPhaseCondensing, Methods::new(H::HanLeeKim, F::HanLeeKim))
    }
}

/// Local flow conditions for one correlation evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Conditions<'a> {
    /// Cell-mean bulk properties
    pub bulk: &'a Properties,
    /// Saturated liquid and vapour at the stream pressure, in two-phase cells
    pub saturation: Option<&'a Saturation>,
    /// Cell-mean vapour quality, in two-phase cells
    pub quality: Option<f64>,
    /// Mass flux [kg/(m^2 s)]
    pub mass_flux: f64,
    /// Magnitude of the wall heat flux [W/m^2]
    pub heat_flux: f64,
    /// Critical pressure, when the fluid has one [Pa]
    pub p_crit: Option<f64>,
    /// Whether the stream is being heated
    pub heating: bool,
}

/// Film coefficient [W/(m^2 K)], Darcy friction factor and the Reynolds
/// number the heat method used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    pub alpha: f64,
    pub f: f64,
    pub reynolds: f64,
}

pub(crate) struct Transport {
    pub mu: f64,
    pub k: f64,
    pub cp: f64,
    pub rho: f64,
}

impl Transport {
    pub fn of(props: &Properties) -> ComponentResult<Self> {
        match (props.viscosity, props.conductivity, props.cp) {
            (Some(mu), Some(k), Some(cp)) if mu > 0.0 && k > 0.0 && cp > 0.0 => Ok(Self {
                mu,
                k,
                cp,
                rho: props.d,
            }),
            _ => Err(ComponentError::NotSupported {
                what: "transport properties unavailable for correlation",
            }),
        }
    }

    pub fn prandtl(&self) -> f64 {
        self.cp * self.mu / self.k
    }
}

/// Two-phase inputs: saturated liquid and vapour transport plus quality.
pub(crate) struct TwoPhase {
    pub liquid: Transport,
    pub vapour: Transport,
    pub x: f64,
    pub h_fg: f64,
    pub p: f64,
}

impl TwoPhase {
    fn of(cond: &Conditions<'_>) -> ComponentResult<Self> {
        let sat = cond.saturation.ok_or(ComponentError::NotSupported {
            what: "two-phase correlation needs saturation properties",
        })?;
        let x = cond
            .quality
            .or(cond.bulk.q)
            .unwrap_or_else(|| sat.quality(cond.bulk.h))
            .clamp(0.0, 0.999);
        Ok(Self {
            liquid: Transport::of(&sat.liquid)?,
            vapour: Transport::of(&sat.vapour)?,
            x,
            h_fg: sat.h_fg(),
            p: sat.p_sat(),
        })
    }

    pub fn density_ratio(&self) -> f64 {
        self.liquid.rho / self.vapour.rho
    }
}

fn range_check(
    warnings: &mut Vec<Warning>,
    method: &'static str,
    reynolds: f64,
    (min, max): (f64, f64),
) {
    if reynolds < min || reynolds > max {
        Warning::push_unique(
            warnings,
            Warning::OutsideValidatedRange {
                method,
                reynolds,
                min,
                max,
            },
        );
    }
}

fn chevron(channel: &Channel) -> ComponentResult<(f64, f64, f64)> {
    match channel.kind {
        ChannelKind::ChevronPlate {
            beta_deg,
            phi,
            pitch,
        } => Ok((beta_deg, phi, pitch)),
        ChannelKind::Tube => Err(ComponentError::NotSupported {
            what: "plate correlation requested for a tube channel",
        }),
    }
}

/// Evaluate the channel's methods for `regime`.
///
/// Regimes missing from the table use [`Methods::CONSERVATIVE`] and always
/// add a [`Warning::RegimeFallback`].
pub fn evaluate(
    channel: &Channel,
    regime: UnitPhase,
    cond: &Conditions<'_>,
    warnings: &mut Vec<Warning>,
) -> ComponentResult<Coefficients> {
    let methods = match channel.methods.lookup(regime) {
        Some(methods) => methods,
        None => {
            tracing::warn!(%regime, geometry = channel.kind.label(), "correlation fallback");
            Warning::push_unique(
                warnings,
                Warning::RegimeFallback {
                    regime,
                    geometry: channel.kind.label(),
                },
            );
            Methods::CONSERVATIVE
        }
    };
    let (alpha, reynolds) = heat(channel, methods.heat, regime, cond, warnings)?;
    let f = friction(channel, methods.friction, regime, cond, warnings)?;
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "heat transfer coefficient",
        });
    }
    if !(f.is_finite() && f >= 0.0) {
        return Err(ComponentError::NonPhysical {
            what: "friction factor",
        });
    }
    Ok(Coefficients { alpha, f, reynolds })
}

/// Properties single-phase methods use: saturated liquid inside the dome
/// (liquid-only), the bulk state elsewhere.
fn single_phase_source<'a>(regime: UnitPhase, cond: &Conditions<'a>) -> &'a Properties {
    match cond.saturation {
        Some(sat) if regime.is_two_phase() => &sat.liquid,
        _ => cond.bulk,
    }
}

fn heat(
    channel: &Channel,
    method: HeatMethod,
    regime: UnitPhase,
    cond: &Conditions<'_>,
    warnings: &mut Vec<Warning>,
) -> ComponentResult<(f64, f64)> {
    let dh = channel.hydraulic_diameter;
    let g = cond.mass_flux;
    match method {
        HeatMethod::Gnielinski | HeatMethod::DittusBoelter | HeatMethod::ChisholmWanniarachchi => {
            let tr = Transport::of(single_phase_source(regime, cond))?;
            let re = g * dh / tr.mu;
            let pr = tr.prandtl();
            let nu = match method {
                HeatMethod::Gnielinski => {
                    range_check(warnings, "Gnielinski", re, (3.0e3, 5.0e6));
                    gnielinski(re, pr)
                }
                HeatMethod::DittusBoelter => dittus_boelter(re, pr, cond.heating),
                _ => {
                    let (beta, phi, _) = chevron(channel)?;
                    range_check(warnings, "Chisholm-Wanniarachchi", re, (1.0e3, 4.0e4));
                    chisholm_wanniarachchi_nu(re, pr, beta, phi)
                }
            };
            Ok((nu * tr.k / dh, re))
        }
        HeatMethod::GungorWinterton => {
            let tp = TwoPhase::of(cond)?;
            let (alpha, re_l) = gungor_winterton(&tp, g, dh, cond.heat_flux);
            Ok((alpha, re_l))
        }
        HeatMethod::Shah => {
            let tp = TwoPhase::of(cond)?;
            let p_crit = cond.p_crit.ok_or(ComponentError::NotSupported {
                what: "Shah condensation needs the critical pressure",
            })?;
            let (alpha, re_lo) = shah_condensation(&tp, g, dh, p_crit);
            range_check(warnings, "Shah", re_lo, (350.0, f64::INFINITY));
            Ok((alpha, re_lo))
        }
        HeatMethod::YanLin => {
            let tp = TwoPhase::of(cond)?;
            let (alpha, re) = yan_lin_nu(&tp, g, dh, cond.heat_flux);
            range_check(warnings, "Yan-Lin", re, (2.0e3, 1.0e4));
            Ok((alpha, re))
        }
        HeatMethod::HanLeeKim => {
            let tp = TwoPhase::of(cond)?;
            let (beta, _, pitch) = chevron(channel)?;
            let (alpha, re_eq) = han_lee_kim_nu(&tp, g, dh, beta, pitch);
            range_check(warnings, "Han-Lee-Kim", re_eq, (3.0e2, 4.0e3));
            Ok((alpha, re_eq))
        }
    }
}

fn friction(
    channel: &Channel,
    method: FrictionMethod,
    regime: UnitPhase,
    cond: &Conditions<'_>,
    _warnings: &mut Vec<Warning>,
) -> ComponentResult<f64> {
    let dh = channel.hydraulic_diameter;
    let g = cond.mass_flux;
    let rel_roughness = channel.roughness / dh;
    match method {
        FrictionMethod::SwameeJain | FrictionMethod::Blasius => {
            let tr = Transport::of(single_phase_source(regime, cond))?;
            let re = g * dh / tr.mu;
            Ok(if method == FrictionMethod::SwameeJain {
                swamee_jain(re, rel_roughness)
            } else {
                blasius(re)
            })
        }
        FrictionMethod::ChisholmWanniarachchi => {
            let (beta, phi, _) = chevron(channel)?;
            let tr = Transport::of(single_phase_source(regime, cond))?;
            let re = g * dh / tr.mu;
            Ok(chisholm_wanniarachchi_friction(re, beta, phi))
        }
        FrictionMethod::Homogeneous => {
            // Single-phase cells degenerate to the bulk-property friction factor
            if !regime.is_two_phase() {
                let tr = Transport::of(cond.bulk)?;
                return Ok(swamee_jain(g * dh / tr.mu, rel_roughness));
            }
            let tp = TwoPhase::of(cond)?;
            let mu = homogeneous_viscosity(tp.x, tp.liquid.mu, tp.vapour.mu);
            Ok(swamee_jain(g * dh / mu, rel_roughness))
        }
        FrictionMethod::HanLeeKim => {
            let (beta, _, pitch) = chevron(channel)?;
            let tp = TwoPhase::of(cond)?;
            Ok(han_lee_kim_friction(&tp, g, dh, beta, pitch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::FluidPhase;
    use tc_core::units::m;

    fn water_like() -> Properties {
        Properties {
            p: 2.0e5,
            t: 340.0,
            h: 2.8e5,
            s: 900.0,
            d: 980.0,
            u: 2.8e5,
            q: None,
            phase: FluidPhase::Liquid,
            viscosity: Some(4.2e-4),
            conductivity: Some(0.66),
            cp: Some(4190.0),
            molar_mass: 0.018,
        }
    }

    fn conditions(bulk: &Properties) -> Conditions<'_> {
        Conditions {
            bulk,
            saturation: None,
            quality: None,
            mass_flux: 500.0,
            heat_flux: 1.0e4,
            p_crit: None,
            heating: false,
        }
    }

    #[test]
    fn lookup_falls_back_through_aggregates() {
        let table = MethodTable::tube();
        assert_eq!(
            table.lookup(UnitPhase::Liquid).unwrap().heat,
            HeatMethod::Gnielinski
        );
        assert_eq!(
            table.lookup(UnitPhase::Supercritical).unwrap().heat,
            HeatMethod::Gnielinski
        );
        assert_eq!(
            table.lookup(UnitPhase::TwoPhaseCondensing).unwrap().heat,
            HeatMethod::Shah
        );
        assert_eq!(MethodTable::new().lookup(UnitPhase::Liquid), None);

        let all = MethodTable::new().with(UnitPhase::All, Methods::CONSERVATIVE);
        assert_eq!(all.lookup(UnitPhase::TwoPhaseEvaporating), Some(Methods::CONSERVATIVE));
    }

    #[test]
    fn missing_regime_degrades_with_warning() {
        let channel = Channel::tubes(m(0.01), 1)
            .unwrap()
            .with_methods(MethodTable::new());
        let bulk = water_like();
        let mut warnings = Vec::new();
        let c = evaluate(&channel, UnitPhase::Liquid, &conditions(&bulk), &mut warnings).unwrap();
        assert!(c.alpha > 0.0 && c.f > 0.0);
        assert!(matches!(warnings[0], Warning::RegimeFallback { .. }));
    }

    #[test]
    fn plate_method_on_tube_is_rejected() {
        let channel = Channel::tubes(m(0.01), 1)
            .unwrap()
            .with_methods(MethodTable::chevron_plate());
        let bulk = water_like();
        let mut warnings = Vec::new();
        let err = evaluate(&channel, UnitPhase::Liquid, &conditions(&bulk), &mut warnings);
        assert!(matches!(err, Err(ComponentError::NotSupported { .. })));
    }

    #[test]
    fn two_phase_without_saturation_is_rejected() {
        let channel = Channel::tubes(m(0.01), 1).unwrap();
        let bulk = water_like();
        let mut warnings = Vec::new();
        let err = evaluate(
            &channel,
            UnitPhase::TwoPhaseEvaporating,
            &conditions(&bulk),
            &mut warnings,
        );
        assert!(err.is_err());
    }

    #[test]
    fn turbulent_tube_water() {
        let channel = Channel::tubes(m(0.01), 1).unwrap();
        let bulk = water_like();
        let mut warnings = Vec::new();
        let c = evaluate(&channel, UnitPhase::Liquid, &conditions(&bulk), &mut warnings).unwrap();
        // Re ~ 1.2e4: alpha of a few kW/m^2K, f ~ 0.03
        assert!(c.alpha > 2.0e3 && c.alpha < 2.0e4, "alpha = {}", c.alpha);
        assert!(c.f > 0.02 && c.f < 0.04, "f = {}", c.f);
        assert!(warnings.is_empty());
    }
}
