//! Calorically perfect gas backend.
//!
//! Closed-form relations about a reference state (298.15 K, 101325 Pa):
//!
//! - `h = cp (T - T_ref)`
//! - `u = h - R T`
//! - `s = cp ln(T / T_ref) - R ln(p / p_ref)`
//! - `rho = p / (R T)`
//!
//! Deterministic and dependency-free, which makes it the backend of choice for
//! numerics tests. Every state is reported as gas.

use std::collections::HashMap;
use std::sync::Arc;

use tc_core::FluidPhase;

use crate::backend::PropertyBackend;
use crate::error::{FluidError, FluidResult};
use crate::fluid::Fluid;
use crate::input_pair::InputPair;
use crate::properties::{CriticalPoint, Properties, Saturation};

const T_REF: f64 = 298.15;
const P_REF: f64 = 101_325.0;
/// Universal gas constant [J/(mol K)]
const R_UNIVERSAL: f64 = 8.314_462_618;

/// Constants of one perfect gas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerfectGas {
    /// Molar mass [kg/mol]
    pub molar_mass: f64,
    /// Isobaric specific heat [J/(kg K)]
    pub cp: f64,
    /// Dynamic viscosity [Pa s]
    pub viscosity: f64,
    /// Thermal conductivity [W/(m K)]
    pub conductivity: f64,
}

impl PerfectGas {
    pub fn new(molar_mass: f64, cp: f64) -> Self {
        Self {
            molar_mass,
            cp,
            viscosity: 1.8e-5,
            conductivity: 0.026,
        }
    }

    pub fn with_transport(mut self, viscosity: f64, conductivity: f64) -> Self {
        self.viscosity = viscosity;
        self.conductivity = conductivity;
        self
    }

    /// Specific gas constant [J/(kg K)]
    pub fn r(&self) -> f64 {
        R_UNIVERSAL / self.molar_mass
    }

    fn cv(&self) -> f64 {
        self.cp - self.r()
    }

    fn t_from_h(&self, h: f64) -> f64 {
        T_REF + h / self.cp
    }

    fn t_from_u(&self, u: f64) -> f64 {
        (u + self.cp * T_REF) / self.cv()
    }

    fn p_from_ts(&self, t: f64, s: f64) -> f64 {
        P_REF * ((self.cp * (t / T_REF).ln() - s) / self.r()).exp()
    }

    fn t_from_ps(&self, p: f64, s: f64) -> f64 {
        T_REF * ((s + self.r() * (p / P_REF).ln()) / self.cp).exp()
    }

    /// At fixed density `p = rho R T`, so `s = cv ln(T/T_ref) - R ln(rho R T_ref / p_ref)`.
    fn t_from_ds(&self, d: f64, s: f64) -> f64 {
        let r = self.r();
        T_REF * ((s + r * (d * r * T_REF / P_REF).ln()) / self.cv()).exp()
    }

    /// Temperature and pressure fixed by a mass-basis pair.
    fn solve_tp(&self, pair: InputPair, v1: f64, v2: f64) -> FluidResult<(f64, f64)> {
        let r = self.r();
        let tp = match pair {
            InputPair::PT => (v2, v1),
            InputPair::HmassP => (self.t_from_h(v1), v2),
            InputPair::PSmass => (self.t_from_ps(v1, v2), v1),
            InputPair::PUmass => (self.t_from_u(v2), v1),
            InputPair::DmassP => (v2 / (v1 * r), v2),
            InputPair::DmassT => (v2, v1 * r * v2),
            InputPair::SmassT => (v2, self.p_from_ts(v2, v1)),
            InputPair::HmassSmass => {
                let t = self.t_from_h(v1);
                (t, self.p_from_ts(t, v2))
            }
            InputPair::SmassUmass => {
                let t = self.t_from_u(v2);
                (t, self.p_from_ts(t, v1))
            }
            InputPair::DmassHmass => {
                let t = self.t_from_h(v2);
                (t, v1 * r * t)
            }
            InputPair::DmassUmass => {
                let t = self.t_from_u(v2);
                (t, v1 * r * t)
            }
            InputPair::DmassSmass => {
                let t = self.t_from_ds(v1, v2);
                (t, v1 * r * t)
            }
            _ => {
                return Err(FluidError::InvalidInput {
                    what: "input pair does not fix a perfect-gas state",
                });
            }
        };
        Ok(tp)
    }

    /// Full property set at `(t, p)`.
    pub fn properties(&self, t: f64, p: f64) -> FluidResult<Properties> {
        if !(t.is_finite() && t > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "perfect-gas temperature",
            });
        }
        if !(p.is_finite() && p > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "perfect-gas pressure",
            });
        }
        let r = self.r();
        let h = self.cp * (t - T_REF);
        Ok(Properties {
            p,
            t,
            h,
            s: self.cp * (t / T_REF).ln() - r * (p / P_REF).ln(),
            d: p / (r * t),
            u: h - r * t,
            q: None,
            phase: FluidPhase::Gas,
            viscosity: Some(self.viscosity),
            conductivity: Some(self.conductivity),
            cp: Some(self.cp),
            molar_mass: self.molar_mass,
        })
    }
}

/// Backend serving a fixed table of perfect gases.
#[derive(Clone, Debug, Default)]
pub struct PerfectGasBackend {
    gases: HashMap<Fluid, PerfectGas>,
}

impl PerfectGasBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Air, nitrogen, helium, argon and carbon dioxide at room-temperature `cp`.
    pub fn with_common_gases() -> Self {
        Self::new()
            .with_gas(
                "Air",
                PerfectGas::new(0.028_965, 1005.0).with_transport(1.85e-5, 0.0262),
            )
            .with_gas(
                "Nitrogen",
                PerfectGas::new(0.028_013_4, 1040.0).with_transport(1.78e-5, 0.0259),
            )
            .with_gas(
                "Helium",
                PerfectGas::new(0.004_002_6, 5193.0).with_transport(1.99e-5, 0.155),
            )
            .with_gas(
                "Argon",
                PerfectGas::new(0.039_948, 520.3).with_transport(2.27e-5, 0.0177),
            )
            .with_gas(
                "CarbonDioxide",
                PerfectGas::new(0.044_01, 846.0).with_transport(1.49e-5, 0.0166),
            )
    }

    pub fn with_gas(mut self, name: &str, gas: PerfectGas) -> Self {
        self.gases.insert(Fluid::new(name), gas);
        self
    }

    pub fn gas(&self, fluid: &Fluid) -> FluidResult<&PerfectGas> {
        self.gases.get(fluid).ok_or_else(|| FluidError::Backend {
            message: format!("no perfect-gas data for {fluid}"),
        })
    }
}

impl PropertyBackend for PerfectGasBackend {
    fn name(&self) -> &str {
        "PerfectGas"
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
        _imposed: FluidPhase,
    ) -> FluidResult<Properties> {
        let gas = self.gas(fluid)?;
        let (pair, v1, v2) = pair.to_mass_basis(v1, v2, gas.molar_mass);
        let (t, p) = gas.solve_tp(pair, v1, v2)?;
        gas.properties(t, p)
    }

    fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
        self.gas(fluid)?;
        Err(FluidError::OutOfRange {
            context: format!("perfect gas {fluid} has no critical point"),
        })
    }

    fn saturation(&self, fluid: &Fluid, _p: f64) -> FluidResult<Option<Saturation>> {
        self.gas(fluid)?;
        Ok(None)
    }

    fn fork(&self) -> Arc<dyn PropertyBackend> {
        Arc::new(self.clone())
    }
}
