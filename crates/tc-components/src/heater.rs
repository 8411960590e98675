//! Constant-pressure heaters and coolers without geometry.

use tc_core::TOLABS_X;
use tc_core::units::Temperature;
use tc_fluids::{FlowState, InputPair, PropertyAdapter};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};

/// What fixes the heater outlet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeaterTarget {
    /// External duty [W], positive when heating.
    HeatDuty(f64),
    OutletTemperature(Temperature),
    OutletEnthalpy(f64),
    OutletQuality(f64),
}

/// Basic heater or cooler: the outlet leaves at the inlet pressure.
///
/// `efficiency` is the fraction of the external heat that reaches the fluid
/// when heating, and the fraction of the heat removed from the fluid that
/// reaches the sink when cooling.
#[derive(Clone, Debug, PartialEq)]
pub struct Heater {
    pub target: HeaterTarget,
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaterSolution {
    pub outlet: FlowState,
    /// Heat into the fluid [W]
    pub q: f64,
    /// Heat exchanged with the external source or sink [W]
    pub q_external: f64,
}

impl Heater {
    pub fn new(target: HeaterTarget) -> Self {
        Self {
            target,
            efficiency: 1.0,
        }
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "heater efficiency must be in (0, 1]",
            });
        }
        match self.target {
            HeaterTarget::HeatDuty(v) | HeaterTarget::OutletEnthalpy(v) => {
                check_finite(v, "heater target")?;
            }
            HeaterTarget::OutletTemperature(t) if !(t.value.is_finite() && t.value > 0.0) => {
                return Err(ComponentError::InvalidArg {
                    what: "heater outlet temperature must be positive",
                });
            }
            HeaterTarget::OutletQuality(x) if !(0.0..=1.0).contains(&x) => {
                return Err(ComponentError::InvalidArg {
                    what: "heater outlet quality must be in [0, 1]",
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// External heat for `q` into the fluid.
    pub fn external(&self, q: f64) -> f64 {
        if q >= 0.0 { q / self.efficiency } else { q * self.efficiency }
    }

    /// Heat into the fluid for external heat `q_external`.
    pub fn absorbed(&self, q_external: f64) -> f64 {
        if q_external >= 0.0 {
            q_external * self.efficiency
        } else {
            q_external / self.efficiency
        }
    }

    pub fn solve(&self, adapter: &PropertyAdapter, inlet: &FlowState) -> ComponentResult<HeaterSolution> {
        self.validate()?;
        let p = inlet.p().value;
        let outlet = match self.target {
            HeaterTarget::HeatDuty(q_ext) => {
                if inlet.m() <= 0.0 {
                    return Err(ComponentError::InvalidArg {
                        what: "heater duty target needs a positive mass flow",
                    });
                }
                inlet.at_ph(adapter, p, inlet.h() + self.absorbed(q_ext) / inlet.m())?
            }
            HeaterTarget::OutletEnthalpy(h) => inlet.at_ph(adapter, p, h)?,
            HeaterTarget::OutletTemperature(t) => {
                let mut out = inlet.clone();
                out.update(adapter, InputPair::PT, p, t.value)?;
                out
            }
            HeaterTarget::OutletQuality(x) => {
                let mut out = inlet.clone();
                out.update(adapter, InputPair::PQ, p, x)?;
                out
            }
        };
        let q = inlet.m() * (outlet.h() - inlet.h());
        Ok(HeaterSolution {
            q_external: self.external(q),
            q,
            outlet,
        })
    }

    /// External duty that takes `inlet` to `outlet`.
    pub fn size_duty(&self, inlet: &FlowState, outlet: &FlowState) -> ComponentResult<f64> {
        self.validate()?;
        same_pressure(inlet, outlet)?;
        Ok(self.external(inlet.m() * (outlet.h() - inlet.h())))
    }

    /// Mass flow that `q_external` takes from `inlet` to `outlet`.
    pub fn size_mass_flow(&self, inlet: &FlowState, outlet: &FlowState, q_external: f64) -> ComponentResult<f64> {
        self.validate()?;
        same_pressure(inlet, outlet)?;
        let dh = outlet.h() - inlet.h();
        if dh.abs() <= TOLABS_X {
            return Err(ComponentError::InvalidArg {
                what: "heater inlet and outlet have the same enthalpy",
            });
        }
        let m = self.absorbed(q_external) / dh;
        if !(m.is_finite() && m > 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "heater duty sign disagrees with the enthalpy change",
            });
        }
        Ok(m)
    }
}

fn same_pressure(inlet: &FlowState, outlet: &FlowState) -> ComponentResult<()> {
    if crate::common::same_pressure(inlet.p().value, outlet.p().value, TOLABS_X) {
        Ok(())
    } else {
        Err(ComponentError::InvalidArg {
            what: "constant-pressure heater needs equal inlet and outlet pressures",
        })
    }
}
