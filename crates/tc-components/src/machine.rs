//! Compressors and expanders with an isentropic efficiency.

use tc_core::solve::{RootConfig, brent};
use tc_core::units::{Pressure, pa};
use tc_core::{Config, TOLABS_X};
use tc_fluids::{FlowState, InputPair, PropertyAdapter};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineKind {
    Compressor,
    Expander,
}

/// What fixes the outlet pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MachineTarget {
    /// Pressure ratio >= 1 (`p_out/p_in` for a compressor, `p_in/p_out` for
    /// an expander).
    PressureRatio(f64),
    OutletPressure(Pressure),
    /// Shaft power magnitude [W]: absorbed by a compressor, delivered by an
    /// expander.
    ShaftPower(f64),
}

/// Adiabatic turbomachine.
///
/// The isentropic outlet is evaluated from `PSmass(p_out, s_in)`; the real
/// outlet enthalpy follows from the efficiency:
///
/// ```text
/// compressor: h_out = h_in + (h_s - h_in) / eta
/// expander:   h_out = h_in - eta (h_in - h_s)
/// ```
///
/// With `eta = 1` the isentropic state is returned as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct Machine {
    pub kind: MachineKind,
    /// Isentropic efficiency (0 < eta <= 1)
    pub eta: f64,
    pub target: MachineTarget,
}

/// Growth steps when bracketing a shaft-power target.
const MAX_BRACKET_STEPS: usize = 12;

impl Machine {
    pub fn new(kind: MachineKind, eta: f64, target: MachineTarget) -> ComponentResult<Self> {
        let machine = Self { kind, eta, target };
        machine.validate()?;
        Ok(machine)
    }

    pub fn compressor(eta: f64, target: MachineTarget) -> ComponentResult<Self> {
        Self::new(MachineKind::Compressor, eta, target)
    }

    pub fn expander(eta: f64, target: MachineTarget) -> ComponentResult<Self> {
        Self::new(MachineKind::Expander, eta, target)
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if !(self.eta > 0.0 && self.eta <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "isentropic efficiency must be in (0, 1]",
            });
        }
        match self.target {
            MachineTarget::PressureRatio(r) if !(r.is_finite() && r >= 1.0) => {
                Err(ComponentError::InvalidArg {
                    what: "pressure ratio must be at least 1",
                })
            }
            MachineTarget::OutletPressure(p) if !(p.value.is_finite() && p.value > 0.0) => {
                Err(ComponentError::InvalidArg {
                    what: "outlet pressure must be positive",
                })
            }
            MachineTarget::ShaftPower(w) if !(w.is_finite() && w >= 0.0) => {
                Err(ComponentError::InvalidArg {
                    what: "shaft power must be non-negative",
                })
            }
            _ => Ok(()),
        }
    }

    /// Outlet state for a given outlet pressure.
    pub fn outlet_at(
        &self,
        adapter: &PropertyAdapter,
        inlet: &FlowState,
        p_out: Pressure,
    ) -> ComponentResult<FlowState> {
        let p_out = check_finite(p_out.value, "machine outlet pressure")?;
        let p_in = inlet.p().value;
        let wrong_way = match self.kind {
            MachineKind::Compressor => p_out < p_in,
            MachineKind::Expander => p_out > p_in,
        };
        if wrong_way {
            return Err(ComponentError::InvalidArg {
                what: "machine outlet pressure is on the wrong side of the inlet",
            });
        }

        let s_in = inlet.s();
        let isentropic = adapter.evaluate(inlet.fluid(), InputPair::PSmass, p_out, s_in)?;
        if self.eta == 1.0 {
            return Ok(FlowState::evaluated(
                inlet.fluid().clone(),
                inlet.mass_flow(),
                InputPair::PSmass,
                p_out,
                s_in,
                isentropic,
            )?);
        }
        let h_in = inlet.h();
        let h_out = match self.kind {
            MachineKind::Compressor => h_in + (isentropic.h - h_in) / self.eta,
            MachineKind::Expander => h_in - self.eta * (h_in - isentropic.h),
        };
        Ok(inlet.at_ph(adapter, p_out, h_out)?)
    }

    /// Power into the fluid [W] at outlet pressure `p_out`.
    pub fn power_at(&self, adapter: &PropertyAdapter, inlet: &FlowState, p_out: Pressure) -> ComponentResult<f64> {
        let out = self.outlet_at(adapter, inlet, p_out)?;
        Ok(inlet.m() * (out.h() - inlet.h()))
    }

    pub fn solve(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        inlet: &FlowState,
    ) -> ComponentResult<FlowState> {
        self.validate()?;
        let p_in = inlet.p().value;
        let p_out = match (self.kind, self.target) {
            (MachineKind::Compressor, MachineTarget::PressureRatio(r)) => p_in * r,
            (MachineKind::Expander, MachineTarget::PressureRatio(r)) => p_in / r,
            (_, MachineTarget::OutletPressure(p)) => p.value,
            (_, MachineTarget::ShaftPower(w)) => self.pressure_for_power(adapter, config, inlet, w)?,
        };
        self.outlet_at(adapter, inlet, pa(p_out))
    }

    /// Brent on the outlet pressure between the inlet pressure (no work) and
    /// a ratio grown until the power target is passed.
    fn pressure_for_power(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        inlet: &FlowState,
        target: f64,
    ) -> ComponentResult<f64> {
        let p_in = inlet.p().value;
        if target == 0.0 {
            return Ok(p_in);
        }
        if inlet.m() <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "shaft power target needs a positive mass flow",
            });
        }
        let step = match self.kind {
            MachineKind::Compressor => 2.0,
            MachineKind::Expander => 0.5,
        };
        let residual = |p: f64| -> ComponentResult<f64> {
            Ok(self.power_at(adapter, inlet, pa(p))?.abs() - target)
        };

        let mut p_far = p_in * step;
        let mut steps = 0;
        while residual(p_far)? < 0.0 {
            steps += 1;
            if steps >= MAX_BRACKET_STEPS {
                return Err(ComponentError::NotConverged {
                    what: "machine shaft power target out of reach",
                    iterations: steps,
                    residual: target,
                });
            }
            p_far *= step;
        }
        let settings = RootConfig {
            f_tol: (config.tol_rel * target).max(TOLABS_X),
            x_tol: (TOLABS_X * p_in).max(TOLABS_X),
            max_iterations: config.max_iter_component,
        };
        Ok(brent(residual, p_in, p_far, &settings)?.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tc_core::units::{bar, k, kgps};
    use tc_fluids::{Fluid, PerfectGasBackend};

    fn air(adapter: &PropertyAdapter) -> FlowState {
        FlowState::from_pt(adapter, Fluid::new("Air"), kgps(1.0), pa(1e5), k(300.0)).unwrap()
    }

    #[test]
    fn ideal_gas_compression_follows_the_isentrope() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = air(&adapter);
        let machine = Machine::compressor(1.0, MachineTarget::PressureRatio(4.0)).unwrap();
        let out = machine.solve(&adapter, &Config::default(), &inlet).unwrap();
        assert_relative_eq!(out.p().value, 4e5, max_relative = 1e-12);
        assert_relative_eq!(out.s(), inlet.s(), epsilon = 1e-9);
        assert!(out.t().value > 400.0);
    }

    #[test]
    fn efficiency_raises_compressor_work() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = air(&adapter);
        let ideal = Machine::compressor(1.0, MachineTarget::OutletPressure(bar(3.0))).unwrap();
        let real = Machine::compressor(0.8, MachineTarget::OutletPressure(bar(3.0))).unwrap();
        let w_ideal = ideal.power_at(&adapter, &inlet, bar(3.0)).unwrap();
        let w_real = real.power_at(&adapter, &inlet, bar(3.0)).unwrap();
        assert_relative_eq!(w_real, w_ideal / 0.8, max_relative = 1e-9);
    }

    #[test]
    fn expander_meets_a_power_target() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(1.0), pa(1e6), k(900.0)).unwrap();
        let machine = Machine::expander(0.9, MachineTarget::ShaftPower(2e5)).unwrap();
        let out = machine.solve(&adapter, &Config::default(), &inlet).unwrap();
        assert!(out.p().value < 1e6);
        assert_relative_eq!(inlet.h() - out.h(), 2e5, max_relative = 1e-6);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(Machine::compressor(0.0, MachineTarget::PressureRatio(2.0)).is_err());
        assert!(Machine::compressor(1.1, MachineTarget::PressureRatio(2.0)).is_err());
        assert!(Machine::expander(0.9, MachineTarget::PressureRatio(0.5)).is_err());

        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = air(&adapter);
        let machine = Machine::compressor(0.9, MachineTarget::OutletPressure(pa(5e4))).unwrap();
        assert!(Machine::expander(0.9, MachineTarget::OutletPressure(pa(-1.0))).is_err());
        assert!(matches!(
            machine.solve(&adapter, &Config::default(), &inlet),
            Err(ComponentError::InvalidArg { .. })
        ));
    }
}
