//! Pipe: friction and optional heat exchange with the surroundings.

use tc_core::units::Length;
use tc_core::{Config, TransferMode};
use tc_fluids::{FlowState, PropertyAdapter};

use crate::discretizer::{HeatLoss, SingleStreamSolution, march_single};
use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, Wall};

/// Pipe run discretized into equal-length cells.
///
/// Pressure drop follows from the channel's friction correlations (Darcy
/// friction, acceleration and elevation terms per cell); heat is exchanged
/// according to [`HeatLoss`].
#[derive(Clone, Debug, PartialEq)]
pub struct Pipe {
    /// Flow length [m]
    pub length: f64,
    pub channel: Channel,
    pub wall: Wall,
    pub heat: HeatLoss,
    pub mode: TransferMode,
    pub cells: usize,
}

impl Pipe {
    pub fn new(length: Length, channel: Channel) -> Self {
        Self {
            length: length.value,
            channel,
            wall: Wall::default(),
            heat: HeatLoss::None,
            mode: TransferMode::All,
            cells: 10,
        }
    }

    pub fn with_heat_loss(mut self, heat: HeatLoss) -> Self {
        self.heat = heat;
        self
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.wall = wall;
        self
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cells(mut self, cells: usize) -> Self {
        self.cells = cells;
        self
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "pipe length must be positive",
            });
        }
        if self.cells == 0 {
            return Err(ComponentError::InvalidArg {
                what: "pipe cell count must be nonzero",
            });
        }
        self.channel.validate()?;
        self.wall.validate()?;
        match self.heat {
            HeatLoss::Duty(q) if !q.is_finite() => Err(ComponentError::NonPhysical { what: "pipe duty" }),
            HeatLoss::Ambient { t, ua_per_length } if !(t > 0.0 && ua_per_length >= 0.0) => {
                Err(ComponentError::InvalidArg {
                    what: "ambient temperature must be positive and conductance non-negative",
                })
            }
            _ => Ok(()),
        }
    }

    pub fn solve(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        inlet: &FlowState,
    ) -> ComponentResult<SingleStreamSolution> {
        self.validate()?;
        march_single(
            adapter,
            config,
            inlet,
            &self.channel,
            self.wall,
            self.mode,
            self.length,
            self.cells,
            self.heat,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tc_core::units::{k, kgps, m, mm, pa};
    use tc_fluids::{Fluid, PerfectGasBackend};

    fn inlet(adapter: &PropertyAdapter) -> FlowState {
        FlowState::from_pt(adapter, Fluid::new("Nitrogen"), kgps(0.1), pa(5e5), k(300.0)).unwrap()
    }

    #[test]
    fn adiabatic_pipe_keeps_enthalpy() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = inlet(&adapter);
        let pipe = Pipe::new(m(20.0), Channel::tubes(mm(25.0), 1).unwrap());
        let sol = pipe.solve(&adapter, &Config::default(), &inlet).unwrap();
        assert_relative_eq!(sol.outlet.h(), inlet.h(), epsilon = 1e-9);
        assert!(sol.dp > 0.0);
        assert_relative_eq!(sol.q, 0.0);
    }

    #[test]
    fn rising_pipe_loses_head() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = inlet(&adapter);
        let flat = Pipe::new(m(20.0), Channel::tubes(mm(25.0), 1).unwrap());
        let rising = Pipe::new(
            m(20.0),
            Channel::tubes(mm(25.0), 1)
                .unwrap()
                .with_inclination(std::f64::consts::FRAC_PI_2),
        );
        let config = Config::default();
        let dp_flat = flat.solve(&adapter, &config, &inlet).unwrap().dp;
        let dp_rising = rising.solve(&adapter, &config, &inlet).unwrap().dp;
        assert!(dp_rising > dp_flat);
    }

    #[test]
    fn validation_catches_zero_cells() {
        let pipe = Pipe::new(m(1.0), Channel::tubes(mm(10.0), 1).unwrap()).with_cells(0);
        assert!(pipe.validate().is_err());
    }
}
