//! Two-stream heat exchanger.

use tc_core::{Config, FlowSense};
use tc_fluids::{FlowState, PropertyAdapter};

use crate::discretizer::{CellPolicy, Design, Discretizer, ExchangerSolution, Status};
use crate::error::ComponentResult;
use crate::geometry::{Channel, Wall};

/// Heat exchanger sized or rated by a [`Design`] variable.
///
/// Inlets and outlets are ordered `[primary, secondary]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatExchanger {
    pub discretizer: Discretizer,
    pub design: Design,
}

impl HeatExchanger {
    pub fn new(primary: Channel, secondary: Channel, sense: FlowSense, design: Design) -> Self {
        Self {
            discretizer: Discretizer::new(primary, secondary, sense),
            design,
        }
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.discretizer = self.discretizer.with_wall(wall);
        self
    }

    pub fn with_policy(mut self, policy: CellPolicy) -> Self {
        self.discretizer = self.discretizer.with_policy(policy);
        self
    }

    pub fn with_mode(mut self, mode: tc_core::TransferMode) -> Self {
        self.discretizer = self.discretizer.with_mode(mode);
        self
    }

    pub fn status(&self) -> Status {
        self.discretizer.status()
    }

    pub fn validate(&self) -> ComponentResult<()> {
        self.discretizer.validate()
    }

    pub fn solve(
        &mut self,
        adapter: &PropertyAdapter,
        config: &Config,
        primary: &FlowState,
        secondary: &FlowState,
    ) -> ComponentResult<ExchangerSolution> {
        let design = self.design;
        self.discretizer.solve(adapter, config, primary, secondary, design)
    }
}
