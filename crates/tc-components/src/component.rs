//! The component contract the cycle drives.

use core::fmt;

use tc_core::Config;
use tc_fluids::{FlowState, PropertyAdapter};

use crate::error::{ComponentError, ComponentResult};
use crate::heat_exchanger::HeatExchanger;
use crate::heater::Heater;
use crate::junction::Junction;
use crate::machine::{Machine, MachineKind};
use crate::pipe::Pipe;
use crate::warning::Warning;

/// Shared inputs for a component solve.
#[derive(Clone, Copy)]
pub struct ComponentContext<'a> {
    pub adapter: &'a PropertyAdapter,
    pub config: &'a Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Compressor,
    Expander,
    Pipe,
    Mixer,
    Splitter,
    HeatExchanger,
    Heater,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::Compressor => "compressor",
            ComponentKind::Expander => "expander",
            ComponentKind::Pipe => "pipe",
            ComponentKind::Mixer => "mixer",
            ComponentKind::Splitter => "splitter",
            ComponentKind::HeatExchanger => "heat exchanger",
            ComponentKind::Heater => "heater",
        };
        f.write_str(s)
    }
}

/// Heat and pressure drop of an exchanger's secondary stream.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SecondaryIntrospection {
    /// Heat into the secondary [W]
    pub heat: f64,
    pub dp: f64,
}

/// Energy and pressure bookkeeping of the last solve, all into the primary
/// stream.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Introspection {
    /// Shaft work [W]
    pub work: f64,
    /// Heat [W]
    pub heat: f64,
    /// Pressure drop inlet to outlet [Pa]
    pub dp: f64,
    pub secondary: Option<SecondaryIntrospection>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Model {
    Machine(Machine),
    Pipe(Pipe),
    Junction(Junction),
    HeatExchanger(HeatExchanger),
    Heater(Heater),
}

/// A named model plus the results of its last solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    name: String,
    pub model: Model,
    last: Option<Introspection>,
    warnings: Vec<Warning>,
}

impl Component {
    pub fn new(name: impl Into<String>, model: Model) -> Self {
        Self {
            name: name.into(),
            model,
            last: None,
            warnings: Vec::new(),
        }
    }

    pub fn machine(name: impl Into<String>, machine: Machine) -> Self {
        Self::new(name, Model::Machine(machine))
    }

    pub fn pipe(name: impl Into<String>, pipe: Pipe) -> Self {
        Self::new(name, Model::Pipe(pipe))
    }

    pub fn junction(name: impl Into<String>, junction: Junction) -> Self {
        Self::new(name, Model::Junction(junction))
    }

    pub fn heat_exchanger(name: impl Into<String>, hx: HeatExchanger) -> Self {
        Self::new(name, Model::HeatExchanger(hx))
    }

    pub fn heater(name: impl Into<String>, heater: Heater) -> Self {
        Self::new(name, Model::Heater(heater))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ComponentKind {
        match &self.model {
            Model::Machine(m) => match m.kind {
                MachineKind::Compressor => ComponentKind::Compressor,
                MachineKind::Expander => ComponentKind::Expander,
            },
            Model::Pipe(_) => ComponentKind::Pipe,
            Model::Junction(Junction::Mixer { .. }) => ComponentKind::Mixer,
            Model::Junction(Junction::Splitter { .. }) => ComponentKind::Splitter,
            Model::HeatExchanger(_) => ComponentKind::HeatExchanger,
            Model::Heater(_) => ComponentKind::Heater,
        }
    }

    /// (inlets, outlets)
    pub fn ports(&self) -> (usize, usize) {
        match &self.model {
            Model::Machine(_) | Model::Pipe(_) | Model::Heater(_) => (1, 1),
            Model::Junction(j) => j.ports(),
            Model::HeatExchanger(_) => (2, 2),
        }
    }

    /// The inlet whose fluid leaves through `outlet`.
    pub fn fluid_inlet(&self, outlet: usize) -> usize {
        match &self.model {
            Model::HeatExchanger(_) => outlet,
            _ => 0,
        }
    }

    pub fn validate(&self) -> ComponentResult<()> {
        match &self.model {
            Model::Machine(m) => m.validate(),
            Model::Pipe(p) => p.validate(),
            Model::Junction(j) => j.validate(),
            Model::HeatExchanger(hx) => hx.validate(),
            Model::Heater(h) => h.validate(),
        }
    }

    /// Outlet states from inlet states, in port order. Records introspection
    /// and warnings on success and clears them on failure.
    pub fn solve(&mut self, ctx: ComponentContext<'_>, inlets: &[FlowState]) -> ComponentResult<Vec<FlowState>> {
        self.last = None;
        self.warnings.clear();
        if inlets.len() != self.ports().0 {
            return Err(ComponentError::InvalidArg {
                what: "inlet count does not match the component ports",
            });
        }
        let ComponentContext { adapter, config } = ctx;
        let (outlets, introspection, warnings) = match &mut self.model {
            Model::Machine(m) => {
                let out = m.solve(adapter, config, &inlets[0])?;
                let info = Introspection {
                    work: inlets[0].m() * (out.h() - inlets[0].h()),
                    heat: 0.0,
                    dp: inlets[0].p().value - out.p().value,
                    secondary: None,
                };
                (vec![out], info, Vec::new())
            }
            Model::Pipe(p) => {
                let sol = p.solve(adapter, config, &inlets[0])?;
                let info = Introspection {
                    work: 0.0,
                    heat: sol.q,
                    dp: sol.dp,
                    secondary: None,
                };
                (vec![sol.outlet], info, sol.warnings)
            }
            Model::Junction(j) => {
                let outlets = j.solve(adapter, inlets)?;
                let p_in = inlets.iter().map(|s| s.p().value).fold(f64::INFINITY, f64::min);
                let p_out = outlets.iter().map(|s| s.p().value).fold(f64::INFINITY, f64::min);
                let info = Introspection {
                    dp: p_in - p_out,
                    ..Introspection::default()
                };
                (outlets, info, Vec::new())
            }
            Model::HeatExchanger(hx) => {
                let sol = hx.solve(adapter, config, &inlets[0], &inlets[1])?;
                let info = Introspection {
                    work: 0.0,
                    heat: sol.q,
                    dp: sol.dp_primary,
                    secondary: Some(SecondaryIntrospection {
                        heat: sol.secondary_outlet.enthalpy_flow() - inlets[1].enthalpy_flow(),
                        dp: sol.dp_secondary,
                    }),
                };
                (vec![sol.primary_outlet, sol.secondary_outlet], info, sol.warnings)
            }
            Model::Heater(h) => {
                let sol = h.solve(adapter, &inlets[0])?;
                let info = Introspection {
                    heat: sol.q,
                    ..Introspection::default()
                };
                (vec![sol.outlet], info, Vec::new())
            }
        };
        for w in &warnings {
            tracing::debug!(component = %self.name, warning = %w, "component warning");
        }
        self.last = Some(introspection);
        self.warnings = warnings;
        Ok(outlets)
    }

    /// Introspection of the last successful solve.
    pub fn introspect(&self) -> Option<&Introspection> {
        self.last.as_ref()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
