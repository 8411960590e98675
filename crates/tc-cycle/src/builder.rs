//! Incremental cycle builder.

use tc_components::{Component, ComponentKind};
use tc_core::{CompId, Config, EdgeId};
use tc_fluids::{FlowState, Fluid, PropertyAdapter};

use crate::cycle::{Cycle, Placed};
use crate::error::{CycleError, CycleResult};

#[derive(Debug)]
struct EdgeSlot {
    name: String,
    source: Option<FlowState>,
}

/// Builder for a [`Cycle`].
///
/// Edges are flow-state slots; each is produced by at most one component
/// outlet and consumed by at most one component inlet. Sources are edges with
/// a fixed state that nothing produces. Anchors are produced edges whose
/// state is iterated on: the cycle seeds them, traverses, and compares.
///
/// Components run in the order they are added, so every inlet must be a
/// source, an anchor, or produced by an earlier component.
#[derive(Debug, Default)]
pub struct CycleBuilder {
    edges: Vec<EdgeSlot>,
    components: Vec<Placed>,
    anchors: Vec<(EdgeId, FlowState)>,
    config: Config,
}

impl CycleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn add_edge(&mut self, name: impl Into<String>) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len() as u32);
        self.edges.push(EdgeSlot {
            name: name.into(),
            source: None,
        });
        id
    }

    /// An edge fixed at `state` (an external stream entering the cycle).
    pub fn add_source(&mut self, name: impl Into<String>, state: FlowState) -> EdgeId {
        let id = self.add_edge(name);
        self.edges[id.slot()].source = Some(state);
        id
    }

    /// Add a component with its inlet and outlet edges in port order.
    pub fn add_component(&mut self, component: Component, inlets: &[EdgeId], outlets: &[EdgeId]) -> CompId {
        let id = CompId::from_index(self.components.len() as u32);
        self.components.push(Placed {
            component,
            inlets: inlets.to_vec(),
            outlets: outlets.to_vec(),
        });
        id
    }

    /// Tear the cycle at `edge`, starting from `seed`.
    pub fn anchor(&mut self, edge: EdgeId, seed: FlowState) {
        self.anchors.push((edge, seed));
    }

    /// Validate the wiring and freeze it into a [`Cycle`].
    pub fn build(self, adapter: PropertyAdapter) -> CycleResult<Cycle> {
        self.config.validate()?;
        let n = self.edges.len();
        let name = |e: EdgeId| {
            self.edges
                .get(e.slot())
                .map_or_else(|| format!("#{e}"), |slot| format!("'{}'", slot.name))
        };

        for placed in &self.components {
            let comp = &placed.component;
            comp.validate().map_err(|source| CycleError::Component {
                component: comp.name().to_string(),
                iteration: 0,
                source,
            })?;
            if (placed.inlets.len(), placed.outlets.len()) != comp.ports() {
                return Err(CycleError::wiring(format!(
                    "{} '{}' expects {:?} (inlets, outlets), got ({}, {})",
                    comp.kind(),
                    comp.name(),
                    comp.ports(),
                    placed.inlets.len(),
                    placed.outlets.len()
                )));
            }
            if let Some(e) = placed.inlets.iter().chain(&placed.outlets).find(|e| e.slot() >= n) {
                return Err(CycleError::wiring(format!("'{}' references unknown edge {e}", comp.name())));
            }
        }

        let mut produced = vec![false; n];
        let mut consumed = vec![false; n];
        for placed in &self.components {
            for &e in &placed.outlets {
                if produced[e.slot()] || self.edges[e.slot()].source.is_some() {
                    return Err(CycleError::wiring(format!("edge {} is produced twice", name(e))));
                }
                produced[e.slot()] = true;
            }
            for &e in &placed.inlets {
                if consumed[e.slot()] {
                    return Err(CycleError::wiring(format!("edge {} is consumed twice", name(e))));
                }
                consumed[e.slot()] = true;
            }
        }

        let mut anchored = vec![false; n];
        for (e, _) in &self.anchors {
            if e.slot() >= n || !produced[e.slot()] {
                return Err(CycleError::wiring(format!("anchor {} is not a produced edge", name(*e))));
            }
            if anchored[e.slot()] {
                return Err(CycleError::wiring(format!("edge {} is anchored twice", name(*e))));
            }
            anchored[e.slot()] = true;
        }

        // Availability in assembly order, fluid identity and internal streams.
        let open = self.anchors.is_empty();
        let mut fluid: Vec<Option<Fluid>> = vec![None; n];
        let mut internal = vec![false; n];
        for (i, slot) in self.edges.iter().enumerate() {
            if let Some(state) = &slot.source {
                fluid[i] = Some(state.fluid().clone());
                internal[i] = open;
            }
        }
        for (e, seed) in &self.anchors {
            fluid[e.slot()] = Some(seed.fluid().clone());
            internal[e.slot()] = true;
        }
        let mut available: Vec<bool> = (0..n)
            .map(|i| self.edges[i].source.is_some() || anchored[i])
            .collect();
        for placed in &self.components {
            let comp = &placed.component;
            for &e in &placed.inlets {
                if !available[e.slot()] {
                    return Err(CycleError::wiring(format!(
                        "'{}' consumes edge {} before anything produces it",
                        comp.name(),
                        name(e)
                    )));
                }
            }
            let inlet_fluids: Vec<&Fluid> = placed
                .inlets
                .iter()
                .filter_map(|e| fluid[e.slot()].as_ref())
                .collect();
            if comp.kind() == ComponentKind::Mixer && inlet_fluids.windows(2).any(|w| w[0] != w[1]) {
                return Err(CycleError::wiring(format!("mixer '{}' joins different fluids", comp.name())));
            }
            let any_internal = placed.inlets.iter().any(|e| internal[e.slot()]);
            for (k, &e) in placed.outlets.iter().enumerate() {
                let from = placed.inlets[comp.fluid_inlet(k)];
                let carried = fluid[from.slot()].clone();
                if anchored[e.slot()] {
                    if fluid[e.slot()] != carried {
                        return Err(CycleError::wiring(format!(
                            "anchor {} is seeded with a different fluid than '{}' delivers",
                            name(e),
                            comp.name()
                        )));
                    }
                } else {
                    fluid[e.slot()] = carried;
                    internal[e.slot()] = match comp.kind() {
                        ComponentKind::Mixer => any_internal,
                        _ => internal[from.slot()],
                    };
                }
                available[e.slot()] = true;
            }
        }

        let mut states: Vec<Option<FlowState>> = Vec::with_capacity(n);
        let mut names = Vec::with_capacity(n);
        for slot in self.edges {
            names.push(slot.name);
            states.push(slot.source);
        }
        let (anchors, seeds) = self.anchors.into_iter().unzip();
        Ok(Cycle::new(
            adapter,
            self.config,
            names,
            states,
            internal,
            self.components,
            anchors,
            seeds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_components::{Heater, HeaterTarget, Junction, Machine, MachineTarget};
    use tc_core::units::{k, kgps, pa};
    use tc_fluids::PerfectGasBackend;

    fn adapter() -> PropertyAdapter {
        PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases())
    }

    fn air(adapter: &PropertyAdapter) -> FlowState {
        FlowState::from_pt(adapter, Fluid::new("Air"), kgps(1.0), pa(1e5), k(300.0)).unwrap()
    }

    fn heater(name: &str) -> Component {
        Component::heater(name, Heater::new(HeaterTarget::HeatDuty(1e3)))
    }

    #[test]
    fn simple_loop_builds() {
        let adapter = adapter();
        let mut b = CycleBuilder::new();
        let e0 = b.add_edge("e0");
        let e1 = b.add_edge("e1");
        b.add_component(heater("h1"), &[e0], &[e1]);
        b.add_component(
            Component::heater("h2", Heater::new(HeaterTarget::OutletTemperature(k(300.0)))),
            &[e1],
            &[e0],
        );
        b.anchor(e0, air(&adapter));
        let cycle = b.build(adapter).unwrap();
        assert_eq!(cycle.edge("e1"), Some(e1));
    }

    #[test]
    fn unproduced_anchor_is_rejected() {
        let adapter = adapter();
        let mut b = CycleBuilder::new();
        let e0 = b.add_edge("e0");
        let e1 = b.add_edge("e1");
        b.add_component(heater("h"), &[e0], &[e1]);
        b.anchor(e0, air(&adapter));
        assert!(matches!(b.build(adapter), Err(CycleError::Wiring { .. })));
    }

    #[test]
    fn consuming_before_production_is_rejected() {
        let adapter = adapter();
        let mut b = CycleBuilder::new();
        let e0 = b.add_edge("e0");
        let e1 = b.add_edge("e1");
        let e2 = b.add_edge("e2");
        b.add_component(heater("late"), &[e1], &[e2]);
        b.add_component(heater("early"), &[e0], &[e1]);
        b.add_component(heater("close"), &[e2], &[e0]);
        b.anchor(e0, air(&adapter));
        let err = b.build(adapter).unwrap_err();
        assert!(err.to_string().contains("late"));
    }

    #[test]
    fn double_production_and_port_counts_are_rejected() {
        let adapter = adapter();
        let mut b = CycleBuilder::new();
        let s = b.add_source("in", air(&adapter));
        let e1 = b.add_edge("e1");
        b.add_component(heater("a"), &[s], &[e1]);
        b.add_component(heater("b"), &[e1], &[s]);
        assert!(b.build(adapter.clone()).is_err());

        let mut b = CycleBuilder::new();
        let s = b.add_source("in", air(&adapter));
        let e1 = b.add_edge("e1");
        b.add_component(Component::junction("mix", Junction::mixer(2).unwrap()), &[s], &[e1]);
        assert!(matches!(b.build(adapter), Err(CycleError::Wiring { .. })));
    }

    #[test]
    fn anchor_fluid_must_match_the_loop() {
        let adapter = adapter();
        let mut b = CycleBuilder::new();
        let e0 = b.add_edge("e0");
        let e1 = b.add_edge("e1");
        let s = b.add_source("helium", {
            FlowState::from_pt(&adapter, Fluid::new("Helium"), kgps(1.0), pa(1e5), k(300.0)).unwrap()
        });
        let e2 = b.add_edge("mixed");
        b.add_component(
            Component::machine("c", Machine::compressor(0.8, MachineTarget::PressureRatio(2.0)).unwrap()),
            &[e0],
            &[e1],
        );
        b.add_component(Component::junction("mix", Junction::mixer(2).unwrap()), &[e1, s], &[e2]);
        b.add_component(heater("h"), &[e2], &[e0]);
        b.anchor(e0, air(&adapter));
        let err = b.build(adapter).unwrap_err();
        assert!(err.to_string().contains("mix"));
    }
}
