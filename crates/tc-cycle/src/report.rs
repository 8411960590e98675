//! Post-solve reporting: iterations, per-component results, energy balance.

use tc_components::{ComponentKind, Introspection, Warning};

use crate::cycle::Cycle;

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentReport {
    pub name: String,
    pub kind: ComponentKind,
    pub introspection: Introspection,
    pub warnings: Vec<Warning>,
}

/// Energy crossing the cycle boundary [W], positive into the working fluid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyBalance {
    /// Net shaft work into the fluid
    pub work: f64,
    /// Sum of positive external heats
    pub heat_in: f64,
    /// Sum of negative external heats
    pub heat_out: f64,
}

impl EnergyBalance {
    /// Net energy into a closed cycle; zero at convergence.
    pub fn closure(&self) -> f64 {
        self.work + self.heat_in + self.heat_out
    }

    fn add_heat(&mut self, q: f64) {
        if q >= 0.0 {
            self.heat_in += q;
        } else {
            self.heat_out += q;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    pub iterations: usize,
    pub residual_history: Vec<f64>,
    pub components: Vec<ComponentReport>,
    pub energy: EnergyBalance,
}

impl CycleReport {
    /// Gather the last introspection of every component.
    ///
    /// Work and heat count when the stream they act on belongs to the cycle.
    /// Exchanger heat counts only when exactly one of its streams belongs to
    /// the cycle; a recuperator moves heat internally.
    pub(crate) fn collect(cycle: &Cycle, iterations: usize, residual_history: Vec<f64>) -> Self {
        let mut energy = EnergyBalance::default();
        let mut components = Vec::new();
        for placed in cycle.placed() {
            let comp = &placed.component;
            let Some(info) = comp.introspect().copied() else {
                continue;
            };
            let primary_internal = placed.inlets.first().is_some_and(|&e| cycle.is_internal(e));
            match (comp.kind(), info.secondary) {
                (ComponentKind::HeatExchanger, Some(secondary)) => {
                    let secondary_internal = placed.inlets.get(1).is_some_and(|&e| cycle.is_internal(e));
                    match (primary_internal, secondary_internal) {
                        (true, false) => energy.add_heat(info.heat),
                        (false, true) => energy.add_heat(secondary.heat),
                        _ => {}
                    }
                }
                _ if primary_internal => {
                    energy.work += info.work;
                    energy.add_heat(info.heat);
                }
                _ => {}
            }
            components.push(ComponentReport {
                name: comp.name().to_string(),
                kind: comp.kind(),
                introspection: info,
                warnings: comp.warnings().to_vec(),
            });
        }
        Self {
            iterations,
            residual_history,
            components,
            energy,
        }
    }

    /// Net shaft work into the fluid [W]; negative for a power cycle.
    pub fn work_net(&self) -> f64 {
        self.energy.work
    }

    /// Net work delivered per unit heat supplied, when heat is supplied.
    pub fn thermal_efficiency(&self) -> Option<f64> {
        (self.energy.heat_in > 0.0).then(|| -self.energy.work / self.energy.heat_in)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn final_residual(&self) -> f64 {
        self.residual_history.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_from_balance() {
        let report = CycleReport {
            iterations: 1,
            residual_history: vec![0.0],
            components: Vec::new(),
            energy: EnergyBalance {
                work: -300.0,
                heat_in: 1000.0,
                heat_out: -700.0,
            },
        };
        assert_eq!(report.thermal_efficiency(), Some(0.3));
        assert_eq!(report.energy.closure(), 0.0);
    }

    #[test]
    fn no_heat_in_means_no_efficiency() {
        let report = CycleReport {
            iterations: 1,
            residual_history: Vec::new(),
            components: Vec::new(),
            energy: EnergyBalance::default(),
        };
        assert_eq!(report.thermal_efficiency(), None);
    }
}
