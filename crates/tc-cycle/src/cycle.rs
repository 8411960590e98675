//! Cycle state and the outer fixed-point iteration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::DVector;
use tc_components::{Component, ComponentContext};
use tc_core::units::{kgps, pa};
use tc_core::{Config, EdgeId, residual_scale};
use tc_fluids::{FlowState, FluidResult, PropertyAdapter};

use crate::accel::{Broyden, Warmup, substitution};
use crate::error::{CycleError, CycleResult};
use crate::report::CycleReport;

/// A component with its edges in port order.
#[derive(Clone, Debug)]
pub(crate) struct Placed {
    pub component: Component,
    pub inlets: Vec<EdgeId>,
    pub outlets: Vec<EdgeId>,
}

/// Shared flag checked at the top of every outer iteration.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An assembled cycle: edge states, components in assembly order, anchors.
#[derive(Clone, Debug)]
pub struct Cycle {
    adapter: PropertyAdapter,
    config: Config,
    names: Vec<String>,
    states: Vec<Option<FlowState>>,
    internal: Vec<bool>,
    components: Vec<Placed>,
    anchors: Vec<EdgeId>,
    seeds: Vec<FlowState>,
    cancel: CancelToken,
}

/// `[m, p, h]` per state.
fn pack(states: &[FlowState]) -> DVector<f64> {
    DVector::from_iterator(
        3 * states.len(),
        states.iter().flat_map(|s| [s.m(), s.p().value, s.h()]),
    )
}

impl Cycle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        adapter: PropertyAdapter,
        config: Config,
        names: Vec<String>,
        states: Vec<Option<FlowState>>,
        internal: Vec<bool>,
        components: Vec<Placed>,
        anchors: Vec<EdgeId>,
        seeds: Vec<FlowState>,
    ) -> Self {
        Self {
            adapter,
            config,
            names,
            states,
            internal,
            components,
            anchors,
            seeds,
            cancel: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn adapter(&self) -> &PropertyAdapter {
        &self.adapter
    }

    pub fn set_adapter(&mut self, adapter: PropertyAdapter) {
        self.adapter = adapter;
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn edge(&self, name: &str) -> Option<EdgeId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| EdgeId::from_index(i as u32))
    }

    /// Latest state on `edge`; `None` before the first traversal reaches it.
    pub fn state(&self, edge: EdgeId) -> Option<&FlowState> {
        self.states.get(edge.slot()).and_then(Option::as_ref)
    }

    /// Current anchor seeds, in the order they were anchored.
    pub fn seeds(&self) -> &[FlowState] {
        &self.seeds
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().map(|p| &p.component)
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components().find(|c| c.name() == name)
    }

    pub(crate) fn placed(&self) -> &[Placed] {
        &self.components
    }

    pub(crate) fn is_internal(&self, edge: EdgeId) -> bool {
        self.internal.get(edge.slot()).copied().unwrap_or(false)
    }

    /// Solve the cycle.
    ///
    /// Each iteration traverses the components from the current seeds and
    /// compares the anchors they produce with the seeds on `(m, p, h)`, scaled
    /// by the seed magnitudes at the start of the run. Seeds are updated by
    /// the warm-up rule, then by Broyden.
    pub fn run(&mut self) -> CycleResult<CycleReport> {
        if self.anchors.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(CycleError::Cancelled { iteration: 1 });
            }
            self.traverse(1)?;
            tracing::info!(iterations = 1, "open cycle solved");
            return Ok(CycleReport::collect(self, 1, vec![0.0]));
        }

        let config = self.config.clone();
        let x0 = pack(&self.seeds);
        let scale = x0.map(residual_scale);
        let mut y = x0.component_div(&scale);
        let mut warmup = Warmup::new(config.accelerator, config.wegstein_bounds);
        let mut broyden = Broyden::new(y.len());
        let mut history: Vec<f64> = Vec::new();

        for iteration in 1..=config.max_iter_cycle {
            if self.cancel.is_cancelled() {
                return Err(CycleError::Cancelled { iteration });
            }
            let produced = self.traverse(iteration)?;
            let g = pack(&produced).component_div(&scale);
            let norm = (&g - &y).amax();
            let warming = iteration <= config.warmup_iters;
            let accelerator = if warming { warmup.name() } else { "broyden" };
            tracing::debug!(iteration, residual = norm, accelerator, "cycle iteration");

            let grew = history.last().is_some_and(|&last| norm > last);
            history.push(norm);
            if norm < config.tol_cycle {
                self.seeds = produced;
                tracing::info!(iterations = iteration, residual = norm, "cycle converged");
                return Ok(CycleReport::collect(self, iteration, history));
            }

            let candidate = if warming {
                warmup.step(&y, &g, config.damping)
            } else {
                match broyden.step(&y, &g) {
                    Some(next) if !grew => next,
                    _ => {
                        tracing::debug!(iteration, "broyden step rejected, substituting");
                        broyden.reset();
                        substitution(&y, &g, config.damping)
                    }
                }
            };
            match self.seeds_from(&candidate.component_mul(&scale)) {
                Ok(seeds) => {
                    self.seeds = seeds;
                    y = candidate;
                }
                Err(err) => {
                    tracing::debug!(iteration, error = %err, "seed update out of range, substituting");
                    broyden.reset();
                    let fallback = substitution(&y, &g, config.damping);
                    self.seeds = self
                        .seeds_from(&fallback.component_mul(&scale))
                        .map_err(|source| CycleError::Seed { iteration, source })?;
                    y = fallback;
                }
            }
        }
        Err(CycleError::NotConverged {
            iterations: config.max_iter_cycle,
            residual: history.last().copied().unwrap_or(f64::INFINITY),
        })
    }

    fn seeds_from(&self, x: &DVector<f64>) -> FluidResult<Vec<FlowState>> {
        self.seeds
            .iter()
            .enumerate()
            .map(|(i, seed)| {
                let (m, p, h) = (x[3 * i], x[3 * i + 1], x[3 * i + 2]);
                FlowState::from_ph(&self.adapter, seed.fluid().clone(), kgps(m.max(0.0)), pa(p), h)
            })
            .collect()
    }

    /// Run every component once in assembly order; returns the produced
    /// anchor states.
    fn traverse(&mut self, iteration: usize) -> CycleResult<Vec<FlowState>> {
        let Cycle {
            adapter,
            config,
            names,
            states,
            components,
            anchors,
            seeds,
            ..
        } = self;
        let ctx = ComponentContext {
            adapter: &*adapter,
            config: &*config,
        };
        for placed in components.iter_mut() {
            let inlets = placed
                .inlets
                .iter()
                .map(|&e| match anchors.iter().position(|&a| a == e) {
                    Some(i) => Ok(seeds[i].clone()),
                    None => states[e.slot()].clone().ok_or_else(|| {
                        CycleError::wiring(format!("edge '{}' has no state", names[e.slot()]))
                    }),
                })
                .collect::<CycleResult<Vec<_>>>()?;
            let comp = &mut placed.component;
            let outlets = comp.solve(ctx, &inlets).map_err(|source| CycleError::Component {
                component: comp.name().to_string(),
                iteration,
                source,
            })?;
            for (&e, state) in placed.outlets.iter().zip(outlets) {
                states[e.slot()] = Some(state);
            }
        }
        anchors
            .iter()
            .map(|&a| {
                states[a.slot()].clone().ok_or_else(|| {
                    CycleError::wiring(format!("anchor '{}' was not produced", names[a.slot()]))
                })
            })
            .collect()
    }
}
