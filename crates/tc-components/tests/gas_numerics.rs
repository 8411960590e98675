//! Perfect-gas checks of the discretization and the junction balances.

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use proptest::prelude::*;
use tc_components::{CellPolicy, Channel, ComponentError, Design, Discretizer, Junction};
use tc_core::units::{k, kgps, m, pa};
use tc_core::{Config, FlowSense, FluidPhase, TOLABS_X, TransferMode};
use tc_fluids::{
    CriticalPoint, FlowState, Fluid, FluidResult, InputPair, PerfectGasBackend, Properties,
    PropertyAdapter, PropertyBackend, Saturation,
};

fn adapter() -> PropertyAdapter {
    PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases())
}

fn streams(adapter: &PropertyAdapter) -> (FlowState, FlowState) {
    let cold = FlowState::from_pt(adapter, Fluid::new("Air"), kgps(0.2), pa(3e5), k(300.0)).unwrap();
    let hot = FlowState::from_pt(adapter, Fluid::new("Nitrogen"), kgps(0.15), pa(2e5), k(700.0)).unwrap();
    (cold, hot)
}

fn exchanger(policy: CellPolicy) -> Discretizer {
    Discretizer::new(
        Channel::tubes(m(0.012), 30).unwrap(),
        Channel::tubes(m(0.02), 30).unwrap(),
        FlowSense::Counterflow,
    )
    .with_mode(TransferMode::Heat)
    .with_policy(policy)
}

#[test]
fn one_cell_and_many_cells_agree_at_prescribed_duty() {
    let adapter = adapter();
    let (cold, hot) = streams(&adapter);
    let config = Config {
        cells_per_region: 1,
        ..Config::default()
    };
    let q = 3.0e4;
    let mut coarse = exchanger(CellPolicy::Uniform(1));
    let mut fine = exchanger(CellPolicy::Uniform(40));
    let a = coarse.solve(&adapter, &config, &cold, &hot, Design::HeatDuty(q)).unwrap();
    let b = fine.solve(&adapter, &config, &cold, &hot, Design::HeatDuty(q)).unwrap();

    assert_eq!(a.cells.len(), 1);
    assert_eq!(b.cells.len(), 40);
    assert_relative_eq!(a.primary_outlet.h(), b.primary_outlet.h(), max_relative = 1e-9);
    assert_relative_eq!(a.secondary_outlet.h(), b.secondary_outlet.h(), max_relative = 1e-9);
    // Constant capacities: the log-mean cell is exact, only Newton noise remains
    assert_relative_eq!(a.ua, b.ua, max_relative = 1e-4);
}

#[test]
fn length_design_recovers_the_rated_duty() {
    let adapter = adapter();
    let (cold, hot) = streams(&adapter);
    let config = Config::default();
    let mut dx = exchanger(CellPolicy::default());
    let rated = dx.solve(&adapter, &config, &cold, &hot, Design::HeatDuty(2.0e4)).unwrap();
    let sized = dx
        .solve(&adapter, &config, &cold, &hot, Design::Length(m(rated.length)))
        .unwrap();
    assert_relative_eq!(sized.q, 2.0e4, max_relative = 1e-4);
}

#[test]
fn pinch_design_hits_the_target() {
    let adapter = adapter();
    let (cold, hot) = streams(&adapter);
    let config = Config::default();
    let mut dx = exchanger(CellPolicy::default());
    let sol = dx.solve(&adapter, &config, &cold, &hot, Design::PinchDeltaT(25.0)).unwrap();
    assert_relative_eq!(sol.pinch, 25.0, max_relative = 1e-4);
}

#[test]
fn pinch_floor_rejects_a_uniform_thirty_kelvin_profile() {
    let adapter = adapter();
    // Equal capacities in counterflow keep the driving dT uniform
    let cold = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(0.2), pa(3e5), k(300.0)).unwrap();
    let hot = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(0.2), pa(2e5), k(600.0)).unwrap();
    let design = Design::Effectiveness(0.9);

    let mut dx = exchanger(CellPolicy::Uniform(5));
    let open = dx.solve(&adapter, &Config::default(), &cold, &hot, design).unwrap();
    assert_relative_eq!(open.pinch, 30.0, max_relative = 1e-6);

    let config = Config {
        pinch_floor: 50.0,
        ..Config::default()
    };
    let err = dx.solve(&adapter, &config, &cold, &hot, design).unwrap_err();
    match err {
        ComponentError::InfeasibleGeometry { min_delta_t, .. } => {
            assert_relative_eq!(min_delta_t, 30.0, max_relative = 1e-6);
        }
        other => panic!("expected InfeasibleGeometry, got {other:?}"),
    }
}

/// Perfect gas that honors phase hints and records each one it receives.
struct PhaseLog {
    inner: PerfectGasBackend,
    hints: Mutex<Vec<FluidPhase>>,
}

impl PhaseLog {
    fn new() -> Self {
        Self {
            inner: PerfectGasBackend::with_common_gases(),
            hints: Mutex::new(Vec::new()),
        }
    }
}

impl PropertyBackend for PhaseLog {
    fn name(&self) -> &str {
        "PhaseLog"
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn honors_phase_hint(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
        imposed: FluidPhase,
    ) -> FluidResult<Properties> {
        self.hints.lock().unwrap().push(imposed);
        self.inner.evaluate(fluid, pair, v1, v2, imposed)
    }

    fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
        self.inner.critical_point(fluid)
    }

    fn saturation(&self, fluid: &Fluid, p: f64) -> FluidResult<Option<Saturation>> {
        self.inner.saturation(fluid, p)
    }

    fn fork(&self) -> Arc<dyn PropertyBackend> {
        Arc::new(PhaseLog::new())
    }
}

#[test]
fn vapour_cells_flash_with_the_gas_phase_imposed() {
    let log = Arc::new(PhaseLog::new());
    let adapter = PropertyAdapter::new(log.clone());
    let (cold, hot) = streams(&adapter);
    log.hints.lock().unwrap().clear();

    let mut dx = exchanger(CellPolicy::Uniform(4));
    dx.solve(&adapter, &Config::default(), &cold, &hot, Design::HeatDuty(2.0e4))
        .unwrap();

    let hints = log.hints.lock().unwrap();
    let pinned = hints.iter().filter(|h| **h == FluidPhase::Gas).count();
    assert!(pinned > 0, "no call carried the vapour regime's phase");
    assert!(
        hints
            .iter()
            .all(|h| matches!(h, FluidPhase::Gas | FluidPhase::NotImposed))
    );
}

proptest! {
    #[test]
    fn mixer_then_splitter_conserves_mass(
        m1 in 0.01f64..10.0,
        m2 in 0.01f64..10.0,
        t1 in 250.0f64..800.0,
        t2 in 250.0f64..800.0,
        f in 0.0f64..1.0,
    ) {
        let adapter = adapter();
        let a = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(m1), pa(2e5), k(t1)).unwrap();
        let b = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(m2), pa(1e5), k(t2)).unwrap();
        let mixed = Junction::mixer(2).unwrap().solve(&adapter, &[a.clone(), b.clone()]).unwrap();
        prop_assert!((mixed[0].m() - (m1 + m2)).abs() <= TOLABS_X * (m1 + m2));
        let energy_in = a.enthalpy_flow() + b.enthalpy_flow();
        prop_assert!((mixed[0].enthalpy_flow() - energy_in).abs() <= 1e-9 * energy_in.abs().max(1.0));

        let split = Junction::splitter(vec![f, 0.0]).unwrap().solve(&adapter, &mixed).unwrap();
        let total: f64 = split.iter().map(FlowState::m).sum();
        prop_assert!((total - mixed[0].m()).abs() <= TOLABS_X * mixed[0].m());
        prop_assert!(split.iter().all(|s| s.m() >= 0.0));
    }
}
