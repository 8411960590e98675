//! Real-fluid component scenarios on the CoolProp backend.

use approx::assert_relative_eq;
use tc_components::{
    CellPolicy, Channel, Component, ComponentContext, ComponentError, Design, Discretizer,
    HeatExchanger, Heater, HeaterTarget, Machine, MachineTarget,
};
use tc_core::units::{bar, degc, k, kgps, m, pa};
use tc_core::{Config, FlowSense, FluidRole, TOLABS_X, TransferMode};
use tc_fluids::{FlowState, Fluid, InputPair, PropertyAdapter};

#[test]
fn isentropic_r134a_compression() {
    let adapter = PropertyAdapter::coolprop();
    let config = Config::default();
    let inlet = FlowState::from_pt(&adapter, Fluid::new("R134a"), kgps(0.1), bar(5.0), k(280.0)).unwrap();
    let mut comp = Component::machine(
        "compressor",
        Machine::compressor(1.0, MachineTarget::OutletPressure(bar(15.0))).unwrap(),
    );
    let ctx = ComponentContext {
        adapter: &adapter,
        config: &config,
    };
    let out = comp.solve(ctx, std::slice::from_ref(&inlet)).unwrap();

    let isentropic = adapter
        .evaluate(inlet.fluid(), InputPair::PSmass, 15e5, inlet.s())
        .unwrap();
    assert!((out[0].t().value - isentropic.t).abs() <= TOLABS_X);
    assert!((out[0].h() - isentropic.h).abs() <= TOLABS_X);
    assert!(comp.introspect().unwrap().work > 0.0);
}

fn evaporator(m_refrigerant: f64) -> (PropertyAdapter, FlowState, FlowState, HeatExchanger) {
    let adapter = PropertyAdapter::coolprop();
    let refrigerant =
        FlowState::from_tq(&adapter, Fluid::new("R134a"), kgps(m_refrigerant), degc(10.0), 0.2).unwrap();
    let water = FlowState::from_pt(&adapter, Fluid::new("Water"), kgps(0.5), bar(2.0), degc(80.0)).unwrap();
    let hx = HeatExchanger::new(
        Channel::tubes(m(0.01), 10).unwrap(),
        Channel::tubes(m(0.02), 10).unwrap(),
        FlowSense::Counterflow,
        Design::OutletQuality {
            role: FluidRole::Primary,
            x: 1.0,
        },
    )
    .with_mode(TransferMode::Heat);
    (adapter, refrigerant, water, hx)
}

#[test]
fn counterflow_evaporator_reaches_saturated_vapour() {
    let (adapter, refrigerant, water, mut hx) = evaporator(0.1);
    let sol = hx.solve(&adapter, &Config::default(), &refrigerant, &water).unwrap();

    let h_g = adapter
        .evaluate(refrigerant.fluid(), InputPair::PQ, refrigerant.p().value, 1.0)
        .unwrap()
        .h;
    assert_relative_eq!(sol.primary_outlet.h(), h_g, max_relative = 1e-9);

    let into_refrigerant = refrigerant.m() * (sol.primary_outlet.h() - refrigerant.h());
    let from_water = water.m() * (water.h() - sol.secondary_outlet.h());
    assert_relative_eq!(into_refrigerant, from_water, max_relative = 1e-6);
    assert_relative_eq!(sol.q, into_refrigerant, max_relative = 1e-6);

    assert!(sol.pinch > 0.0);
    for cell in &sol.cells {
        let (a, b) = cell.dt_ends.unwrap();
        assert!(a > 0.0 && b > 0.0, "water must stay hotter: {a} K, {b} K");
    }
}

#[test]
fn overloaded_evaporator_is_infeasible() {
    let (adapter, refrigerant, water, mut hx) = evaporator(1.0);
    let err = hx.solve(&adapter, &Config::default(), &refrigerant, &water).unwrap_err();
    match err {
        ComponentError::InfeasibleGeometry {
            cell, min_delta_t, ..
        } => {
            assert_eq!(cell, 0);
            assert!(min_delta_t < 0.0);
        }
        other => panic!("expected infeasible geometry, got {other}"),
    }
}

#[test]
fn sco2_recuperator_meets_effectiveness() {
    let adapter = PropertyAdapter::coolprop();
    let co2 = Fluid::new("CO2");
    let cold = FlowState::from_pt(&adapter, co2.clone(), kgps(1.0), bar(80.0), degc(40.0)).unwrap();
    let hot = FlowState::from_pt(&adapter, co2.clone(), kgps(1.0), bar(80.0), degc(150.0)).unwrap();
    let mut hx = HeatExchanger::new(
        Channel::tubes(m(0.005), 200).unwrap(),
        Channel::tubes(m(0.005), 200).unwrap(),
        FlowSense::Counterflow,
        Design::Effectiveness(0.85),
    );
    let sol = hx.solve(&adapter, &Config::default(), &cold, &hot).unwrap();

    let h = |p: f64, t: f64| adapter.evaluate(&co2, InputPair::PT, p, t).unwrap().h;
    let by_cold = cold.m() * (h(cold.p().value, hot.t().value) - cold.h());
    let by_hot = hot.m() * (hot.h() - h(hot.p().value, cold.t().value));
    let q_max = by_cold.min(by_hot);

    assert_relative_eq!(sol.q, 0.85 * q_max, max_relative = 1e-6);
    let into_cold = cold.m() * (sol.primary_outlet.h() - cold.h());
    let from_hot = hot.m() * (hot.h() - sol.secondary_outlet.h());
    assert_relative_eq!(into_cold, from_hot, max_relative = 1e-6);
    assert!(sol.pinch > 0.0);
}

#[test]
fn cell_refinement_converges_with_varying_properties() {
    // Liquid water viscosity halves between 300 K and 340 K, so the film
    // coefficients change along the exchanger and coarse cells are inexact
    let adapter = PropertyAdapter::coolprop();
    let water = Fluid::new("Water");
    let cold = FlowState::from_pt(&adapter, water.clone(), kgps(0.3), bar(2.0), k(300.0)).unwrap();
    let hot = FlowState::from_pt(&adapter, water, kgps(0.3), bar(3.0), k(370.0)).unwrap();
    let config = Config {
        cells_per_region: 1,
        ..Config::default()
    };
    let length = |n: usize| {
        let mut dx = Discretizer::new(
            Channel::tubes(m(0.01), 10).unwrap(),
            Channel::tubes(m(0.02), 10).unwrap(),
            FlowSense::Counterflow,
        )
        .with_mode(TransferMode::Heat)
        .with_policy(CellPolicy::Uniform(n));
        let sol = dx.solve(&adapter, &config, &cold, &hot, Design::HeatDuty(4.0e4)).unwrap();
        assert_eq!(sol.cells.len(), n);
        sol.length
    };

    let reference = length(128);
    let errors: Vec<f64> = [2, 4, 8]
        .into_iter()
        .map(|n| (length(n) - reference).abs() / reference)
        .collect();
    assert!(errors[0] > 1e-6, "coarse error {:e} too small to measure", errors[0]);
    // At least first order: each halving of the cell size halves the error
    for pair in errors.windows(2) {
        assert!(pair[1] < 0.6 * pair[0], "errors {errors:?}");
    }
}

#[test]
fn helium_cooler_duty_and_mass_flow_sizing() {
    let adapter = PropertyAdapter::coolprop();
    let he = Fluid::new("Helium");
    let inlet = FlowState::from_pt(&adapter, he.clone(), kgps(1.0), pa(6.7e6), k(1190.0)).unwrap();
    let outlet = FlowState::from_pt(&adapter, he.clone(), kgps(1.0), pa(6.7e6), k(424.0)).unwrap();

    let cooler = Heater::new(HeaterTarget::OutletTemperature(k(424.0)));
    let sol = cooler.solve(&adapter, &inlet).unwrap();
    assert!((sol.q / 1e6 + 3.975).abs() < 5e-4, "Q = {} MW", sol.q / 1e6);

    let q = cooler.size_duty(&inlet, &outlet).unwrap();
    assert_relative_eq!(q, sol.q, max_relative = 1e-9);
    let m = cooler.size_mass_flow(&inlet, &outlet, -3.975e6).unwrap();
    assert!((m - 1.0).abs() < 1e-3, "m = {m} kg/s");

    let raised = FlowState::from_pt(&adapter, he, kgps(1.0), pa(6.8e6), k(1190.0)).unwrap();
    assert!(matches!(
        cooler.size_duty(&raised, &outlet),
        Err(ComponentError::InvalidArg { .. })
    ));
}
