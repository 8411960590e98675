//! CoolProp integration tests.
//!
//! Broad tolerances keep these independent of the backend version; the checks
//! enforce physical plausibility and exact input recovery.

use tc_core::units::{k, kgps, pa};
use tc_core::FluidPhase;
use tc_fluids::{FlowState, Fluid, FluidError, InputPair, PropertyAdapter, Property};

#[test]
fn water_at_1atm_300k() {
    let adapter = PropertyAdapter::coolprop();
    let props = adapter
        .evaluate(&Fluid::new("H2O"), InputPair::PT, 101_325.0, 300.0)
        .unwrap();

    // Water density at this condition should be around 996 kg/m³
    assert!(props.d > 900.0 && props.d < 1100.0, "rho = {} kg/m³", props.d);
    assert_eq!(props.phase, FluidPhase::Liquid);
    assert_eq!(props.q, None);
    assert!(props.cp.is_some() && props.viscosity.is_some());
}

#[test]
fn nitrogen_gas_density_trend() {
    let adapter = PropertyAdapter::coolprop();
    let n2 = Fluid::new("N2");
    let rho = |p: f64| adapter.evaluate(&n2, InputPair::PT, p, 300.0).unwrap().d;

    let (rho1, rho2, rho3) = (rho(1.0e5), rho(2.0e5), rho(5.0e5));
    assert!(rho1 < rho2 && rho2 < rho3, "rho should increase with pressure");

    // Nearly ideal, so doubling pressure roughly doubles density
    let ratio = rho2 / rho1;
    assert!(ratio > 1.8 && ratio < 2.2, "density ratio = {}", ratio);
}

#[test]
fn pairs_recover_their_inputs() {
    let adapter = PropertyAdapter::coolprop();
    let co2 = Fluid::new("CO2");
    let reference = adapter.evaluate(&co2, InputPair::PT, 8.0e6, 423.15).unwrap();

    for pair in [
        InputPair::PT,
        InputPair::HmassP,
        InputPair::PSmass,
        InputPair::DmassT,
        InputPair::HmassSmass,
        InputPair::DmolarP,
    ] {
        let (a, b) = pair.properties();
        let v1 = reference.value(a).unwrap();
        let v2 = reference.value(b).unwrap();
        let props = adapter.evaluate(&co2, pair, v1, v2).unwrap();
        for (property, expected) in [(a, v1), (b, v2)] {
            let got = props.value(property).unwrap();
            let rel = (got - expected).abs() / expected.abs().max(1.0);
            assert!(rel < 1e-6, "{pair}: {property:?} {got} vs {expected}");
        }
        assert!((props.t - 423.15).abs() < 1e-3, "{pair}: T = {}", props.t);
    }
}

#[test]
fn imposed_phase_inside_dome_is_out_of_range() {
    let adapter = PropertyAdapter::coolprop();
    let water = Fluid::new("Water");
    let err = adapter
        .evaluate_with_phase(&water, InputPair::PQ, 1.0e5, 0.5, FluidPhase::Liquid)
        .unwrap_err();
    assert!(matches!(err, FluidError::OutOfRange { .. }), "{err}");

    let ok = adapter.evaluate_with_phase(&water, InputPair::PT, 1.0e5, 300.0, FluidPhase::Liquid);
    assert!(ok.is_ok());
}

#[test]
fn water_saturation_at_1atm() {
    let adapter = PropertyAdapter::coolprop();
    let water = Fluid::new("Water");
    let sat = adapter.saturation(&water, 101_325.0).unwrap().unwrap();

    assert!((sat.t_sat() - 373.12).abs() < 0.1, "Tsat = {}", sat.t_sat());
    assert!(
        sat.h_fg() > 2.2e6 && sat.h_fg() < 2.3e6,
        "h_fg = {} J/kg",
        sat.h_fg()
    );
    assert_eq!(sat.liquid.phase, FluidPhase::TwoPhase);
    let q_vap = sat.vapour.value(Property::Q).unwrap();
    assert!((q_vap - 1.0).abs() < 1e-9);

    // No dome above the critical pressure
    assert!(adapter.saturation(&water, 25.0e6).unwrap().is_none());
}

#[test]
fn supercritical_co2_is_tagged() {
    let adapter = PropertyAdapter::coolprop();
    let props = adapter
        .evaluate(&Fluid::new("CO2"), InputPair::PT, 8.0e6, 423.15)
        .unwrap();
    assert_eq!(props.phase, FluidPhase::Supercritical);
    let critical = adapter.critical_point(&Fluid::new("CO2")).unwrap();
    assert!((critical.t - 304.13).abs() < 0.1);
    assert!((critical.p - 7.377e6).abs() < 1.0e4);
}

#[test]
fn raw_codes_and_unknown_fluids() {
    let adapter = PropertyAdapter::coolprop();
    let r134a = Fluid::new("R134a");
    assert!(matches!(
        adapter.evaluate_code(&r134a, 0, 5.0e5, 280.0),
        Err(FluidError::InvalidInput { .. })
    ));
    // Saturation at 2 bar is near 263 K, so 280 K is superheated vapour
    let props = adapter.evaluate_code(&r134a, 9, 2.0e5, 280.0).unwrap();
    assert_eq!(props.phase, FluidPhase::Gas);

    assert!(
        adapter
            .evaluate(&Fluid::new("Unobtainium"), InputPair::PT, 1.0e5, 300.0)
            .is_err()
    );
}

#[test]
fn flow_state_two_phase_refrigerant() {
    let adapter = PropertyAdapter::coolprop();
    let state =
        FlowState::from_pq(&adapter, Fluid::new("R134a"), kgps(0.1), pa(4.146e5), 0.2).unwrap();
    assert!(state.phase().is_two_phase());
    assert!((state.q().unwrap() - 0.2).abs() < 1e-9);
    assert!((state.t().value - 283.15).abs() < 0.5, "T = {}", state.t().value);

    let superheated =
        FlowState::from_pt(&adapter, Fluid::new("R134a"), kgps(0.1), pa(4.146e5), k(290.0))
            .unwrap();
    assert!(superheated.h() > state.h());
}

#[test]
fn imposed_phase_pins_the_flash() {
    let adapter = PropertyAdapter::coolprop();
    let water = Fluid::new("Water");
    let liquid = adapter
        .evaluate_with_phase(&water, InputPair::PT, 1.0e5, 300.0, FluidPhase::Liquid)
        .unwrap();
    assert_eq!(liquid.phase, FluidPhase::Liquid);
    let free = adapter.evaluate(&water, InputPair::PT, 1.0e5, 300.0).unwrap();
    assert!((liquid.h - free.h).abs() < 1e-6 * free.h.abs());

    let pinned_steam = adapter
        .evaluate_with_phase(&water, InputPair::HmassP, free.h + 2.8e6, 1.0e5, FluidPhase::Gas)
        .unwrap();
    assert_eq!(pinned_steam.phase, FluidPhase::Gas);
    assert!(pinned_steam.t > 373.0);

    // The pin is released after each call
    let steam = adapter.evaluate(&water, InputPair::PT, 1.0e5, 500.0).unwrap();
    assert_eq!(steam.phase, FluidPhase::Gas);
}
