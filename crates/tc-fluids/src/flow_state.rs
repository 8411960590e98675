//! Flow states: the stream carried on every cycle edge.

use tc_core::units::{MassRate, Pressure, Temperature, k, kgps, pa};
use tc_core::FluidPhase;

use crate::adapter::PropertyAdapter;
use crate::error::{FluidError, FluidResult};
use crate::fluid::Fluid;
use crate::input_pair::InputPair;
use crate::properties::Properties;

/// A fluid stream: identity, mass flow, the input pair that fixes its state,
/// and the properties evaluated from that pair.
///
/// The properties always correspond to the stored pair and values; the only
/// way to change the thermodynamic state is [`FlowState::update`], which
/// re-evaluates through the adapter and leaves `self` untouched on failure.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowState {
    fluid: Fluid,
    m: f64,
    pair: InputPair,
    v1: f64,
    v2: f64,
    props: Properties,
}

fn check_mass_flow(m: f64) -> FluidResult<f64> {
    if m.is_finite() && m >= 0.0 {
        Ok(m)
    } else {
        Err(FluidError::InvalidInput {
            what: "mass flow must be finite and non-negative",
        })
    }
}

impl FlowState {
    pub fn new(
        adapter: &PropertyAdapter,
        fluid: Fluid,
        m: MassRate,
        pair: InputPair,
        v1: f64,
        v2: f64,
    ) -> FluidResult<Self> {
        let m = check_mass_flow(m.value)?;
        let props = adapter.evaluate(&fluid, pair, v1, v2)?;
        Ok(Self {
            fluid,
            m,
            pair,
            v1,
            v2,
            props,
        })
    }

    pub fn from_pt(
        adapter: &PropertyAdapter,
        fluid: Fluid,
        m: MassRate,
        p: Pressure,
        t: Temperature,
    ) -> FluidResult<Self> {
        Self::new(adapter, fluid, m, InputPair::PT, p.value, t.value)
    }

    /// Pressure and specific enthalpy [J/kg].
    pub fn from_ph(
        adapter: &PropertyAdapter,
        fluid: Fluid,
        m: MassRate,
        p: Pressure,
        h: f64,
    ) -> FluidResult<Self> {
        Self::new(adapter, fluid, m, InputPair::HmassP, h, p.value)
    }

    pub fn from_pq(
        adapter: &PropertyAdapter,
        fluid: Fluid,
        m: MassRate,
        p: Pressure,
        q: f64,
    ) -> FluidResult<Self> {
        Self::new(adapter, fluid, m, InputPair::PQ, p.value, q)
    }

    pub fn from_tq(
        adapter: &PropertyAdapter,
        fluid: Fluid,
        m: MassRate,
        t: Temperature,
        q: f64,
    ) -> FluidResult<Self> {
        Self::new(adapter, fluid, m, InputPair::QT, q, t.value)
    }

    /// Wrap properties that were already evaluated from `pair`, `v1`, `v2`.
    pub fn evaluated(
        fluid: Fluid,
        m: MassRate,
        pair: InputPair,
        v1: f64,
        v2: f64,
        props: Properties,
    ) -> FluidResult<Self> {
        let m = check_mass_flow(m.value)?;
        Ok(Self {
            fluid,
            m,
            pair,
            v1,
            v2,
            props,
        })
    }

    /// Re-fix the state in place from a new pair.
    pub fn update(
        &mut self,
        adapter: &PropertyAdapter,
        pair: InputPair,
        v1: f64,
        v2: f64,
    ) -> FluidResult<()> {
        self.update_with_phase(adapter, pair, v1, v2, FluidPhase::NotImposed)
    }

    /// [`update`](Self::update) with a phase imposed on the evaluation.
    pub fn update_with_phase(
        &mut self,
        adapter: &PropertyAdapter,
        pair: InputPair,
        v1: f64,
        v2: f64,
        imposed: FluidPhase,
    ) -> FluidResult<()> {
        let props = adapter.evaluate_with_phase(&self.fluid, pair, v1, v2, imposed)?;
        self.pair = pair;
        self.v1 = v1;
        self.v2 = v2;
        self.props = props;
        Ok(())
    }

    /// Re-fix the state from pressure [Pa] and enthalpy [J/kg].
    pub fn update_ph(&mut self, adapter: &PropertyAdapter, p: f64, h: f64) -> FluidResult<()> {
        self.update(adapter, InputPair::HmassP, h, p)
    }

    pub fn set_mass_flow(&mut self, m: MassRate) -> FluidResult<()> {
        self.m = check_mass_flow(m.value)?;
        Ok(())
    }

    /// Copy with a different mass flow and the same thermodynamic state.
    pub fn with_mass_flow(&self, m: MassRate) -> FluidResult<Self> {
        let mut copy = self.clone();
        copy.set_mass_flow(m)?;
        Ok(copy)
    }

    /// Copy fixed by pressure [Pa] and enthalpy [J/kg], same fluid and flow.
    pub fn at_ph(&self, adapter: &PropertyAdapter, p: f64, h: f64) -> FluidResult<Self> {
        self.at_ph_in(adapter, p, h, FluidPhase::NotImposed)
    }

    /// [`at_ph`](Self::at_ph) with `phase` imposed.
    pub fn at_ph_in(&self, adapter: &PropertyAdapter, p: f64, h: f64, phase: FluidPhase) -> FluidResult<Self> {
        let mut copy = self.clone();
        copy.update_with_phase(adapter, InputPair::HmassP, h, p, phase)?;
        Ok(copy)
    }

    pub fn fluid(&self) -> &Fluid {
        &self.fluid
    }

    pub fn pair(&self) -> InputPair {
        self.pair
    }

    pub fn inputs(&self) -> (f64, f64) {
        (self.v1, self.v2)
    }

    pub fn mass_flow(&self) -> MassRate {
        kgps(self.m)
    }

    /// Mass flow [kg/s] as a plain number.
    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn p(&self) -> Pressure {
        pa(self.props.p)
    }

    pub fn t(&self) -> Temperature {
        k(self.props.t)
    }

    /// Specific enthalpy [J/kg]
    pub fn h(&self) -> f64 {
        self.props.h
    }

    /// Specific entropy [J/(kg K)]
    pub fn s(&self) -> f64 {
        self.props.s
    }

    /// Density [kg/m^3]
    pub fn d(&self) -> f64 {
        self.props.d
    }

    /// Specific internal energy [J/kg]
    pub fn u(&self) -> f64 {
        self.props.u
    }

    pub fn q(&self) -> Option<f64> {
        self.props.q
    }

    pub fn phase(&self) -> FluidPhase {
        self.props.phase
    }

    pub fn properties(&self) -> &Properties {
        &self.props
    }

    /// Enthalpy flow `m h` [W]
    pub fn enthalpy_flow(&self) -> f64 {
        self.m * self.props.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perfect_gas::PerfectGasBackend;
    use approx::assert_relative_eq;

    fn adapter() -> PropertyAdapter {
        PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases())
    }

    #[test]
    fn construct_and_read() {
        let adapter = adapter();
        let state =
            FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(2.0), pa(2.0e5), k(400.0)).unwrap();
        assert_relative_eq!(state.t().value, 400.0);
        assert_relative_eq!(state.p().value, 2.0e5);
        assert_relative_eq!(state.enthalpy_flow(), 2.0 * state.h());
        assert_eq!(state.pair(), InputPair::PT);
        assert_eq!(state.inputs(), (2.0e5, 400.0));
    }

    #[test]
    fn negative_or_nan_mass_flow_rejected() {
        let adapter = adapter();
        let air = Fluid::new("Air");
        assert!(FlowState::from_pt(&adapter, air.clone(), kgps(-1.0), pa(1.0e5), k(300.0)).is_err());
        assert!(FlowState::from_pt(&adapter, air, kgps(f64::NAN), pa(1.0e5), k(300.0)).is_err());
    }

    #[test]
    fn update_in_place_and_failure_leaves_state() {
        let adapter = adapter();
        let mut state =
            FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(1.0), pa(1.0e5), k(300.0)).unwrap();
        let h = state.h() + 1005.0 * 50.0;
        state.update_ph(&adapter, 1.0e5, h).unwrap();
        assert_relative_eq!(state.t().value, 350.0, max_relative = 1e-12);

        let before = state.clone();
        assert!(state.update(&adapter, InputPair::PT, -5.0, 300.0).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn mass_flow_changes_keep_state() {
        let adapter = adapter();
        let state =
            FlowState::from_pt(&adapter, Fluid::new("He"), kgps(1.0), pa(1.0e5), k(300.0)).unwrap();
        let doubled = state.with_mass_flow(kgps(2.0)).unwrap();
        assert_relative_eq!(doubled.m(), 2.0);
        assert_eq!(doubled.properties(), state.properties());
    }

    #[test]
    fn pinned_phase_is_checked_on_update() {
        let adapter = adapter();
        let state =
            FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(1.0), pa(1.0e5), k(300.0)).unwrap();
        let warmer = state.at_ph_in(&adapter, 1.0e5, state.h() + 1.0e4, FluidPhase::Gas).unwrap();
        assert!(warmer.t().value > 300.0);
        assert!(matches!(
            state.at_ph_in(&adapter, 1.0e5, state.h(), FluidPhase::Liquid),
            Err(FluidError::OutOfRange { .. })
        ));
    }
}
