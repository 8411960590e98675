//! Canned cycles driven by the CLI.

use tc_components::{
    CellPolicy, Channel, Component, Design, HeatExchanger, Heater, HeaterTarget, Machine,
    MachineTarget,
};
use tc_core::units::{k, kgps, m, pa};
use tc_core::{Config, FlowSense, TransferMode};
use tc_cycle::{Cycle, CycleBuilder};
use tc_fluids::{FlowState, Fluid, InputPair, PropertyAdapter};

use crate::CliResult;

#[derive(Clone, Debug)]
pub struct RankineParams {
    pub fluid: String,
    pub mass_flow: f64,
    pub p_high: f64,
    pub p_low: f64,
    pub t_max: f64,
    pub eta_pump: f64,
    pub eta_turbine: f64,
}

/// Pump, boiler, turbine and condenser, torn at the pump inlet.
pub fn rankine(adapter: PropertyAdapter, config: Config, params: &RankineParams) -> CliResult<Cycle> {
    let fluid = Fluid::new(&params.fluid);
    let liquid = adapter.evaluate(&fluid, InputPair::PQ, params.p_low, 0.0)?;
    let seed = FlowState::from_ph(&adapter, fluid, kgps(params.mass_flow), pa(params.p_low), liquid.h)?;

    let mut b = CycleBuilder::new().with_config(config);
    let feed = b.add_edge("feed");
    let pumped = b.add_edge("pumped");
    let live = b.add_edge("live steam");
    let exhaust = b.add_edge("exhaust");
    b.add_component(
        Component::machine(
            "pump",
            Machine::compressor(params.eta_pump, MachineTarget::OutletPressure(pa(params.p_high)))?,
        ),
        &[feed],
        &[pumped],
    );
    b.add_component(
        Component::heater("boiler", Heater::new(HeaterTarget::OutletTemperature(k(params.t_max)))),
        &[pumped],
        &[live],
    );
    b.add_component(
        Component::machine(
            "turbine",
            Machine::expander(params.eta_turbine, MachineTarget::OutletPressure(pa(params.p_low)))?,
        ),
        &[live],
        &[exhaust],
    );
    b.add_component(
        Component::heater("condenser", Heater::new(HeaterTarget::OutletQuality(0.0))),
        &[exhaust],
        &[feed],
    );
    b.anchor(feed, seed);
    Ok(b.build(adapter)?)
}

#[derive(Clone, Debug)]
pub struct BraytonParams {
    pub fluid: String,
    pub mass_flow: f64,
    pub p_low: f64,
    pub pressure_ratio: f64,
    pub t_min: f64,
    pub t_max: f64,
    pub eta_compressor: f64,
    pub eta_turbine: f64,
    pub effectiveness: f64,
    pub cells: usize,
}

/// Recuperated Brayton loop.
///
/// The recuperator heats the compressor discharge with the turbine exhaust,
/// so the loop is torn twice: at the compressor inlet and at the turbine
/// outlet.
pub fn brayton(adapter: PropertyAdapter, config: Config, params: &BraytonParams) -> CliResult<Cycle> {
    let fluid = Fluid::new(&params.fluid);
    let flow = kgps(params.mass_flow);
    let p_high = params.p_low * params.pressure_ratio;
    let cold_seed = FlowState::from_pt(&adapter, fluid.clone(), flow, pa(params.p_low), k(params.t_min))?;
    let hot_seed = FlowState::from_pt(
        &adapter,
        fluid,
        flow,
        pa(params.p_low),
        k(0.5 * (params.t_min + params.t_max)),
    )?;

    let recuperator = HeatExchanger::new(
        Channel::tubes(m(0.01), 200)?,
        Channel::tubes(m(0.01), 200)?,
        FlowSense::Counterflow,
        Design::Effectiveness(params.effectiveness),
    )
    .with_mode(TransferMode::Heat)
    .with_policy(CellPolicy::Uniform(params.cells));

    let mut b = CycleBuilder::new().with_config(config);
    let inlet = b.add_edge("compressor inlet");
    let discharge = b.add_edge("discharge");
    let preheated = b.add_edge("preheated");
    let hot = b.add_edge("turbine inlet");
    let exhaust = b.add_edge("turbine exhaust");
    let cooled = b.add_edge("recuperated exhaust");
    b.add_component(
        Component::machine(
            "compressor",
            Machine::compressor(params.eta_compressor, MachineTarget::OutletPressure(pa(p_high)))?,
        ),
        &[inlet],
        &[discharge],
    );
    b.add_component(
        Component::heat_exchanger("recuperator", recuperator),
        &[discharge, exhaust],
        &[preheated, cooled],
    );
    b.add_component(
        Component::heater("heater", Heater::new(HeaterTarget::OutletTemperature(k(params.t_max)))),
        &[preheated],
        &[hot],
    );
    b.add_component(
        Component::machine(
            "turbine",
            Machine::expander(params.eta_turbine, MachineTarget::OutletPressure(pa(params.p_low)))?,
        ),
        &[hot],
        &[exhaust],
    );
    b.add_component(
        Component::heater("precooler", Heater::new(HeaterTarget::OutletTemperature(k(params.t_min)))),
        &[cooled],
        &[inlet],
    );
    b.anchor(inlet, cold_seed);
    b.anchor(exhaust, hot_seed);
    Ok(b.build(adapter)?)
}
