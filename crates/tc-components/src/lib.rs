//! tc-components: component library for steady-state thermodynamic cycles.
//!
//! Provides:
//! - Heat-transfer and friction correlations keyed by flow regime
//! - The unit cell, the smallest solved piece of a heat exchanger or pipe
//! - A moving-boundary discretizer for two-stream exchangers and pipes
//! - Components: compressors, expanders, pipes, junctions, exchangers and
//!   basic heaters, driven through one [`Component`] contract
//!
//! # Example
//!
//! ```no_run
//! use tc_components::{Component, ComponentContext, Machine, MachineTarget};
//! use tc_core::Config;
//! use tc_core::units::{bar, k, kgps};
//! use tc_fluids::{FlowState, Fluid, PropertyAdapter};
//!
//! let adapter = PropertyAdapter::coolprop();
//! let config = Config::default();
//! let inlet = FlowState::from_pt(&adapter, Fluid::new("R134a"), kgps(0.1), bar(5.0), k(280.0)).unwrap();
//!
//! let mut comp = Component::machine(
//!     "compressor",
//!     Machine::compressor(0.8, MachineTarget::OutletPressure(bar(15.0))).unwrap(),
//! );
//! let ctx = ComponentContext { adapter: &adapter, config: &config };
//! let outlet = comp.solve(ctx, &[inlet]).unwrap();
//! println!("T_out = {} K, W = {} W", outlet[0].t().value, comp.introspect().unwrap().work);
//! ```

pub mod common;
pub mod component;
pub mod correlations;
pub mod discretizer;
pub mod error;
pub mod geometry;
pub mod heat_exchanger;
pub mod heater;
pub mod junction;
pub mod machine;
pub mod pipe;
pub mod unit_cell;
pub mod warning;

// Re-exports
pub use component::{
    Component, ComponentContext, ComponentKind, Introspection, Model, SecondaryIntrospection,
};
pub use correlations::{FrictionMethod, HeatMethod, MethodTable, Methods};
pub use discretizer::{
    CellPolicy, Design, Discretizer, ExchangerSolution, HeatLoss, Region, SingleStreamSolution,
    Status,
};
pub use error::{ComponentError, ComponentResult};
pub use geometry::{Channel, ChannelKind, Wall};
pub use heat_exchanger::HeatExchanger;
pub use heater::{Heater, HeaterSolution, HeaterTarget};
pub use junction::Junction;
pub use machine::{Machine, MachineKind, MachineTarget};
pub use pipe::Pipe;
pub use unit_cell::{CellSolution, CellStream, Closure, Counterpart, SideSolution, UnitCell};
pub use warning::Warning;
