//! tc-fluids: fluid identity, property evaluation and flow states.
//!
//! Provides:
//! - `Fluid` names with alias resolution (`CO2` -> `CarbonDioxide`)
//! - The input-pair codebook (`InputPair`) and evaluated `Properties`
//! - The `PropertyBackend` trait with a CoolProp backend and a perfect-gas backend
//! - `PropertyAdapter`, the single entry point the rest of the workspace calls
//! - `FlowState`, the stream state carried on every cycle edge
//!
//! # Example
//!
//! ```no_run
//! use tc_core::units::{k, kgps, pa};
//! use tc_fluids::{FlowState, Fluid, PropertyAdapter};
//!
//! let adapter = PropertyAdapter::coolprop();
//! let water: Fluid = "H2O".parse().unwrap();
//! let state = FlowState::from_pt(&adapter, water, kgps(0.5), pa(2.0e5), k(353.15)).unwrap();
//! println!("h = {} J/kg", state.h());
//! ```

pub mod adapter;
pub mod backend;
pub mod coolprop;
pub mod error;
pub mod flow_state;
pub mod fluid;
pub mod input_pair;
pub mod perfect_gas;
pub mod properties;

pub use adapter::PropertyAdapter;
pub use backend::PropertyBackend;
pub use coolprop::CoolPropBackend;
pub use error::{FluidError, FluidResult};
pub use flow_state::FlowState;
pub use fluid::Fluid;
pub use input_pair::{INPUT_PAIR_INVALID, InputPair, Property};
pub use perfect_gas::{PerfectGas, PerfectGasBackend};
pub use properties::{CriticalPoint, Properties, Saturation};
