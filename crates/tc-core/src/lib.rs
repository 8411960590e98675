//! tc-core: shared foundation for thermocycle.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact edge/component identifiers)
//! - error (shared error types and the error-kind taxonomy)
//! - tags (phase, regime, transfer and flow tag tables)
//! - config (solver and discretization tunables)
//! - solve (damped Newton, finite-difference Jacobian, scalar root finders)

pub mod config;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod solve;
pub mod tags;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use config::{Accelerator, Config};
pub use error::{ErrorKind, TcError, TcResult};
pub use ids::*;
pub use numeric::*;
pub use tags::{FlowSelection, FlowSense, FluidPhase, FluidRole, TransferMode, UnitPhase};
pub use units::*;
