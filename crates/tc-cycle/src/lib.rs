//! Steady-state cycle assembly and solving.
//!
//! A cycle is a list of components wired by edges (flow-state slots). The
//! solver tears closed loops at anchors, traverses the components in
//! assembly order from the anchor seeds, and drives the seeds to a fixed
//! point with a warm-up accelerator followed by Broyden's method.

pub mod accel;
pub mod builder;
pub mod cycle;
pub mod error;
pub mod parallel;
pub mod report;

pub use builder::CycleBuilder;
pub use cycle::{CancelToken, Cycle};
pub use error::{CycleError, CycleResult};
pub use parallel::solve_parallel;
pub use report::{ComponentReport, CycleReport, EnergyBalance};
