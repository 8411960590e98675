//! Error types for component operations.

use tc_core::{ErrorKind, TcError};
use tc_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Fluid property error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Convergence failed: {what} after {iterations} iterations (residual {residual:.3e})")]
    NotConverged {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },

    /// The driving temperature difference changes sign inside one cell.
    #[error("Driving temperature difference changes sign across cell ({dt_a:.4} K -> {dt_b:.4} K)")]
    DrivingDeltaTSignChange { dt_a: f64, dt_b: f64 },

    /// The temperature profiles cross or approach closer than the pinch floor.
    #[error(
        "Infeasible geometry: cell {cell} at duty {location:.6e} W has driving dT {min_delta_t:.4} K"
    )]
    InfeasibleGeometry {
        cell: usize,
        location: f64,
        min_delta_t: f64,
    },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComponentError::NonPhysical { .. }
            | ComponentError::NotSupported { .. }
            | ComponentError::InvalidArg { .. } => ErrorKind::InvalidInput,
            ComponentError::Fluid(e) => e.kind(),
            ComponentError::NotConverged { .. } | ComponentError::DrivingDeltaTSignChange { .. } => {
                ErrorKind::NotConverged
            }
            ComponentError::InfeasibleGeometry { .. } => ErrorKind::InfeasibleGeometry,
        }
    }

    /// Failures that a finer discretization may cure.
    pub fn is_refinable(&self) -> bool {
        matches!(
            self,
            ComponentError::NotConverged { .. } | ComponentError::DrivingDeltaTSignChange { .. }
        )
    }
}

impl From<TcError> for ComponentError {
    fn from(e: TcError) -> Self {
        match e {
            TcError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            TcError::InvalidArg { what } | TcError::IndexOob { what, .. } => {
                ComponentError::InvalidArg { what }
            }
            TcError::Singular { what } | TcError::NotBracketed { what } => {
                ComponentError::NotConverged {
                    what,
                    iterations: 0,
                    residual: f64::NAN,
                }
            }
            TcError::NotConverged {
                what,
                iterations,
                residual,
            } => ComponentError::NotConverged {
                what,
                iterations,
                residual,
            },
        }
    }
}
