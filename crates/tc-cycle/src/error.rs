//! Error types for cycle assembly and solving.

use tc_components::ComponentError;
use tc_core::{ErrorKind, TcError};
use tc_fluids::FluidError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error("Invalid wiring: {what}")]
    Wiring { what: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] TcError),

    #[error("Component '{component}' failed at iteration {iteration}: {source}")]
    Component {
        component: String,
        iteration: usize,
        #[source]
        source: ComponentError,
    },

    #[error("Seed update failed at iteration {iteration}: {source}")]
    Seed {
        iteration: usize,
        #[source]
        source: FluidError,
    },

    #[error("Cycle not converged after {iterations} iterations (residual {residual:.3e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("Cancelled at iteration {iteration}")]
    Cancelled { iteration: usize },
}

pub type CycleResult<T> = Result<T, CycleError>;

impl CycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CycleError::Wiring { .. } => ErrorKind::InvalidInput,
            CycleError::Config(e) => e.kind(),
            CycleError::Component { source, .. } => source.kind(),
            CycleError::Seed { source, .. } => source.kind(),
            CycleError::NotConverged { .. } => ErrorKind::NotConverged,
            CycleError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Name of the failing component, if a component failed.
    pub fn component(&self) -> Option<&str> {
        match self {
            CycleError::Component { component, .. } => Some(component),
            _ => None,
        }
    }

    pub(crate) fn wiring(what: impl Into<String>) -> Self {
        CycleError::Wiring { what: what.into() }
    }
}
