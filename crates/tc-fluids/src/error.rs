//! Fluid property errors.

use tc_core::{ErrorKind, TcError};
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Unsupported input pair, non-finite input, or a malformed flow state.
    #[error("Invalid input: {what}")]
    InvalidInput { what: &'static str },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// The backend reported a domain failure, or an imposed phase was violated.
    #[error("Out of range: {context}")]
    OutOfRange { context: String },

    /// The backend's internal iteration failed.
    #[error("Not converged: {context}")]
    NotConverged { context: String },

    /// Backend (CoolProp) error that fits no other class.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl FluidError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FluidError::InvalidInput { .. } | FluidError::NonPhysical { .. } => {
                ErrorKind::InvalidInput
            }
            FluidError::OutOfRange { .. }
            | FluidError::NotConverged { .. }
            | FluidError::Backend { .. } => ErrorKind::Backend,
        }
    }
}

impl From<TcError> for FluidError {
    fn from(err: TcError) -> Self {
        match err {
            TcError::NonFinite { what, .. } | TcError::InvalidArg { what } => {
                FluidError::InvalidInput { what }
            }
            other => FluidError::NotConverged {
                context: other.to_string(),
            },
        }
    }
}

/// Classify a backend error message.
///
/// CoolProp surfaces failures as free text, so classification is a
/// best-effort substring match. Unmatched messages stay `Backend`.
pub(crate) fn classify_backend_message(message: &str) -> FluidError {
    const OUT_OF_RANGE_MARKERS: &[&str] = &[
        "not in range",
        "out of range",
        "outside the range of validity",
        "must be in range",
        "must be between",
        "quality must be",
        "not defined",
        "below the minimum",
        "above the maximum",
    ];
    const NOT_CONVERGED_MARKERS: &[&str] = &[
        "did not converge",
        "not converge",
        "failed to converge",
        "maximum number of iterations",
        "no root",
    ];
    const INVALID_MARKERS: &[&str] = &[
        "not a valid number",
        "invalid number",
        "unable to match",
        "not a valid",
    ];

    let lowered = message.to_lowercase();
    let context = message.to_string();
    if contains_any(&lowered, NOT_CONVERGED_MARKERS) {
        FluidError::NotConverged { context }
    } else if contains_any(&lowered, OUT_OF_RANGE_MARKERS) {
        FluidError::OutOfRange { context }
    } else if contains_any(&lowered, INVALID_MARKERS) {
        FluidError::OutOfRange { context }
    } else {
        FluidError::Backend { message: context }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn kinds() {
        assert_eq!(
            FluidError::InvalidInput { what: "pair" }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            FluidError::OutOfRange {
                context: "T".into()
            }
            .kind(),
            ErrorKind::Backend
        );
    }

    #[test]
    fn classify_messages() {
        assert!(matches!(
            classify_backend_message("Input temperature is out of range"),
            FluidError::OutOfRange { .. }
        ));
        assert!(matches!(
            classify_backend_message("HSU_P_flash did not converge"),
            FluidError::NotConverged { .. }
        ));
        assert!(matches!(
            classify_backend_message("something unexpected"),
            FluidError::Backend { .. }
        ));
    }

    #[test]
    fn from_core_error() {
        let err: FluidError = TcError::InvalidArg { what: "x" }.into();
        assert!(matches!(err, FluidError::InvalidInput { what: "x" }));
    }
}
