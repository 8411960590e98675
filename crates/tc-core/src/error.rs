use thiserror::Error;

pub type TcResult<T> = Result<T, TcError>;

/// Coarse classification shared by every error type in the workspace.
///
/// Callers that only need to branch on the failure family (retry, report,
/// abort) match on this instead of on the crate-specific enums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized input pair, inconsistent flow state, bad wiring or parameters.
    InvalidInput,
    /// The property backend reported a domain failure or failed to converge.
    Backend,
    /// An inner, outer or cycle-level iteration was exhausted.
    NotConverged,
    /// Pinch crossover, negative cell length or non-physical pressure drop.
    InfeasibleGeometry,
    /// The run was cancelled between outer iterations.
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TcError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Singular system: {what}")]
    Singular { what: &'static str },

    #[error("Not converged: {what} after {iterations} iterations (residual {residual:.3e})")]
    NotConverged {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Root not bracketed: {what}")]
    NotBracketed { what: &'static str },
}

impl TcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TcError::NonFinite { .. } | TcError::InvalidArg { .. } | TcError::IndexOob { .. } => {
                ErrorKind::InvalidInput
            }
            TcError::Singular { .. }
            | TcError::NotConverged { .. }
            | TcError::NotBracketed { .. } => ErrorKind::NotConverged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = TcError::NotConverged {
            what: "unit cell",
            iterations: 12,
            residual: 3.5e-4,
        };
        let msg = err.to_string();
        assert!(msg.contains("unit cell"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn kinds() {
        assert_eq!(
            TcError::InvalidArg { what: "x" }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            TcError::Singular { what: "jacobian" }.kind(),
            ErrorKind::NotConverged
        );
    }
}
