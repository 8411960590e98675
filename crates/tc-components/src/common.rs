//! Small helpers shared by the component models.

use tc_core::numeric::{Tolerances, ensure_finite, nearly_equal};

use crate::error::{ComponentError, ComponentResult};

/// Mass flows below this are treated as no flow [kg/s]
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning `NonPhysical` if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    match check_finite(value, what)? {
        v if v > 0.0 => Ok(v),
        _ => Err(ComponentError::InvalidArg { what }),
    }
}

/// Whether two pressures agree within the relative tolerance.
pub fn same_pressure(a: f64, b: f64, tol_rel: f64) -> bool {
    nearly_equal(a, b, Tolerances { abs: tol_rel, rel: tol_rel })
}
