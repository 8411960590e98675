use crate::TcError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute floor used for residual comparisons when a scale vanishes.
pub const TOLABS_X: Real = 1e-10;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-7,
            rel: 1e-7,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TcError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TcError::NonFinite { what, value: v })
    }
}

/// Normalization scale for a residual component.
///
/// Magnitudes below [`TOLABS_X`] fall back to an absolute comparison.
pub fn residual_scale(reference: Real) -> Real {
    if reference.abs() > TOLABS_X {
        reference.abs()
    } else {
        1.0
    }
}

/// Log-mean of two temperature differences of the same sign.
///
/// Uses the arithmetic mean (the L'Hopital limit) when the two differences
/// agree within `rel_tol`. Returns `None` when the differences have opposite
/// signs or either is zero.
pub fn log_mean(dt1: Real, dt2: Real, rel_tol: Real) -> Option<Real> {
    if dt1 == 0.0 || dt2 == 0.0 || dt1.signum() != dt2.signum() {
        return None;
    }
    let diff = dt1 - dt2;
    if diff.abs() <= rel_tol * dt1.abs().max(dt2.abs()) {
        return Some(0.5 * (dt1 + dt2));
    }
    Some(diff / (dt1 / dt2).ln())
}

/// Linear interpolation between `a` and `b` at fraction `t`.
#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t
}
