//! Scalar root finders: secant and Brent.

use crate::TcError;

/// Termination settings for scalar root finding.
#[derive(Clone, Copy, Debug)]
pub struct RootConfig {
    /// Stop when `|f(x)| <= f_tol`.
    pub f_tol: f64,
    /// Stop when the step (secant) or bracket (Brent) is below `x_tol`.
    pub x_tol: f64,
    pub max_iterations: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            f_tol: 1e-10,
            x_tol: 1e-12,
            max_iterations: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootResult {
    pub x: f64,
    pub fx: f64,
    pub iterations: usize,
}

/// Secant iteration from two starting points.
///
/// Fast when started close to the root, with no bracketing guarantee. Callers
/// that need robustness fall back to [`brent`] on failure.
pub fn secant<F, E>(mut f: F, x0: f64, x1: f64, config: &RootConfig) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<TcError>,
{
    let (mut xa, mut xb) = (x0, x1);
    let mut fa = f(xa)?;
    if fa.abs() <= config.f_tol {
        return Ok(RootResult {
            x: xa,
            fx: fa,
            iterations: 0,
        });
    }
    let mut fb = f(xb)?;

    for iter in 1..=config.max_iterations {
        if fb.abs() <= config.f_tol {
            return Ok(RootResult {
                x: xb,
                fx: fb,
                iterations: iter,
            });
        }
        let slope = fb - fa;
        if slope == 0.0 || !slope.is_finite() {
            return Err(TcError::Singular {
                what: "secant slope",
            }
            .into());
        }
        let x_next = xb - fb * (xb - xa) / slope;
        if !x_next.is_finite() {
            return Err(TcError::NonFinite {
                what: "secant iterate",
                value: x_next,
            }
            .into());
        }
        xa = xb;
        fa = fb;
        xb = x_next;
        fb = f(xb)?;
        if (xb - xa).abs() <= config.x_tol {
            return Ok(RootResult {
                x: xb,
                fx: fb,
                iterations: iter,
            });
        }
    }

    Err(TcError::NotConverged {
        what: "secant iteration",
        iterations: config.max_iterations,
        residual: fb.abs(),
    }
    .into())
}

/// Brent's method on a bracket `[a, b]` whose residuals differ in sign.
pub fn brent<F, E>(mut f: F, a: f64, b: f64, config: &RootConfig) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<TcError>,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a)?;
    let mut fb = f(b)?;
    if fa.abs() <= config.f_tol {
        return Ok(RootResult {
            x: a,
            fx: fa,
            iterations: 0,
        });
    }
    if fb.abs() <= config.f_tol {
        return Ok(RootResult {
            x: b,
            fx: fb,
            iterations: 0,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(TcError::NotBracketed {
            what: "brent endpoints share a sign",
        }
        .into());
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb.abs() <= config.f_tol {
            return Ok(RootResult {
                x: b,
                fx: fb,
                iterations: iter,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Inverse quadratic interpolation, or secant when a == c
            let s = fb / fa;
            let mut p;
            let mut q;
            if a == c {
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0));
                q = (qa - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b)?;
    }

    Err(TcError::NotConverged {
        what: "brent iteration",
        iterations: config.max_iterations,
        residual: fb.abs(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(x: f64) -> Result<f64, TcError> {
        Ok(x * x * x - 2.0 * x - 5.0)
    }

    #[test]
    fn brent_finds_cubic_root() {
        let root = brent(cubic, 2.0, 3.0, &RootConfig::default()).unwrap();
        assert_relative_eq!(root.x, 2.094_551_481_542_326_5, epsilon = 1e-9);
    }

    #[test]
    fn brent_requires_bracket() {
        let err = brent(cubic, 3.0, 4.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, TcError::NotBracketed { .. }));
    }

    #[test]
    fn secant_finds_cubic_root() {
        let root = secant(cubic, 2.0, 2.2, &RootConfig::default()).unwrap();
        assert_relative_eq!(root.x, 2.094_551_481_542_326_5, epsilon = 1e-9);
    }

    #[test]
    fn secant_flat_function_is_singular() {
        let flat = |_x: f64| -> Result<f64, TcError> { Ok(1.0) };
        let err = secant(flat, 0.0, 1.0, &RootConfig::default()).unwrap_err();
        assert!(matches!(err, TcError::Singular { .. }));
    }
}
