//! Damped Newton solver with lower-bound projection.

use nalgebra::{DMatrix, DVector};

use super::jacobian::finite_difference_jacobian;
use crate::TcError;

/// Newton solver configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the infinity norm of the residual
    pub abs_tol: f64,
    /// Tolerance relative to the initial residual norm
    pub rel_tol: f64,
    /// Per-unknown lower bounds; trial points are projected onto them
    pub lower_bounds: Option<DVector<f64>>,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative perturbation for finite-difference Jacobians
    pub fd_epsilon: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-9,
            rel_tol: 0.0,
            lower_bounds: None,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

impl NewtonConfig {
    fn project(&self, mut x: DVector<f64>) -> DVector<f64> {
        if let Some(lb) = &self.lower_bounds {
            for (xi, &lo) in x.iter_mut().zip(lb.iter()) {
                if *xi < lo {
                    *xi = lo;
                }
            }
        }
        x
    }
}

/// Newton iteration result.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Residual at the solution
    pub residual: DVector<f64>,
    /// Final residual norm (infinity norm)
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
}

/// Newton solver with backtracking line search.
///
/// A trial point whose residual evaluation fails is treated like one that
/// does not reduce the residual: the step is halved and retried. Returns
/// `TcError::Singular` when the Jacobian cannot be factorized and
/// `TcError::NotConverged` when the iteration budget or the line search is
/// exhausted.
pub fn newton_solve<F, J, E>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> Result<NewtonResult, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<TcError>,
{
    let mut x = config.project(x0);
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.amax();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if !r_norm.is_finite() {
            return Err(TcError::NonFinite {
                what: "newton residual",
                value: r_norm,
            }
            .into());
        }
        if r_norm <= config.abs_tol || r_norm <= config.rel_tol * r0_norm {
            return Ok(NewtonResult {
                x,
                residual: r,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = jacobian_fn(&x, &r)?;
        let dx = jac
            .lu()
            .solve(&(-&r))
            .filter(|dx| dx.iter().all(|v| v.is_finite()))
            .ok_or(TcError::Singular {
                what: "newton jacobian",
            })?;

        // Backtracking line search
        let mut alpha = 1.0;
        let mut accepted = None;
        let mut fallback = None;
        for _ in 0..=config.max_line_search_iters {
            let x_trial = config.project(&x + alpha * &dx);
            if let Ok(r_trial) = residual_fn(&x_trial) {
                let n_trial = r_trial.amax();
                if n_trial.is_finite() {
                    if n_trial < r_norm {
                        accepted = Some((x_trial, r_trial, n_trial));
                        break;
                    }
                    if fallback.is_none() {
                        fallback = Some((x_trial, r_trial, n_trial));
                    }
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, n_new)) = accepted.or(fallback) else {
            return Err(TcError::NotConverged {
                what: "newton line search",
                iterations: iter + 1,
                residual: r_norm,
            }
            .into());
        };

        x = x_new;
        r = r_new;
        r_norm = n_new;
    }

    if r_norm <= config.abs_tol {
        return Ok(NewtonResult {
            x,
            residual: r,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        });
    }

    Err(TcError::NotConverged {
        what: "newton iteration",
        iterations: config.max_iterations,
        residual: r_norm,
    }
    .into())
}

/// [`newton_solve`] with a forward-difference Jacobian of `residual_fn`.
pub fn newton_solve_fd<F, E>(
    x0: DVector<f64>,
    residual_fn: F,
    config: &NewtonConfig,
) -> Result<NewtonResult, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    E: From<TcError>,
{
    let eps = config.fd_epsilon;
    let jacobian_fn =
        |x: &DVector<f64>, fx: &DVector<f64>| finite_difference_jacobian(x, fx, &residual_fn, eps);
    newton_solve(x0, &residual_fn, jacobian_fn, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: &DVector<f64>| -> Result<DVector<f64>, TcError> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>, _r: &DVector<f64>| -> Result<DMatrix<f64>, TcError> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn coupled_system_with_fd_jacobian() {
        // x0 + x1 = 3, x0 * x1 = 2  ->  (1, 2) from a start near it
        let residual = |x: &DVector<f64>| -> Result<DVector<f64>, TcError> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 3.0, x[0] * x[1] - 2.0]))
        };
        let x0 = DVector::from_vec(vec![0.8, 2.3]);
        let result = newton_solve_fd(x0, residual, &NewtonConfig::default()).unwrap();

        assert!((result.x[0] - 1.0).abs() < 1e-6);
        assert!((result.x[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn lower_bounds_keep_iterates_admissible() {
        // ln(x) = 0 has its root at 1; a full step from 3 would go negative.
        let residual = |x: &DVector<f64>| -> Result<DVector<f64>, TcError> {
            if x[0] <= 0.0 {
                return Err(TcError::InvalidArg { what: "log domain" });
            }
            Ok(DVector::from_element(1, x[0].ln()))
        };
        let config = NewtonConfig {
            lower_bounds: Some(DVector::from_element(1, 1e-6)),
            ..NewtonConfig::default()
        };
        let result = newton_solve_fd(DVector::from_element(1, 3.0), residual, &config).unwrap();
        assert!((result.x[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        let residual = |_x: &DVector<f64>| -> Result<DVector<f64>, TcError> {
            Ok(DVector::from_element(1, 1.0))
        };
        let err = newton_solve_fd(DVector::from_element(1, 0.0), residual, &NewtonConfig::default())
            .unwrap_err();
        assert!(matches!(err, TcError::Singular { .. }));
    }
}
