//! Forward-difference Jacobian for the small Newton systems.

use nalgebra::{DMatrix, DVector};

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by `epsilon * max(|x[j]|, 1)` and computes
/// (f(x+e) - f(x))/e. `f_x` is the residual already evaluated at `x`.
pub fn finite_difference_jacobian<F, E>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: &F,
    epsilon: f64,
) -> Result<DMatrix<f64>, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let f_perturbed = f(&x_perturbed)?;
        let df = (f_perturbed - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}
