//! Fixed-point update rules for the anchor seeds.
//!
//! All rules work on scaled variables `y = x / scale` with the fixed-point
//! map `g(y)` produced by one traversal, and return the next seed.

use nalgebra::{DMatrix, DVector};
use tc_core::Accelerator;

/// Damped successive substitution: `y + damping (g - y)`.
pub fn substitution(y: &DVector<f64>, g: &DVector<f64>, damping: f64) -> DVector<f64> {
    y + (g - y) * damping
}

/// Per-component Wegstein acceleration.
#[derive(Clone, Debug)]
pub struct Wegstein {
    bounds: (f64, f64),
    previous: Option<(DVector<f64>, DVector<f64>)>,
}

impl Wegstein {
    pub fn new(bounds: (f64, f64)) -> Self {
        Self {
            bounds,
            previous: None,
        }
    }

    /// Next seed; plain substitution until a secant slope is available.
    pub fn step(&mut self, y: &DVector<f64>, g: &DVector<f64>, damping: f64) -> DVector<f64> {
        let next = match &self.previous {
            Some((y0, g0)) => DVector::from_fn(y.len(), |i, _| {
                let dy = y[i] - y0[i];
                let q = if dy.abs() > f64::EPSILON {
                    let s = (g[i] - g0[i]) / dy;
                    if (s - 1.0).abs() > f64::EPSILON { s / (s - 1.0) } else { self.bounds.0 }
                } else {
                    0.0
                };
                let q = q.clamp(self.bounds.0, self.bounds.1);
                q * y[i] + (1.0 - q) * g[i]
            }),
            None => substitution(y, g, damping),
        };
        self.previous = Some((y.clone(), g.clone()));
        next
    }
}

/// "Good" Broyden update of the inverse Jacobian of `F(y) = g(y) - y`.
///
/// Starts from `H = -I`, whose first step is plain substitution.
#[derive(Clone, Debug)]
pub struct Broyden {
    h: DMatrix<f64>,
    previous: Option<(DVector<f64>, DVector<f64>)>,
}

impl Broyden {
    pub fn new(n: usize) -> Self {
        Self {
            h: -DMatrix::identity(n, n),
            previous: None,
        }
    }

    pub fn reset(&mut self) {
        let n = self.h.nrows();
        self.h = -DMatrix::identity(n, n);
        self.previous = None;
    }

    /// Next seed, or `None` when the update degenerates.
    pub fn step(&mut self, y: &DVector<f64>, g: &DVector<f64>) -> Option<DVector<f64>> {
        let f = g - y;
        if let Some((y0, f0)) = &self.previous {
            let dy = y - y0;
            let df = &f - f0;
            let h_df = &self.h * &df;
            let denom = dy.dot(&h_df);
            if denom.abs() > f64::EPSILON * dy.norm() * h_df.norm() && denom.is_finite() {
                let row = dy.transpose() * &self.h;
                self.h += (&dy - &h_df) * row / denom;
            }
        }
        self.previous = Some((y.clone(), f.clone()));
        let next = y - &self.h * &f;
        next.iter().all(|v| v.is_finite()).then_some(next)
    }
}

/// Warm-up rule chosen by [`Accelerator`].
#[derive(Clone, Debug)]
pub enum Warmup {
    Substitution,
    Wegstein(Wegstein),
}

impl Warmup {
    pub fn new(accelerator: Accelerator, bounds: (f64, f64)) -> Self {
        match accelerator {
            Accelerator::Substitution => Warmup::Substitution,
            Accelerator::Wegstein => Warmup::Wegstein(Wegstein::new(bounds)),
        }
    }

    pub fn step(&mut self, y: &DVector<f64>, g: &DVector<f64>, damping: f64) -> DVector<f64> {
        match self {
            Warmup::Substitution => substitution(y, g, damping),
            Warmup::Wegstein(w) => w.step(y, g, damping),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Warmup::Substitution => "substitution",
            Warmup::Wegstein(_) => "wegstein",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Linear contraction g(y) = A y + b with fixed point y* = (I - A)^-1 b.
    fn linear_map(y: &DVector<f64>) -> DVector<f64> {
        let a = DMatrix::from_row_slice(2, 2, &[0.9, 0.05, -0.1, 0.8]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        a * y + b
    }

    fn fixed_point() -> DVector<f64> {
        let a = DMatrix::from_row_slice(2, 2, &[0.9, 0.05, -0.1, 0.8]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        (DMatrix::identity(2, 2) - a).lu().solve(&b).unwrap()
    }

    #[test]
    fn broyden_beats_substitution_on_a_linear_map() {
        let target = fixed_point();
        let mut y = DVector::zeros(2);
        let mut broyden = Broyden::new(2);
        let mut iterations = 0;
        while (linear_map(&y) - &y).amax() > 1e-10 && iterations < 50 {
            y = broyden.step(&y, &linear_map(&y)).unwrap();
            iterations += 1;
        }
        assert!(iterations < 10, "broyden took {iterations} steps");
        assert_relative_eq!(y, target, epsilon = 1e-8);
    }

    #[test]
    fn wegstein_solves_a_scalar_contraction_quickly() {
        // g(y) = 0.9 y + 1, y* = 10; the secant slope is exact after one step
        let g = |y: &DVector<f64>| y * 0.9 + DVector::from_element(1, 1.0);
        let mut w = Wegstein::new((-10.0, 0.0));
        let mut y = DVector::zeros(1);
        for _ in 0..3 {
            let gy = g(&y);
            y = w.step(&y, &gy, 1.0);
        }
        assert_relative_eq!(y[0], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn wegstein_clamps_to_bounds() {
        let mut w = Wegstein::new((-1.0, 0.0));
        let y0 = DVector::from_element(1, 0.0);
        let _ = w.step(&y0, &DVector::from_element(1, 1.0), 1.0);
        // slope 0.99 would ask for q = -99
        let y1 = DVector::from_element(1, 1.0);
        let next = w.step(&y1, &DVector::from_element(1, 1.99), 1.0);
        assert_relative_eq!(next[0], -1.0 * 1.0 + 2.0 * 1.99, epsilon = 1e-12);
    }
}
