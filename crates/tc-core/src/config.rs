//! Solver and discretization tunables.

use crate::error::{TcError, TcResult};
use crate::numeric::TOLABS_X;
use crate::units::constants::G0_MPS2;

/// Seed update rule used before the Broyden phase of a cycle solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Accelerator {
    /// Damped successive substitution.
    Substitution,
    /// Per-component Wegstein acceleration.
    #[default]
    Wegstein,
}

/// Enumerated tunables controlling convergence, discretization and regime selection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Absolute tolerance for component-level iterations.
    pub tol_abs: f64,
    /// Relative tolerance for component-level iterations.
    pub tol_rel: f64,
    /// Floor for residual comparisons when a scale vanishes.
    pub tol_abs_x: f64,
    /// Infinity-norm tolerance on the normalized anchor residual.
    pub tol_cycle: f64,
    pub max_iter_cycle: usize,
    pub max_iter_component: usize,
    /// Relaxation applied to successive substitution, in (0, 1].
    pub damping: f64,
    /// Iterations of the warm-up accelerator before switching to Broyden.
    pub warmup_iters: usize,
    pub accelerator: Accelerator,
    /// Clamp on the Wegstein acceleration factor (min, max).
    pub wegstein_bounds: (f64, f64),
    /// Minimum number of cells in a non-collapsed region.
    pub cells_per_region: usize,
    /// Upper bound on cells in one exchanger.
    pub max_cells: usize,
    /// Target temperature change per adaptive single-phase cell [K].
    pub div_t: f64,
    /// Target quality change per adaptive two-phase cell.
    pub div_x: f64,
    /// Minimum admissible internal temperature difference [K].
    pub pinch_floor: f64,
    /// Relative pressure deviation that triggers a second boundary pass.
    pub eps_p: f64,
    /// Gravitational acceleration [m/s^2].
    pub gravity: f64,
    pub dp_port_in_factor: f64,
    pub dp_port_out_factor: f64,
    /// CoolProp backend name.
    pub coolprop_backend: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tol_abs: 1e-7,
            tol_rel: 1e-7,
            tol_abs_x: TOLABS_X,
            tol_cycle: 1e-7,
            max_iter_cycle: 50,
            max_iter_component: 50,
            damping: 1.0,
            warmup_iters: 3,
            accelerator: Accelerator::Wegstein,
            wegstein_bounds: (-5.0, 0.0),
            cells_per_region: 2,
            max_cells: 200,
            div_t: 5.0,
            div_x: 0.1,
            pinch_floor: 0.0,
            eps_p: 1e-3,
            gravity: G0_MPS2,
            dp_port_in_factor: 1.0,
            dp_port_out_factor: 0.4,
            coolprop_backend: "HEOS".to_string(),
        }
    }
}

impl Config {
    /// Reject tunables no solver can work with.
    pub fn validate(&self) -> TcResult<()> {
        let positive = [
            (self.tol_abs, "tol_abs must be positive"),
            (self.tol_rel, "tol_rel must be positive"),
            (self.tol_abs_x, "tol_abs_x must be positive"),
            (self.tol_cycle, "tol_cycle must be positive"),
            (self.div_t, "div_t must be positive"),
            (self.div_x, "div_x must be positive"),
            (self.eps_p, "eps_p must be positive"),
        ];
        for (value, what) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TcError::InvalidArg { what });
            }
        }
        if self.max_iter_cycle == 0 || self.max_iter_component == 0 {
            return Err(TcError::InvalidArg {
                what: "iteration caps must be nonzero",
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(TcError::InvalidArg {
                what: "damping must be in (0, 1]",
            });
        }
        let (q_min, q_max) = self.wegstein_bounds;
        if !(q_min.is_finite() && q_max.is_finite() && q_min <= q_max && q_max < 1.0) {
            return Err(TcError::InvalidArg {
                what: "wegstein bounds must satisfy min <= max < 1",
            });
        }
        if self.cells_per_region == 0 || self.max_cells == 0 {
            return Err(TcError::InvalidArg {
                what: "cell counts must be nonzero",
            });
        }
        if self.cells_per_region > self.max_cells {
            return Err(TcError::InvalidArg {
                what: "cells_per_region exceeds max_cells",
            });
        }
        if !(self.pinch_floor.is_finite() && self.pinch_floor >= 0.0) {
            return Err(TcError::InvalidArg {
                what: "pinch_floor must be non-negative",
            });
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(TcError::InvalidArg {
                what: "gravity must be non-negative",
            });
        }
        if self.dp_port_in_factor < 0.0 || self.dp_port_out_factor < 0.0 {
            return Err(TcError::InvalidArg {
                what: "port loss factors must be non-negative",
            });
        }
        if self.coolprop_backend.trim().is_empty() {
            return Err(TcError::InvalidArg {
                what: "coolprop_backend must be named",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.max_iter_cycle, 50);
        assert_eq!(cfg.max_cells, 200);
        assert_eq!(cfg.tol_abs_x, 1e-10);
        assert_eq!(cfg.dp_port_out_factor, 0.4);
    }

    #[test]
    fn rejects_bad_damping() {
        let cfg = Config {
            damping: 0.0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            damping: 1.5,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_wegstein_bounds() {
        let cfg = Config {
            wegstein_bounds: (0.0, -5.0),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_cells() {
        let cfg = Config {
            cells_per_region: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
