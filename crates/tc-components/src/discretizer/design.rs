//! Duty solve for each design variable.

use tc_core::solve::{RootConfig, brent, secant};
use tc_core::{Config, FluidRole, TOLABS_X};
use tc_fluids::{FlowState, InputPair, PropertyAdapter};

use super::{Design, Discretizer, ExchangerSolution};
use crate::error::{ComponentError, ComponentResult};

/// Driving dT at which a pinch-limited duty is taken as the upper bracket.
const PINCH_LIMIT_DT: f64 = 1e-2;

pub(super) fn solve(
    dx: &Discretizer,
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &FlowState,
    secondary: &FlowState,
    design: Design,
) -> ComponentResult<ExchangerSolution> {
    let friction = dx.mode.includes_friction();
    let rate = |q: f64| dx.rate(adapter, config, primary, secondary, q);
    match design {
        Design::HeatDuty(q) => rate(q),
        Design::Effectiveness(eps) => {
            if !(eps > 0.0 && eps <= 1.0) {
                return Err(ComponentError::InvalidArg {
                    what: "effectiveness must be in (0, 1]",
                });
            }
            rate(eps * max_duty(adapter, primary, secondary)?)
        }
        Design::OutletEnthalpy { role, h } => rate(duty_for_enthalpy(primary, secondary, role, h)),
        Design::OutletTemperature { role, t } => {
            let t = t.value;
            let state = stream(primary, secondary, role);
            let h = adapter.evaluate(state.fluid(), InputPair::PT, state.p().value, t)?.h;
            let q0 = duty_for_enthalpy(primary, secondary, role, h);
            if !friction {
                return rate(q0);
            }
            let measure = |q: f64| -> ComponentResult<f64> {
                let sol = rate(q)?;
                Ok(outlet(&sol, role).t().value - t)
            };
            outer(dx, adapter, config, primary, secondary, q0, t.abs(), measure)
        }
        Design::OutletQuality { role, x } => {
            let state = stream(primary, secondary, role);
            let h = adapter
                .evaluate(state.fluid(), InputPair::PQ, state.p().value, x)?
                .h;
            let q0 = duty_for_enthalpy(primary, secondary, role, h);
            if !friction {
                return rate(q0);
            }
            let measure = |q: f64| -> ComponentResult<f64> {
                let sol = rate(q)?;
                let out = outlet(&sol, role);
                let sat = adapter
                    .saturation(out.fluid(), out.p().value)?
                    .ok_or(ComponentError::InvalidArg {
                        what: "outlet quality target above the critical pressure",
                    })?;
                Ok(sat.quality(out.h()) - x)
            };
            outer(dx, adapter, config, primary, secondary, q0, 1.0, measure)
        }
        Design::PinchDeltaT(target) => {
            if !(target > 0.0) {
                return Err(ComponentError::InvalidArg {
                    what: "pinch target must be positive",
                });
            }
            let q_max = max_duty(adapter, primary, secondary)?;
            let pinch = |q: f64| -> ComponentResult<f64> {
                Ok(dx.profile(adapter, config, primary, secondary, q)?.pinch().0 - target)
            };
            let root = brent(
                pinch,
                q_max * 1e-9,
                q_max,
                &root_config(config, q_max, target),
            )?;
            rate(root.x)
        }
        Design::Conductance(ua) => {
            let ua = positive(ua, "conductance target must be positive")?;
            pinch_limited(dx, adapter, config, primary, secondary, ua, |sol| sol.ua)
        }
        Design::Length(length) => {
            let length = positive(length.value, "length target must be positive")?;
            pinch_limited(dx, adapter, config, primary, secondary, length, |sol| sol.length)
        }
    }
}

fn positive(v: f64, what: &'static str) -> ComponentResult<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ComponentError::InvalidArg { what })
    }
}

fn stream<'a>(primary: &'a FlowState, secondary: &'a FlowState, role: FluidRole) -> &'a FlowState {
    match role {
        FluidRole::Primary => primary,
        FluidRole::Secondary => secondary,
    }
}

fn outlet(sol: &ExchangerSolution, role: FluidRole) -> &FlowState {
    match role {
        FluidRole::Primary => &sol.primary_outlet,
        FluidRole::Secondary => &sol.secondary_outlet,
    }
}

/// Duty into the primary that brings `role`'s outlet to enthalpy `h`.
fn duty_for_enthalpy(primary: &FlowState, secondary: &FlowState, role: FluidRole, h: f64) -> f64 {
    match role {
        FluidRole::Primary => primary.m() * (h - primary.h()),
        FluidRole::Secondary => secondary.m() * (secondary.h() - h),
    }
}

/// Thermodynamic maximum duty: either stream leaving at the other's inlet
/// temperature, whichever is smaller. Positive when the primary is colder.
pub(super) fn max_duty(
    adapter: &PropertyAdapter,
    primary: &FlowState,
    secondary: &FlowState,
) -> ComponentResult<f64> {
    let t_p = primary.t().value;
    let t_s = secondary.t().value;
    if t_p == t_s {
        return Err(ComponentError::InvalidArg {
            what: "exchanger inlets have no temperature difference",
        });
    }
    let h_p = adapter
        .evaluate(primary.fluid(), InputPair::PT, primary.p().value, t_s)?
        .h;
    let h_s = adapter
        .evaluate(secondary.fluid(), InputPair::PT, secondary.p().value, t_p)?
        .h;
    let by_primary = primary.m() * (h_p - primary.h());
    let by_secondary = secondary.m() * (secondary.h() - h_s);
    let q = by_primary.abs().min(by_secondary.abs());
    Ok(if t_p < t_s { q } else { -q })
}

fn root_config(config: &Config, q_scale: f64, f_scale: f64) -> RootConfig {
    RootConfig {
        f_tol: (config.tol_rel * f_scale.abs()).max(TOLABS_X * f_scale.abs()).max(TOLABS_X),
        x_tol: (TOLABS_X * q_scale.abs()).max(TOLABS_X),
        max_iterations: config.max_iter_component,
    }
}

/// Duty at which the energy-balance profile pinches to `PINCH_LIMIT_DT`
/// (or the configured floor, if larger).
fn pinch_limit(
    dx: &Discretizer,
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &FlowState,
    secondary: &FlowState,
) -> ComponentResult<f64> {
    let q_max = max_duty(adapter, primary, secondary)?;
    let floor = PINCH_LIMIT_DT.max(config.pinch_floor);
    let pinch = |q: f64| -> ComponentResult<f64> {
        Ok(dx.profile(adapter, config, primary, secondary, q)?.pinch().0 - floor)
    };
    let root = brent(pinch, q_max * 1e-9, q_max, &root_config(config, q_max, floor))?;
    Ok(root.x)
}

/// Brent on duty for a target that grows with duty (conductance, length),
/// bracketed by a vanishing duty and the pinch limit.
fn pinch_limited(
    dx: &Discretizer,
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &FlowState,
    secondary: &FlowState,
    target: f64,
    measure: impl Fn(&ExchangerSolution) -> f64,
) -> ComponentResult<ExchangerSolution> {
    let q_hi = pinch_limit(dx, adapter, config, primary, secondary)?;
    let at_limit = dx.rate(adapter, config, primary, secondary, q_hi)?;
    if measure(&at_limit) < target {
        return Err(ComponentError::InfeasibleGeometry {
            cell: at_limit
                .cells
                .iter()
                .position(|c| c.min_driving_delta_t().is_some_and(|dt| dt <= at_limit.pinch))
                .unwrap_or(0),
            location: at_limit.pinch_location,
            min_delta_t: at_limit.pinch,
        });
    }
    let residual = |q: f64| -> ComponentResult<f64> {
        Ok(measure(&dx.rate(adapter, config, primary, secondary, q)?) - target)
    };
    let root = brent(residual, q_hi * 1e-6, q_hi, &root_config(config, q_hi, target))?;
    dx.rate(adapter, config, primary, secondary, root.x)
}

/// Secant from the frictionless estimate, Brent over the feasible duty range
/// if the secant fails.
#[allow(clippy::too_many_arguments)]
fn outer(
    dx: &Discretizer,
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &FlowState,
    secondary: &FlowState,
    q0: f64,
    f_scale: f64,
    measure: impl Fn(f64) -> ComponentResult<f64>,
) -> ComponentResult<ExchangerSolution> {
    let settings = root_config(config, q0, f_scale);
    let q = match secant(&measure, q0, q0 * (1.0 + 1e-3), &settings) {
        Ok(root) => root.x,
        Err(err) => {
            tracing::debug!(error = %err, "secant failed, falling back to Brent");
            let q_hi = pinch_limit(dx, adapter, config, primary, secondary)?;
            brent(&measure, q_hi * 1e-6, q_hi, &settings)?.x
        }
    };
    dx.rate(adapter, config, primary, secondary, q)
}
