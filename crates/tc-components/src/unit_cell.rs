//! Unit cell: one segment of an exchanger or pipe over which both streams
//! stay in a single flow regime.
//!
//! A cell closes the energy balance of each stream, the momentum balance of
//! each stream (when friction is enabled) and the rate equation
//! `q = U' L dT_lm`, where `U'` is the overall conductance per unit length.
//! One of `q` and `L` is prescribed; the other and the outlet pressures are
//! solved with a damped Newton iteration.

use nalgebra::DVector;
use tc_core::solve::{NewtonConfig, newton_solve_fd};
use tc_core::{Config, FlowSense, TransferMode, UnitPhase, log_mean};
use tc_fluids::{FlowState, InputPair, PropertyAdapter, Saturation};

use crate::common::EPSILON_MDOT;
use crate::correlations::{self, Conditions};
use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, Wall};
use crate::warning::Warning;

/// One stream entering a cell.
#[derive(Clone, Copy, Debug)]
pub struct CellStream<'a> {
    pub inlet: &'a FlowState,
    pub channel: &'a Channel,
    pub regime: UnitPhase,
    /// Saturation at the stream pressure, for two-phase regimes
    pub saturation: Option<&'a Saturation>,
    pub p_crit: Option<f64>,
}

/// What the primary stream exchanges heat with.
#[derive(Clone, Copy, Debug)]
pub enum Counterpart<'a> {
    /// Nothing: the duty, if any, is prescribed.
    None,
    /// Constant-temperature surroundings behind a per-length conductance.
    Ambient { t: f64, ua_per_length: f64 },
    Stream {
        stream: CellStream<'a>,
        sense: FlowSense,
    },
}

/// Which of duty and length is prescribed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Closure {
    /// Duty into the primary [W]; the length is solved.
    Heat(f64),
    /// Length [m]; the duty is solved.
    Length(f64),
    /// Both prescribed; only pressures are solved.
    HeatAndLength { q: f64, length: f64 },
}

/// Results for one stream of a solved cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SideSolution {
    pub outlet: FlowState,
    /// Film coefficient [W/(m^2 K)]
    pub alpha: f64,
    /// Darcy friction factor
    pub f: f64,
    pub reynolds: f64,
    /// Total pressure drop inlet to outlet [Pa]
    pub dp: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellSolution {
    /// Duty into the primary [W]
    pub q: f64,
    pub length: f64,
    /// Primary heat-transfer area [m^2]
    pub area: f64,
    /// Overall conductance [W/K]
    pub ua: f64,
    pub lmtd: Option<f64>,
    /// Driving dT (counterpart minus primary) at the primary inlet and outlet ends
    pub dt_ends: Option<(f64, f64)>,
    pub t_wall: Option<f64>,
    pub primary: SideSolution,
    pub secondary: Option<SideSolution>,
    pub warnings: Vec<Warning>,
}

impl CellSolution {
    /// Smallest driving dT in the direction of heat flow.
    pub fn min_driving_delta_t(&self) -> Option<f64> {
        let (a, b) = self.dt_ends?;
        let sign = if self.q < 0.0 { -1.0 } else { 1.0 };
        Some((sign * a).min(sign * b))
    }
}

#[derive(Clone, Copy, Debug)]
struct Trial {
    q: f64,
    length: f64,
    p_primary: f64,
    p_secondary: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Free {
    Length,
    Heat,
    Nothing,
}

/// Placement of the unknowns in the Newton vector.
#[derive(Clone, Copy, Debug)]
struct Layout {
    free: Free,
    primary_p: bool,
    secondary_p: bool,
}

impl Layout {
    fn len(&self) -> usize {
        usize::from(self.free != Free::Nothing) + usize::from(self.primary_p) + usize::from(self.secondary_p)
    }

    fn pack(&self, trial: &Trial) -> Vec<f64> {
        let mut x = Vec::with_capacity(3);
        match self.free {
            Free::Length => x.push(trial.length),
            Free::Heat => x.push(trial.q),
            Free::Nothing => {}
        }
        if self.primary_p {
            x.push(trial.p_primary);
        }
        if self.secondary_p {
            x.push(trial.p_secondary);
        }
        x
    }

    fn unpack(&self, x: &DVector<f64>, base: Trial) -> Trial {
        let mut trial = base;
        let mut i = 0;
        match self.free {
            Free::Length => {
                trial.length = x[i];
                i += 1;
            }
            Free::Heat => {
                trial.q = x[i];
                i += 1;
            }
            Free::Nothing => {}
        }
        if self.primary_p {
            trial.p_primary = x[i];
            i += 1;
        }
        if self.secondary_p {
            trial.p_secondary = x[i];
        }
        trial
    }
}

struct Evaluation {
    primary: SideSolution,
    secondary: Option<SideSolution>,
    /// Overall conductance per unit length [W/(m K)]
    u_per_length: f64,
    dt_ends: Option<(f64, f64)>,
    t_primary_mean: f64,
}

/// A cell ready to be solved.
#[derive(Clone, Copy, Debug)]
pub struct UnitCell<'a> {
    pub primary: CellStream<'a>,
    pub counterpart: Counterpart<'a>,
    pub closure: Closure,
    pub mode: TransferMode,
    pub wall: Wall,
}

impl<'a> UnitCell<'a> {
    pub fn solve(&self, adapter: &PropertyAdapter, config: &Config) -> ComponentResult<CellSolution> {
        let secondary_inlet = match &self.counterpart {
            Counterpart::Stream { stream, .. } => Some(stream.inlet),
            _ => None,
        };
        let friction = self.mode.includes_friction();
        let heat = self.mode.includes_heat() && !matches!(self.counterpart, Counterpart::None);
        let mut base = Trial {
            q: 0.0,
            length: 0.0,
            p_primary: self.primary.inlet.p().value,
            p_secondary: secondary_inlet.map_or(0.0, |s| s.p().value),
        };

        let free = match self.closure {
            Closure::Heat(q) => {
                if !heat {
                    return Err(ComponentError::InvalidArg {
                        what: "a prescribed-duty cell needs heat transfer and a counterpart",
                    });
                }
                base.q = q;
                if q == 0.0 {
                    Free::Nothing
                } else {
                    base.length = self.initial_length(adapter, config, base)?;
                    Free::Length
                }
            }
            Closure::Length(length) => {
                base.length = length;
                if heat {
                    base.q = self.initial_duty(adapter, config, base)?;
                    if base.q == 0.0 { Free::Nothing } else { Free::Heat }
                } else {
                    Free::Nothing
                }
            }
            Closure::HeatAndLength { q, length } => {
                base.q = q;
                base.length = length;
                Free::Nothing
            }
        };
        let layout = Layout {
            free,
            primary_p: friction,
            secondary_p: friction && secondary_inlet.is_some(),
        };

        let solved = if layout.len() == 0 {
            base
        } else {
            self.newton(adapter, config, layout, base)?
        };

        let mut warnings = Vec::new();
        if matches!(
            self.counterpart,
            Counterpart::Stream {
                sense: FlowSense::Crossflow,
                ..
            }
        ) {
            Warning::push_unique(&mut warnings, Warning::CrossflowAsCounterflow);
        }
        let ev = self.evaluate(adapter, config, &solved, &mut warnings)?;
        let lmtd = match ev.dt_ends {
            Some((a, b)) if heat && solved.q != 0.0 => Some(lmtd_or_sign_change(a, b, config)?),
            _ => None,
        };
        let ua = if heat { ev.u_per_length * solved.length } else { 0.0 };
        let area = self.primary.channel.heated_perimeter * solved.length;
        let t_wall = (heat && area > 0.0 && ev.primary.alpha > 0.0)
            .then(|| ev.t_primary_mean + solved.q / (ev.primary.alpha * area));

        Ok(CellSolution {
            q: solved.q,
            length: solved.length,
            area,
            ua,
            lmtd,
            dt_ends: ev.dt_ends,
            t_wall,
            primary: ev.primary,
            secondary: ev.secondary,
            warnings,
        })
    }

    fn newton(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        layout: Layout,
        base: Trial,
    ) -> ComponentResult<Trial> {
        let pressure_floor = 1e-3;
        let mut lower = Vec::with_capacity(3);
        match layout.free {
            Free::Length => lower.push(1e-12),
            Free::Heat => lower.push(f64::NEG_INFINITY),
            Free::Nothing => {}
        }
        if layout.primary_p {
            lower.push(pressure_floor * base.p_primary);
        }
        if layout.secondary_p {
            lower.push(pressure_floor * base.p_secondary);
        }
        let newton_config = NewtonConfig {
            max_iterations: config.max_iter_component,
            abs_tol: config.tol_rel.max(tc_core::TOLABS_X),
            lower_bounds: Some(DVector::from_vec(lower)),
            ..NewtonConfig::default()
        };

        let q_scale = match self.closure {
            Closure::Length(_) => self.duty_scale(adapter, config, base)?,
            _ => base.q.abs(),
        };
        let residual = |x: &DVector<f64>| -> ComponentResult<DVector<f64>> {
            let trial = layout.unpack(x, base);
            let ev = self.evaluate(adapter, config, &trial, &mut Vec::new())?;
            let mut r = Vec::with_capacity(3);
            if layout.free != Free::Nothing {
                let (a, b) = ev.dt_ends.ok_or(ComponentError::InvalidArg {
                    what: "heat transfer needs a counterpart",
                })?;
                let lmtd = lmtd_or_sign_change(a, b, config)?;
                let q_rate = ev.u_per_length * trial.length * lmtd;
                r.push((trial.q - q_rate) / q_scale);
            }
            if layout.primary_p {
                let p_in = self.primary.inlet.p().value;
                r.push((p_in - ev.primary.dp - trial.p_primary) / p_in);
            }
            if layout.secondary_p {
                if let (Some(sec), Counterpart::Stream { stream, .. }) = (&ev.secondary, &self.counterpart) {
                    let p_in = stream.inlet.p().value;
                    r.push((p_in - sec.dp - trial.p_secondary) / p_in);
                }
            }
            Ok(DVector::from_vec(r))
        };

        let x0 = DVector::from_vec(layout.pack(&base));
        let result = newton_solve_fd(x0, residual, &newton_config)?;
        tracing::trace!(
            iterations = result.iterations,
            residual = result.residual_norm,
            "unit cell converged"
        );
        Ok(layout.unpack(&result.x, base))
    }

    /// Frictionless length estimate for a prescribed duty.
    fn initial_length(&self, adapter: &PropertyAdapter, config: &Config, base: Trial) -> ComponentResult<f64> {
        let trial = Trial { length: 1.0, ..base };
        let ev = self.evaluate(adapter, config, &trial, &mut Vec::new())?;
        let (a, b) = ev.dt_ends.ok_or(ComponentError::InvalidArg {
            what: "heat transfer needs a counterpart",
        })?;
        let lmtd = lmtd_or_sign_change(a, b, config)?;
        let length = base.q / (ev.u_per_length * lmtd);
        if !(length.is_finite() && length > 0.0) {
            let sign = base.q.signum();
            return Err(ComponentError::InfeasibleGeometry {
                cell: 0,
                location: 0.0,
                min_delta_t: (sign * a).min(sign * b),
            });
        }
        Ok(length)
    }

    /// Conservative duty estimate for a prescribed length, from the inlet
    /// temperature difference and the stream capacity rates.
    fn initial_duty(&self, adapter: &PropertyAdapter, config: &Config, base: Trial) -> ComponentResult<f64> {
        let ev = self.evaluate(adapter, config, &base, &mut Vec::new())?;
        let t_p = self.primary.inlet.t().value;
        let (dt_in, inv_c_s) = match &self.counterpart {
            Counterpart::Ambient { t, .. } => (t - t_p, 0.0),
            Counterpart::Stream { stream, .. } => (stream.inlet.t().value - t_p, inverse_capacity(stream.inlet)),
            Counterpart::None => (0.0, 0.0),
        };
        let ua = ev.u_per_length * base.length;
        let inv_c = inverse_capacity(self.primary.inlet) + inv_c_s;
        Ok(0.9 * ua * dt_in / (1.0 + ua * inv_c))
    }

    fn duty_scale(&self, adapter: &PropertyAdapter, config: &Config, base: Trial) -> ComponentResult<f64> {
        let ev = self.evaluate(adapter, config, &Trial { q: 0.0, ..base }, &mut Vec::new())?;
        let dt = ev.dt_ends.map_or(0.0, |(a, _)| a.abs());
        Ok((ev.u_per_length * base.length * dt).max(1.0))
    }

    fn evaluate(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        trial: &Trial,
        warnings: &mut Vec<Warning>,
    ) -> ComponentResult<Evaluation> {
        let (primary, t_primary_mean) =
            self.side(&self.primary, trial.q, trial.length, trial.p_primary, adapter, config, warnings)?;
        let film = |side: &SideSolution, channel: &Channel| {
            if side.alpha > 0.0 {
                1.0 / (side.alpha * channel.heated_perimeter)
            } else {
                f64::INFINITY
            }
        };
        let r_primary = film(&primary, self.primary.channel)
            + self.wall.resistance_per_length(self.primary.channel.heated_perimeter);
        let t_in = self.primary.inlet.t().value;
        let t_out = primary.outlet.t().value;

        let (secondary, dt_ends, u_per_length) = match &self.counterpart {
            Counterpart::None => (None, None, 0.0),
            Counterpart::Ambient { t, ua_per_length } => {
                let u = 1.0 / (r_primary + 1.0 / ua_per_length);
                (None, Some((t - t_in, t - t_out)), u)
            }
            Counterpart::Stream { stream, sense } => {
                let (sec, _) =
                    self.side(stream, -trial.q, trial.length, trial.p_secondary, adapter, config, warnings)?;
                let t_s_in = stream.inlet.t().value;
                let t_s_out = sec.outlet.t().value;
                let dt = match sense {
                    FlowSense::Parallelflow => (t_s_in - t_in, t_s_out - t_out),
                    FlowSense::Counterflow | FlowSense::Crossflow => (t_s_out - t_in, t_s_in - t_out),
                    FlowSense::Undefined => {
                        return Err(ComponentError::InvalidArg {
                            what: "two-stream cell needs a flow sense",
                        });
                    }
                };
                let u = 1.0 / (r_primary + film(&sec, stream.channel));
                (Some(sec), Some(dt), u)
            }
        };
        Ok(Evaluation {
            primary,
            secondary,
            u_per_length,
            dt_ends,
            t_primary_mean,
        })
    }

    /// Outlet state, film coefficient and pressure drop of one stream.
    #[allow(clippy::too_many_arguments)]
    fn side(
        &self,
        stream: &CellStream<'_>,
        q: f64,
        length: f64,
        p_out: f64,
        adapter: &PropertyAdapter,
        config: &Config,
        warnings: &mut Vec<Warning>,
    ) -> ComponentResult<(SideSolution, f64)> {
        let inlet = stream.inlet;
        let m = inlet.m();
        if m <= EPSILON_MDOT {
            return Err(ComponentError::InvalidArg {
                what: "unit cell stream needs a positive mass flow",
            });
        }
        let h_out = inlet.h() + q / m;
        let pinned = stream.regime.imposed_phase();
        let outlet = inlet.at_ph_in(adapter, p_out, h_out, pinned)?;
        if self.mode == TransferMode::None {
            let t_mean = 0.5 * (inlet.t().value + outlet.t().value);
            return Ok((
                SideSolution {
                    outlet,
                    alpha: 0.0,
                    f: 0.0,
                    reynolds: 0.0,
                    dp: 0.0,
                },
                t_mean,
            ));
        }

        let channel = stream.channel;
        let p_mean = 0.5 * (inlet.p().value + p_out);
        let h_mean = 0.5 * (inlet.h() + h_out);
        let bulk =
            adapter.evaluate_with_phase(inlet.fluid(), InputPair::HmassP, h_mean, p_mean, pinned)?;
        let quality = if stream.regime.is_two_phase() {
            stream.saturation.map(|s| s.quality(h_mean).clamp(0.0, 1.0))
        } else {
            None
        };
        let wetted = channel.heated_perimeter * length;
        let g = channel.mass_flux(m);
        let cond = Conditions {
            bulk: &bulk,
            saturation: stream.saturation,
            quality,
            mass_flux: g,
            heat_flux: if wetted > 0.0 { q.abs() / wetted } else { 0.0 },
            p_crit: stream.p_crit,
            heating: q > 0.0,
        };
        let c = correlations::evaluate(channel, stream.regime, &cond, warnings)?;

        let dp = if self.mode.includes_friction() {
            let rho = bulk.d;
            let friction = c.f * length / channel.hydraulic_diameter * g * g / (2.0 * rho);
            let acceleration = g * g * (1.0 / outlet.d() - 1.0 / inlet.d());
            let gravity = rho * config.gravity * length * channel.inclination.sin();
            friction + acceleration + gravity
        } else {
            0.0
        };
        Ok((
            SideSolution {
                outlet,
                alpha: if self.mode.includes_heat() { c.alpha } else { 0.0 },
                f: c.f,
                reynolds: c.reynolds,
                dp,
            },
            bulk.t,
        ))
    }
}

/// `1 / (m cp)`, zero where the capacity rate is unbounded (inside the dome).
fn inverse_capacity(state: &FlowState) -> f64 {
    match state.properties().cp {
        Some(cp) if cp > 0.0 && !state.phase().is_two_phase() => 1.0 / (state.m() * cp),
        _ => 0.0,
    }
}

fn lmtd_or_sign_change(dt_a: f64, dt_b: f64, config: &Config) -> ComponentResult<f64> {
    log_mean(dt_a, dt_b, config.tol_rel).ok_or(ComponentError::DrivingDeltaTSignChange { dt_a, dt_b })
}
