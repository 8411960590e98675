//! Moving-boundary heat-exchanger discretization.
//!
//! The duty axis is split into regions at every saturation (and
//! pseudo-critical) crossing of either stream, each region is divided into
//! cells, and the cells are solved in primary flow order. Design variables
//! other than the duty are met by an outer scalar solve on the duty.

mod design;
mod march;
mod regions;
mod single;

use tc_core::units::{Length, Temperature};
use tc_core::{Config, ErrorKind, FlowSense, TransferMode};
use tc_fluids::{FlowState, PropertyAdapter};

use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, Wall};
use crate::unit_cell::CellSolution;
use crate::warning::Warning;

pub use regions::Region;
pub use single::{HeatLoss, SingleStreamSolution, march_single};

use march::{MarchSetup, march};
use regions::{Line, Profile, boundaries, cell_edges};

/// How many cells each region gets.
#[derive(Clone, Debug, PartialEq)]
pub enum CellPolicy {
    /// `n` cells shared by duty fraction, each region at least
    /// `cells_per_region`.
    Uniform(usize),
    /// Explicit counts, in region order from the primary inlet.
    PerRegion(Vec<usize>),
    /// Sized by `div_t` (single-phase) and `div_x` (two-phase).
    Adaptive,
}

impl Default for CellPolicy {
    fn default() -> Self {
        CellPolicy::Uniform(10)
    }
}

/// The quantity that fixes an exchanger's duty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Design {
    /// Duty into the primary [W].
    HeatDuty(f64),
    Effectiveness(f64),
    OutletTemperature { role: tc_core::FluidRole, t: Temperature },
    OutletEnthalpy { role: tc_core::FluidRole, h: f64 },
    OutletQuality { role: tc_core::FluidRole, x: f64 },
    /// Minimum driving temperature difference [K].
    PinchDeltaT(f64),
    /// Overall conductance [W/K].
    Conductance(f64),
    Length(Length),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Unsolved,
    Discretized,
    Converged,
    Failed(ErrorKind),
}

/// Result of a two-stream exchanger solve.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangerSolution {
    pub primary_outlet: FlowState,
    pub secondary_outlet: FlowState,
    /// Duty into the primary [W]
    pub q: f64,
    pub length: f64,
    /// Primary heat-transfer area [m^2]
    pub area: f64,
    pub ua: f64,
    /// Smallest driving dT over all cell ends [K]
    pub pinch: f64,
    /// Duty coordinate of the pinch, from the primary inlet [W]
    pub pinch_location: f64,
    pub dp_primary: f64,
    pub dp_secondary: f64,
    pub regions: Vec<Region>,
    pub cells: Vec<CellSolution>,
    pub warnings: Vec<Warning>,
}

/// Two-stream exchanger geometry and discretization settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretizer {
    pub primary_channel: Channel,
    pub secondary_channel: Channel,
    pub sense: FlowSense,
    pub wall: Wall,
    pub mode: TransferMode,
    pub policy: CellPolicy,
    status: Status,
}

impl Discretizer {
    pub fn new(primary_channel: Channel, secondary_channel: Channel, sense: FlowSense) -> Self {
        Self {
            primary_channel,
            secondary_channel,
            sense,
            wall: Wall::default(),
            mode: TransferMode::All,
            policy: CellPolicy::default(),
            status: Status::Unsolved,
        }
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.wall = wall;
        self
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: CellPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn validate(&self) -> ComponentResult<()> {
        self.primary_channel.validate()?;
        self.secondary_channel.validate()?;
        self.wall.validate()?;
        if self.sense == FlowSense::Undefined {
            return Err(ComponentError::InvalidArg {
                what: "exchanger flow sense must be defined",
            });
        }
        if !self.mode.includes_heat() {
            return Err(ComponentError::InvalidArg {
                what: "exchanger transfer mode must include heat",
            });
        }
        match &self.policy {
            CellPolicy::Uniform(0) => Err(ComponentError::InvalidArg {
                what: "uniform cell count must be nonzero",
            }),
            CellPolicy::PerRegion(counts) if counts.contains(&0) => Err(ComponentError::InvalidArg {
                what: "per-region cell counts must be nonzero",
            }),
            _ => Ok(()),
        }
    }

    /// Solve for the duty that meets `design`, then rate at that duty.
    pub fn solve(
        &mut self,
        adapter: &PropertyAdapter,
        config: &Config,
        primary: &FlowState,
        secondary: &FlowState,
        design: Design,
    ) -> ComponentResult<ExchangerSolution> {
        self.status = Status::Unsolved;
        self.validate()?;
        self.status = Status::Discretized;
        match design::solve(self, adapter, config, primary, secondary, design) {
            Ok(solution) => {
                self.status = Status::Converged;
                Ok(solution)
            }
            Err(err) => {
                self.status = Status::Failed(err.kind());
                Err(err)
            }
        }
    }

    /// Rate the exchanger at duty `q`, retrying once with doubled cell
    /// counts when a cell fails.
    pub fn rate(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        primary: &FlowState,
        secondary: &FlowState,
        q: f64,
    ) -> ComponentResult<ExchangerSolution> {
        match self.rate_once(adapter, config, primary, secondary, q, 1) {
            Err(err) if err.is_refinable() => {
                tracing::warn!(error = %err, "cell failure, retrying with refined cells");
                let mut solution = self.rate_once(adapter, config, primary, secondary, q, 2)?;
                let cells = solution.cells.len();
                Warning::push_unique(&mut solution.warnings, Warning::RefinedRetry { cells });
                Ok(solution)
            }
            other => other,
        }
    }

    fn lines(
        &self,
        adapter: &PropertyAdapter,
        primary: &FlowState,
        secondary: &FlowState,
        q: f64,
    ) -> ComponentResult<(Line, Line)> {
        let line = |state: &FlowState, dh: f64, reversed: bool| {
            let critical = adapter.critical_point(state.fluid()).ok();
            Line {
                fluid: state.fluid().clone(),
                h_in: state.h(),
                p_in: state.p().value,
                p_out: state.p().value,
                dh,
                reversed,
                heating: dh > 0.0,
                p_crit: critical.map(|c| c.p),
                t_crit: critical.map(|c| c.t),
            }
        };
        let m_p = primary.m();
        let m_s = secondary.m();
        if m_p <= 0.0 || m_s <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "exchanger streams need positive mass flows",
            });
        }
        let reversed = self.sense != FlowSense::Parallelflow;
        Ok((line(primary, q / m_p, false), line(secondary, -q / m_s, reversed)))
    }

    /// Boundary temperature profile at duty `q` from the energy balance only.
    pub(crate) fn profile(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        primary: &FlowState,
        secondary: &FlowState,
        q: f64,
    ) -> ComponentResult<Profile> {
        let (lp, ls) = self.lines(adapter, primary, secondary, q)?;
        let regions = regions::regions(adapter, config, &lp, Some(&ls), q, &self.policy, 1)?;
        Profile::build(adapter, &lp, &ls, &boundaries(&regions), q)
    }

    fn port_loss(
        &self,
        adapter: &PropertyAdapter,
        state: &FlowState,
        channel: &Channel,
        factor: f64,
    ) -> ComponentResult<FlowState> {
        match channel.port_mass_flux(state.m()) {
            Some(g) if self.mode.includes_friction() && factor != 0.0 => {
                let dp = factor * g * g / (2.0 * state.d());
                Ok(state.at_ph(adapter, state.p().value - dp, state.h())?)
            }
            _ => Ok(state.clone()),
        }
    }

    fn rate_once(
        &self,
        adapter: &PropertyAdapter,
        config: &Config,
        primary: &FlowState,
        secondary: &FlowState,
        q: f64,
        refine: usize,
    ) -> ComponentResult<ExchangerSolution> {
        let mut warnings = Vec::new();
        if self.sense == FlowSense::Crossflow {
            Warning::push_unique(&mut warnings, Warning::CrossflowAsCounterflow);
        }
        if q == 0.0 {
            return Ok(ExchangerSolution {
                primary_outlet: primary.clone(),
                secondary_outlet: secondary.clone(),
                q: 0.0,
                length: 0.0,
                area: 0.0,
                ua: 0.0,
                pinch: f64::INFINITY,
                pinch_location: 0.0,
                dp_primary: 0.0,
                dp_secondary: 0.0,
                regions: Vec::new(),
                cells: Vec::new(),
                warnings,
            });
        }

        let p_in = self.port_loss(adapter, primary, &self.primary_channel, config.dp_port_in_factor)?;
        let s_in = self.port_loss(adapter, secondary, &self.secondary_channel, config.dp_port_in_factor)?;
        let (mut lp, mut ls) = self.lines(adapter, &p_in, &s_in, q)?;
        let mut repassed = false;
        let (regions, cells) = loop {
            let regions = regions::regions(adapter, config, &lp, Some(&ls), q, &self.policy, refine)?;
            let profile = Profile::build(adapter, &lp, &ls, &boundaries(&regions), q)?;
            let (pinch, at) = profile.pinch();
            if pinch <= 0.0 || pinch < config.pinch_floor {
                return Err(ComponentError::InfeasibleGeometry {
                    cell: at.saturating_sub(1),
                    location: profile.taus[at] * q,
                    min_delta_t: pinch,
                });
            }

            let setup = MarchSetup {
                adapter,
                config,
                primary: &p_in,
                secondary: &s_in,
                primary_channel: &self.primary_channel,
                secondary_channel: &self.secondary_channel,
                sense: self.sense,
                wall: self.wall,
                mode: self.mode,
                q_total: q,
                primary_line: &lp,
                secondary_line: &ls,
            };
            let cells = march(&setup, &regions)?;
            let (p_out, s_out) = outlets(&cells, ls.reversed)?;
            let (p_out, s_out) = (p_out.p().value, s_out.p().value);
            let deviation = ((p_out - lp.p_out).abs() / lp.p_in).max((s_out - ls.p_out).abs() / ls.p_in);
            if !repassed && deviation > config.eps_p {
                tracing::trace!(deviation, "recomputing breakpoints from the pressure profile");
                lp.p_out = p_out;
                ls.p_out = s_out;
                repassed = true;
                continue;
            }
            break (regions, cells);
        };

        let (p_out, s_out) = outlets(&cells, ls.reversed)?;
        let primary_outlet = self.port_loss(adapter, p_out, &self.primary_channel, config.dp_port_out_factor)?;
        let secondary_outlet =
            self.port_loss(adapter, s_out, &self.secondary_channel, config.dp_port_out_factor)?;

        let edges = cell_edges(&regions);
        let (mut pinch, mut pinch_location) = (f64::INFINITY, 0.0);
        for (cell, edge) in cells.iter().zip(&edges) {
            if let Some((a, b)) = cell.dt_ends {
                let sign = q.signum();
                for (dt, tau) in [(sign * a, edge.0), (sign * b, edge.1)] {
                    if dt < pinch {
                        pinch = dt;
                        pinch_location = tau * q;
                    }
                }
            }
            for w in &cell.warnings {
                Warning::push_unique(&mut warnings, w.clone());
            }
        }

        Ok(ExchangerSolution {
            dp_primary: primary.p().value - primary_outlet.p().value,
            dp_secondary: secondary.p().value - secondary_outlet.p().value,
            primary_outlet,
            secondary_outlet,
            q: cells.iter().map(|c| c.q).sum(),
            length: cells.iter().map(|c| c.length).sum(),
            area: cells.iter().map(|c| c.area).sum(),
            ua: cells.iter().map(|c| c.ua).sum(),
            pinch,
            pinch_location,
            regions,
            cells,
            warnings,
        })
    }
}

/// Primary outlet (last cell) and secondary outlet (first cell when the
/// secondary runs against the primary, last otherwise).
fn outlets(cells: &[CellSolution], secondary_reversed: bool) -> ComponentResult<(&FlowState, &FlowState)> {
    let missing = ComponentError::NotConverged {
        what: "exchanger march produced no cells",
        iterations: 0,
        residual: f64::NAN,
    };
    let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
        return Err(missing);
    };
    let cell = if secondary_reversed { first } else { last };
    let secondary = cell.secondary.as_ref().ok_or(missing)?;
    Ok((&last.primary.outlet, &secondary.outlet))
}
