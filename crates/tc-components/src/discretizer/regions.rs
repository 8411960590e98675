//! Region detection and cell allocation on the duty axis.
//!
//! Positions along an exchanger are duty fractions `tau in [0, 1]` measured
//! from the primary inlet. Each stream is described by a [`Line`] that maps
//! a duty fraction to the stream's enthalpy and pressure estimate.

use tc_core::{Config, UnitPhase, lerp};
use tc_fluids::{Fluid, InputPair, PropertyAdapter};

use super::CellPolicy;
use crate::error::ComponentResult;

/// One stream's enthalpy and pressure along the duty axis.
#[derive(Clone, Debug)]
pub(crate) struct Line {
    pub fluid: Fluid,
    pub h_in: f64,
    pub p_in: f64,
    /// Pressure estimate at the stream's outlet
    pub p_out: f64,
    /// Enthalpy change over the whole exchanger [J/kg]
    pub dh: f64,
    /// The stream enters at `tau = 1` (counterflow secondary).
    pub reversed: bool,
    /// The stream is being heated.
    pub heating: bool,
    pub p_crit: Option<f64>,
    pub t_crit: Option<f64>,
}

impl Line {
    fn progress(&self, tau: f64) -> f64 {
        if self.reversed { 1.0 - tau } else { tau }
    }

    pub fn h(&self, tau: f64) -> f64 {
        self.h_in + self.progress(tau) * self.dh
    }

    pub fn p(&self, tau: f64) -> f64 {
        lerp(self.p_in, self.p_out, self.progress(tau))
    }

    /// Duty fraction where the stream reaches `h`.
    fn tau_at(&self, h: f64) -> Option<f64> {
        if self.dh == 0.0 {
            return None;
        }
        let s = (h - self.h_in) / self.dh;
        Some(if self.reversed { 1.0 - s } else { s })
    }

    /// Temperature at `tau`, flashed in the phase of the surrounding regime.
    pub fn temperature(
        &self,
        adapter: &PropertyAdapter,
        tau: f64,
        regime: UnitPhase,
    ) -> ComponentResult<f64> {
        let props = adapter.evaluate_with_phase(
            &self.fluid,
            InputPair::HmassP,
            self.h(tau),
            self.p(tau),
            regime.imposed_phase(),
        )?;
        Ok(props.t)
    }

    pub fn regime(&self, adapter: &PropertyAdapter, tau: f64) -> ComponentResult<UnitPhase> {
        let props = adapter.evaluate(&self.fluid, InputPair::HmassP, self.h(tau), self.p(tau))?;
        Ok(UnitPhase::from_phase(props.phase, self.heating))
    }

    /// Duty fractions where this stream changes regime: saturated liquid and
    /// vapour (refined once for the local pressure) and, above the critical
    /// pressure, the critical temperature.
    fn breakpoints(&self, adapter: &PropertyAdapter, out: &mut Vec<f64>) -> ComponentResult<()> {
        if self.dh == 0.0 {
            return Ok(());
        }
        for vapour in [false, true] {
            let sat_h = |p: f64| -> ComponentResult<Option<f64>> {
                Ok(adapter
                    .saturation(&self.fluid, p)?
                    .map(|s| if vapour { s.vapour.h } else { s.liquid.h }))
            };
            let Some(h_b) = sat_h(self.p_in)? else {
                continue;
            };
            let Some(mut tau) = self.tau_at(h_b) else {
                continue;
            };
            if self.p_out != self.p_in && (0.0..=1.0).contains(&tau) {
                for _ in 0..2 {
                    match sat_h(self.p(tau))?.and_then(|h| self.tau_at(h)) {
                        Some(t) => tau = t,
                        None => break,
                    }
                }
            }
            out.push(tau);
        }
        if let (Some(p_crit), Some(t_crit)) = (self.p_crit, self.t_crit) {
            if self.p_in.min(self.p_out) >= p_crit {
                let h_c = adapter
                    .evaluate(&self.fluid, InputPair::PT, self.p_in, t_crit)?
                    .h;
                if let Some(tau) = self.tau_at(h_c) {
                    out.push(tau);
                }
            }
        }
        Ok(())
    }
}

/// A duty interval with one regime per stream.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Duty fraction at the region's primary-inlet end
    pub start: f64,
    pub end: f64,
    pub primary: UnitPhase,
    pub secondary: Option<UnitPhase>,
    pub cells: usize,
}

impl Region {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Regions of a stream pair for a given total duty, cells allocated.
pub(crate) fn regions(
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &Line,
    secondary: Option<&Line>,
    q_total: f64,
    policy: &CellPolicy,
    refine: usize,
) -> ComponentResult<Vec<Region>> {
    let mut taus = Vec::new();
    primary.breakpoints(adapter, &mut taus)?;
    if let Some(sec) = secondary {
        sec.breakpoints(adapter, &mut taus)?;
    }
    let tol = (config.tol_abs_x / q_total.abs().max(f64::MIN_POSITIVE)).max(config.tol_rel);
    let edges = collapse(taus, tol);

    let mut regions = Vec::with_capacity(edges.len() - 1);
    for pair in edges.windows(2) {
        let mid = 0.5 * (pair[0] + pair[1]);
        regions.push(Region {
            start: pair[0],
            end: pair[1],
            primary: primary.regime(adapter, mid)?,
            secondary: secondary.map(|s| s.regime(adapter, mid)).transpose()?,
            cells: 0,
        });
    }
    allocate(adapter, config, primary, secondary, &mut regions, policy, refine)?;
    tracing::trace!(
        regions = regions.len(),
        cells = regions.iter().map(|r| r.cells).sum::<usize>(),
        "discretized duty axis"
    );
    Ok(regions)
}

/// Sorted region edges `[0, .., 1]` with interior points closer than `tol`
/// to each other or to an end dropped.
fn collapse(mut taus: Vec<f64>, tol: f64) -> Vec<f64> {
    taus.retain(|t| t.is_finite() && *t > tol && *t < 1.0 - tol);
    taus.sort_by(f64::total_cmp);
    let mut edges = vec![0.0];
    for t in taus {
        if let Some(last) = edges.last() {
            if t - last > tol {
                edges.push(t);
            }
        }
    }
    edges.push(1.0);
    edges
}

fn allocate(
    adapter: &PropertyAdapter,
    config: &Config,
    primary: &Line,
    secondary: Option<&Line>,
    regions: &mut [Region],
    policy: &CellPolicy,
    refine: usize,
) -> ComponentResult<()> {
    let floor = config.cells_per_region.max(1);
    let refine = refine.max(1);
    match policy {
        CellPolicy::Uniform(n) => {
            let n = (n * refine) as f64;
            for region in regions.iter_mut() {
                let share = (n * region.width()).round() as usize;
                region.cells = share.max(floor);
            }
        }
        CellPolicy::PerRegion(counts) => {
            for (i, region) in regions.iter_mut().enumerate() {
                let count = counts.get(i).copied().unwrap_or(floor);
                region.cells = count.max(1) * refine;
            }
        }
        CellPolicy::Adaptive => {
            for region in regions.iter_mut() {
                let mut needed = floor;
                let mut lines = vec![(primary, region.primary)];
                if let (Some(line), Some(regime)) = (secondary, region.secondary) {
                    lines.push((line, regime));
                }
                for (line, regime) in lines {
                    let count = if regime.is_two_phase() {
                        let h_fg = adapter
                            .saturation(&line.fluid, line.p(region.start))?
                            .map(|s| s.h_fg());
                        match h_fg {
                            Some(h_fg) if h_fg > 0.0 => {
                                let dx = (line.h(region.end) - line.h(region.start)).abs() / h_fg;
                                (dx / config.div_x).ceil() as usize
                            }
                            _ => floor,
                        }
                    } else {
                        let dt = (line.temperature(adapter, region.end, regime)?
                            - line.temperature(adapter, region.start, regime)?)
                        .abs();
                        (dt / config.div_t).ceil() as usize
                    };
                    needed = needed.max(count);
                }
                region.cells = needed * refine;
            }
        }
    }
    cap(regions, config.max_cells);
    Ok(())
}

/// Trim the largest regions until the total fits `max_cells`, keeping one
/// cell per region.
fn cap(regions: &mut [Region], max_cells: usize) {
    let max_cells = max_cells.max(regions.len());
    let mut total: usize = regions.iter().map(|r| r.cells).sum();
    while total > max_cells {
        let Some(largest) = regions.iter_mut().max_by_key(|r| r.cells) else {
            return;
        };
        if largest.cells <= 1 {
            return;
        }
        largest.cells -= 1;
        total -= 1;
    }
}

/// Cell boundaries in duty fractions, with the regimes of each cell.
pub(crate) fn cell_edges(regions: &[Region]) -> Vec<(f64, f64, UnitPhase, Option<UnitPhase>)> {
    let mut cells = Vec::new();
    for region in regions {
        let n = region.cells.max(1);
        for i in 0..n {
            let a = lerp(region.start, region.end, i as f64 / n as f64);
            let b = if i + 1 == n {
                region.end
            } else {
                lerp(region.start, region.end, (i + 1) as f64 / n as f64)
            };
            cells.push((a, b, region.primary, region.secondary));
        }
    }
    cells
}

/// Cell boundaries with the regimes of the cell starting there; the closing
/// boundary at `tau = 1` carries the last cell's regimes.
pub(crate) fn boundaries(regions: &[Region]) -> Vec<(f64, UnitPhase, Option<UnitPhase>)> {
    let cells = cell_edges(regions);
    let mut points: Vec<_> = cells.iter().map(|c| (c.0, c.2, c.3)).collect();
    if let Some(last) = cells.last() {
        points.push((last.1, last.2, last.3));
    }
    points
}

/// Temperature profile at cell boundaries from the energy balance alone.
#[derive(Clone, Debug)]
pub(crate) struct Profile {
    pub taus: Vec<f64>,
    /// `sign(Q) (T_secondary - T_primary)` at each boundary
    pub driving: Vec<f64>,
}

impl Profile {
    pub fn build(
        adapter: &PropertyAdapter,
        primary: &Line,
        secondary: &Line,
        points: &[(f64, UnitPhase, Option<UnitPhase>)],
        q_total: f64,
    ) -> ComponentResult<Self> {
        let sign = if q_total < 0.0 { -1.0 } else { 1.0 };
        let driving = points
            .iter()
            .map(|&(tau, regime, secondary_regime)| {
                let secondary_regime = secondary_regime.unwrap_or(UnitPhase::None);
                let t_s = secondary.temperature(adapter, tau, secondary_regime)?;
                Ok(sign * (t_s - primary.temperature(adapter, tau, regime)?))
            })
            .collect::<ComponentResult<Vec<_>>>()?;
        let taus = points.iter().map(|p| p.0).collect();
        Ok(Self { taus, driving })
    }

    /// Smallest driving dT and its boundary index.
    pub fn pinch(&self) -> (f64, usize) {
        self.driving
            .iter()
            .copied()
            .enumerate()
            .fold((f64::INFINITY, 0), |(min, at), (i, dt)| {
                if dt < min { (dt, i) } else { (min, at) }
            })
    }
}
