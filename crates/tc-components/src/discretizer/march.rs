//! Cell-by-cell solution of a two-stream exchanger at a fixed duty.

use tc_core::{Config, FlowSense, TransferMode, UnitPhase};
use tc_fluids::{FlowState, PropertyAdapter, Saturation};

use super::regions::{Line, cell_edges};
use super::Region;
use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, Wall};
use crate::unit_cell::{CellSolution, CellStream, Closure, Counterpart, UnitCell};

/// Everything the march needs besides the regions.
pub(crate) struct MarchSetup<'a> {
    pub adapter: &'a PropertyAdapter,
    pub config: &'a Config,
    pub primary: &'a FlowState,
    pub secondary: &'a FlowState,
    pub primary_channel: &'a Channel,
    pub secondary_channel: &'a Channel,
    pub sense: FlowSense,
    pub wall: Wall,
    pub mode: TransferMode,
    pub q_total: f64,
    pub primary_line: &'a Line,
    pub secondary_line: &'a Line,
}

fn saturation_for(
    adapter: &PropertyAdapter,
    state: &FlowState,
    regime: UnitPhase,
) -> ComponentResult<Option<Saturation>> {
    if regime.is_two_phase() {
        Ok(adapter.saturation(state.fluid(), state.p().value)?)
    } else {
        Ok(None)
    }
}

/// Attach the cell index and duty location to a cell-level infeasibility.
fn locate(err: ComponentError, cell: usize, location: f64) -> ComponentError {
    match err {
        ComponentError::InfeasibleGeometry { min_delta_t, .. } => ComponentError::InfeasibleGeometry {
            cell,
            location,
            min_delta_t,
        },
        other => other,
    }
}

/// Solve every cell in primary flow order.
///
/// A counterflow secondary enters at the far end, so its pressures at the
/// cell boundaries are re-marched in its own flow direction after each pass
/// until they settle.
pub(crate) fn march(setup: &MarchSetup<'_>, regions: &[Region]) -> ComponentResult<Vec<CellSolution>> {
    let edges = cell_edges(regions);
    let n = edges.len();
    let p_s_in = setup.secondary.p().value;
    let uniform = vec![p_s_in; n + 1];
    if !(setup.secondary_line.reversed && setup.mode.includes_friction()) {
        return march_pass(setup, &edges, &uniform);
    }

    let config = setup.config;
    settle(uniform, p_s_in, config.max_iter_component, config.tol_rel, |p_sec| {
        let cells = march_pass(setup, &edges, p_sec)?;
        let mut next = vec![p_s_in; n + 1];
        for k in (0..n).rev() {
            let dp = cells[k].secondary.as_ref().map_or(0.0, |s| s.dp);
            next[k] = next[k + 1] - dp;
        }
        Ok((cells, next))
    })
}

/// Repeat `pass` on the boundary pressures it hands back until they move by
/// no more than `tol` relative to `scale`.
fn settle<T>(
    mut p: Vec<f64>,
    scale: f64,
    max_passes: usize,
    tol: f64,
    mut pass: impl FnMut(&[f64]) -> ComponentResult<(T, Vec<f64>)>,
) -> ComponentResult<T> {
    let mut change = f64::INFINITY;
    for iteration in 0..max_passes {
        let (out, next) = pass(&p)?;
        change = next
            .iter()
            .zip(&p)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
            / scale;
        p = next;
        tracing::trace!(pass = iteration, change, "secondary pressure re-march");
        if change <= tol {
            return Ok(out);
        }
    }
    tracing::debug!(passes = max_passes, change, "secondary pressures did not settle");
    Err(ComponentError::NotConverged {
        what: "secondary pressure re-march",
        iterations: max_passes,
        residual: change,
    })
}

/// One pass over the cells with the secondary's boundary pressures fixed.
fn march_pass(
    setup: &MarchSetup<'_>,
    edges: &[(f64, f64, UnitPhase, Option<UnitPhase>)],
    p_sec: &[f64],
) -> ComponentResult<Vec<CellSolution>> {
    let adapter = setup.adapter;
    let reversed = setup.secondary_line.reversed;
    let mut cells = Vec::with_capacity(edges.len());
    let mut primary_in = setup.primary.clone();
    let mut secondary_forward = setup.secondary.clone();
    for (k, &(tau0, tau1, primary_regime, secondary_regime)) in edges.iter().enumerate() {
        let q = (tau1 - tau0) * setup.q_total;
        let secondary_regime = secondary_regime.unwrap_or(UnitPhase::None);
        let secondary_in = if reversed {
            setup.secondary.at_ph_in(
                adapter,
                p_sec[k + 1],
                setup.secondary_line.h(tau1),
                secondary_regime.imposed_phase(),
            )?
        } else {
            secondary_forward.clone()
        };
        let sat_p = saturation_for(adapter, &primary_in, primary_regime)?;
        let sat_s = saturation_for(adapter, &secondary_in, secondary_regime)?;
        let cell = UnitCell {
            primary: CellStream {
                inlet: &primary_in,
                channel: setup.primary_channel,
                regime: primary_regime,
                saturation: sat_p.as_ref(),
                p_crit: setup.primary_line.p_crit,
            },
            counterpart: Counterpart::Stream {
                stream: CellStream {
                    inlet: &secondary_in,
                    channel: setup.secondary_channel,
                    regime: secondary_regime,
                    saturation: sat_s.as_ref(),
                    p_crit: setup.secondary_line.p_crit,
                },
                sense: setup.sense,
            },
            closure: Closure::Heat(q),
            mode: setup.mode,
            wall: setup.wall,
        };
        let solved = cell
            .solve(adapter, setup.config)
            .map_err(|e| locate(e, k, tau0 * setup.q_total))?;
        primary_in = solved.primary.outlet.clone();
        if let Some(sec) = &solved.secondary {
            secondary_forward = sec.outlet.clone();
        }
        cells.push(solved);
    }
    Ok(cells)
}
