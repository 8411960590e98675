//! Single-stream marching for pipes.

use tc_core::{Config, TransferMode, UnitPhase};
use tc_fluids::{FlowState, InputPair, PropertyAdapter};

use crate::error::{ComponentError, ComponentResult};
use crate::geometry::{Channel, Wall};
use crate::unit_cell::{CellSolution, CellStream, Closure, Counterpart, UnitCell};
use crate::warning::Warning;

/// Heat exchanged by a pipe with its surroundings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum HeatLoss {
    #[default]
    None,
    /// Prescribed duty into the stream [W], spread evenly over the length.
    Duty(f64),
    /// Surroundings at `t` [K] behind `ua_per_length` [W/(m K)].
    Ambient { t: f64, ua_per_length: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SingleStreamSolution {
    pub outlet: FlowState,
    /// Heat into the stream [W]
    pub q: f64,
    pub dp: f64,
    pub cells: Vec<CellSolution>,
    pub warnings: Vec<Warning>,
}

/// March `cells` equal-length cells along a pipe of `length`.
///
/// A cell failure that finer cells may cure is retried once with twice the
/// cells (up to `max_cells`).
#[allow(clippy::too_many_arguments)]
pub fn march_single(
    adapter: &PropertyAdapter,
    config: &Config,
    inlet: &FlowState,
    channel: &Channel,
    wall: Wall,
    mode: TransferMode,
    length: f64,
    cells: usize,
    heat: HeatLoss,
) -> ComponentResult<SingleStreamSolution> {
    if !(length.is_finite() && length > 0.0) {
        return Err(ComponentError::InvalidArg {
            what: "pipe length must be positive",
        });
    }
    let cells = cells.clamp(1, config.max_cells.max(1));
    let attempt = |n: usize| march(adapter, config, inlet, channel, wall, mode, length, n, heat);
    match attempt(cells) {
        Err(err) if err.is_refinable() => {
            let refined = (2 * cells).min(config.max_cells.max(1));
            tracing::warn!(error = %err, cells = refined, "pipe cell failure, retrying with refined cells");
            let mut solution = attempt(refined)?;
            Warning::push_unique(&mut solution.warnings, Warning::RefinedRetry { cells: refined });
            Ok(solution)
        }
        other => other,
    }
}

#[allow(clippy::too_many_arguments)]
fn march(
    adapter: &PropertyAdapter,
    config: &Config,
    inlet: &FlowState,
    channel: &Channel,
    wall: Wall,
    mode: TransferMode,
    length: f64,
    n: usize,
    heat: HeatLoss,
) -> ComponentResult<SingleStreamSolution> {
    let dl = length / n as f64;
    let p_crit = adapter.critical_point(inlet.fluid()).ok().map(|c| c.p);
    let mut state = inlet.clone();
    let mut solved = Vec::with_capacity(n);
    let mut warnings = Vec::new();

    for _ in 0..n {
        let (closure, counterpart, regime) = match heat {
            HeatLoss::None | HeatLoss::Duty(_) => {
                let q = match heat {
                    HeatLoss::Duty(q) => q / n as f64,
                    _ => 0.0,
                };
                let h_mid = state.h() + 0.5 * q / state.m().max(f64::MIN_POSITIVE);
                let mid = adapter.evaluate(state.fluid(), InputPair::HmassP, h_mid, state.p().value)?;
                (
                    Closure::HeatAndLength { q, length: dl },
                    Counterpart::None,
                    UnitPhase::from_phase(mid.phase, q > 0.0),
                )
            }
            HeatLoss::Ambient { t, ua_per_length } => (
                Closure::Length(dl),
                Counterpart::Ambient { t, ua_per_length },
                UnitPhase::from_phase(state.phase(), t > state.t().value),
            ),
        };
        let saturation = if regime.is_two_phase() {
            adapter.saturation(state.fluid(), state.p().value)?
        } else {
            None
        };
        let cell = UnitCell {
            primary: CellStream {
                inlet: &state,
                channel,
                regime,
                saturation: saturation.as_ref(),
                p_crit,
            },
            counterpart,
            closure,
            mode,
            wall,
        }
        .solve(adapter, config)?;
        for w in &cell.warnings {
            Warning::push_unique(&mut warnings, w.clone());
        }
        state = cell.primary.outlet.clone();
        solved.push(cell);
    }

    Ok(SingleStreamSolution {
        q: solved.iter().map(|c| c.q).sum(),
        dp: inlet.p().value - state.p().value,
        outlet: state,
        cells: solved,
        warnings,
    })
}
