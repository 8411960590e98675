//! Solving independent cycles on the rayon pool.

use rayon::prelude::*;

use crate::cycle::Cycle;
use crate::error::CycleResult;
use crate::report::CycleReport;

/// Run every cycle, in parallel, returning the results in input order.
///
/// A cycle whose adapter serializes its backend, or shares its backend with
/// an earlier cycle in the slice, is first given a forked backend of its own.
/// No two cycles then contend on one lock or one native state cache.
pub fn solve_parallel(cycles: &mut [Cycle]) -> Vec<CycleResult<CycleReport>> {
    for i in 0..cycles.len() {
        let (earlier, rest) = cycles.split_at_mut(i);
        let cycle = &mut rest[0];
        let shared = earlier
            .iter()
            .any(|c| c.adapter().shares_backend(cycle.adapter()));
        if shared || !cycle.adapter().is_thread_safe() {
            let forked = cycle.adapter().fork();
            cycle.set_adapter(forked);
        }
    }
    tracing::debug!(cycles = cycles.len(), "solving cycles in parallel");
    cycles.par_iter_mut().map(Cycle::run).collect()
}
