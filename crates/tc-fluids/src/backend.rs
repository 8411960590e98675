//! The property backend seam.

use std::sync::Arc;

use tc_core::FluidPhase;

use crate::error::FluidResult;
use crate::fluid::Fluid;
use crate::input_pair::InputPair;
use crate::properties::{CriticalPoint, Properties, Saturation};

/// A source of thermophysical properties.
///
/// Implementations must be usable from any thread; those that cannot run two
/// calls at once report `is_reentrant() == false` and the
/// [`PropertyAdapter`](crate::PropertyAdapter) serializes calls into them.
pub trait PropertyBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether concurrent calls are safe without external locking.
    fn is_reentrant(&self) -> bool;

    /// Whether `evaluate` uses the imposed phase to steer the flash.
    fn honors_phase_hint(&self) -> bool {
        false
    }

    /// Evaluate the state fixed by `pair` and its two values.
    ///
    /// `imposed` is a hint only; callers validate the observed phase.
    fn evaluate(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
        imposed: FluidPhase,
    ) -> FluidResult<Properties>;

    fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint>;

    /// Saturated liquid and vapour at `p`, or `None` at and above the critical
    /// pressure.
    fn saturation(&self, fluid: &Fluid, p: f64) -> FluidResult<Option<Saturation>> {
        let critical = self.critical_point(fluid)?;
        if p >= critical.p {
            return Ok(None);
        }
        let liquid = self.evaluate(fluid, InputPair::PQ, p, 0.0, FluidPhase::NotImposed)?;
        let vapour = self.evaluate(fluid, InputPair::PQ, p, 1.0, FluidPhase::NotImposed)?;
        Ok(Some(Saturation { liquid, vapour }))
    }

    /// A fresh instance with no state shared with `self`, for use on
    /// another thread.
    fn fork(&self) -> Arc<dyn PropertyBackend>;
}
