//! CoolProp-based property backend.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};

use rfluids::io::{FluidInputPair, FluidParam, FluidTrivialParam, Phase};
use rfluids::native::{AbstractState, CoolPropError};
use tc_core::FluidPhase;

use crate::backend::PropertyBackend;
use crate::error::{FluidError, FluidResult, classify_backend_message};
use crate::fluid::Fluid;
use crate::input_pair::InputPair;
use crate::properties::{CriticalPoint, Properties};

/// Default CoolProp backend name (Helmholtz-energy equations of state).
pub const DEFAULT_BACKEND: &str = "HEOS";

/// One native state handle plus the constants read once at creation.
struct Handle {
    state: AbstractState,
    critical: CriticalPoint,
    molar_mass: f64,
}

/// CoolProp backend over rfluids' native `AbstractState`.
///
/// Handles are created lazily, one per fluid name, each behind its own
/// mutex. The map lock is held only to look a handle up, so calls on
/// different fluids do not wait on each other.
pub struct CoolPropBackend {
    backend: String,
    handles: Mutex<HashMap<String, Arc<Mutex<Handle>>>>,
}

impl CoolPropBackend {
    pub fn new() -> Self {
        Self::with_backend(DEFAULT_BACKEND)
    }

    /// Use a specific CoolProp backend (`"HEOS"`, `"BICUBIC&HEOS"`, ...).
    pub fn with_backend(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, fluid: &Fluid) -> FluidResult<Arc<Mutex<Handle>>> {
        let mut handles = self.handles.lock().map_err(|_| poisoned())?;
        match handles.entry(fluid.name().to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let handle = Arc::new(Mutex::new(self.open(fluid)?));
                Ok(Arc::clone(entry.insert(handle)))
            }
        }
    }

    fn with_handle<R>(
        &self,
        fluid: &Fluid,
        f: impl FnOnce(&mut Handle) -> FluidResult<R>,
    ) -> FluidResult<R> {
        let handle = self.handle(fluid)?;
        let mut guard = handle.lock().map_err(|_| poisoned())?;
        f(&mut guard)
    }

    fn open(&self, fluid: &Fluid) -> FluidResult<Handle> {
        let state = AbstractState::new(self.backend.as_str(), fluid.name())
            .map_err(|e| native_error(fluid, "create state", e))?;
        let trivial = |param: FluidTrivialParam| {
            state
                .keyed_output(param)
                .map_err(|e| native_error(fluid, "read constant", e))
        };
        let critical = CriticalPoint {
            t: trivial(FluidTrivialParam::TCritical)?,
            p: trivial(FluidTrivialParam::PCritical)?,
            d: trivial(FluidTrivialParam::DMassCritical)?,
        };
        let molar_mass = trivial(FluidTrivialParam::MolarMass)?;
        tracing::debug!(fluid = %fluid, backend = %self.backend, "opened CoolProp state");
        Ok(Handle {
            state,
            critical,
            molar_mass,
        })
    }
}

impl Default for CoolPropBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBackend for CoolPropBackend {
    fn name(&self) -> &str {
        &self.backend
    }

    fn is_reentrant(&self) -> bool {
        true
    }

    fn honors_phase_hint(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
        imposed: FluidPhase,
    ) -> FluidResult<Properties> {
        let context = || format!("{pair}({v1}, {v2})");
        self.with_handle(fluid, |handle| {
            let Some(phase) = native_phase(imposed) else {
                return flash(handle, fluid, pair, v1, v2);
            };
            handle
                .state
                .specify_phase(phase)
                .map_err(|e| native_error(fluid, &format!("impose {imposed}"), e))?;
            let pinned = flash(handle, fluid, pair, v1, v2);
            handle.state.unspecify_phase();
            match pinned {
                Ok(props) => Ok(props),
                // States on a saturation line can fail a pinned flash; the
                // adapter checks the free result against the imposed phase.
                Err(err) => {
                    tracing::debug!(
                        fluid = %fluid,
                        input = %context(),
                        %imposed,
                        error = %err,
                        "pinned flash failed, retrying free"
                    );
                    flash(handle, fluid, pair, v1, v2)
                }
            }
        })
    }

    fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
        self.with_handle(fluid, |handle| Ok(handle.critical))
    }

    fn fork(&self) -> Arc<dyn PropertyBackend> {
        Arc::new(Self::with_backend(self.backend.clone()))
    }
}

/// Update the handle and read every property at the new state.
fn flash(
    handle: &mut Handle,
    fluid: &Fluid,
    pair: InputPair,
    v1: f64,
    v2: f64,
) -> FluidResult<Properties> {
    let context = || format!("{pair}({v1}, {v2})");
    handle
        .state
        .update(native_pair(pair), v1, v2)
        .map_err(|e| native_error(fluid, &context(), e))?;

    let state = &handle.state;
    let read = |param: FluidParam| {
        state
            .keyed_output(param)
            .map_err(|e| native_error(fluid, &context(), e))
    };
    let p = read(FluidParam::P)?;
    let t = read(FluidParam::T)?;
    let d = read(FluidParam::DMass)?;
    let q = state
        .keyed_output(FluidParam::Q)
        .ok()
        .filter(|q| (0.0..=1.0).contains(q));

    Ok(Properties {
        p,
        t,
        h: read(FluidParam::HMass)?,
        s: read(FluidParam::SMass)?,
        d,
        u: read(FluidParam::UMass)?,
        q,
        phase: classify_phase(t, p, d, q, &handle.critical),
        viscosity: state.keyed_output(FluidParam::DynamicViscosity).ok(),
        conductivity: state.keyed_output(FluidParam::Conductivity).ok(),
        cp: if q.is_some() {
            None
        } else {
            state.keyed_output(FluidParam::CpMass).ok()
        },
        molar_mass: handle.molar_mass,
    })
}

fn poisoned() -> FluidError {
    FluidError::Backend {
        message: "CoolProp state lock poisoned".to_string(),
    }
}

/// CoolProp phase for an imposed phase; `None` leaves the flash free.
fn native_phase(imposed: FluidPhase) -> Option<Phase> {
    match imposed {
        FluidPhase::Liquid => Some(Phase::Liquid),
        FluidPhase::Gas => Some(Phase::Gas),
        FluidPhase::TwoPhase => Some(Phase::TwoPhase),
        FluidPhase::Supercritical => Some(Phase::Supercritical),
        FluidPhase::SupercriticalGas => Some(Phase::SupercriticalGas),
        FluidPhase::SupercriticalLiquid => Some(Phase::SupercriticalLiquid),
        FluidPhase::CriticalPoint => Some(Phase::CriticalPoint),
        FluidPhase::Unknown | FluidPhase::NotImposed => None,
    }
}

fn native_error(fluid: &Fluid, context: &str, err: CoolPropError) -> FluidError {
    classify_backend_message(&format!("{fluid} {context}: {err}"))
}

/// Phase from quality and the critical constants.
fn classify_phase(t: f64, p: f64, d: f64, q: Option<f64>, critical: &CriticalPoint) -> FluidPhase {
    if q.is_some() {
        return FluidPhase::TwoPhase;
    }
    let near = |a: f64, b: f64| (a - b).abs() <= 1e-9 * b.abs();
    if near(t, critical.t) && near(p, critical.p) {
        return FluidPhase::CriticalPoint;
    }
    match (t > critical.t, p > critical.p) {
        (true, true) => FluidPhase::Supercritical,
        (true, false) => FluidPhase::SupercriticalGas,
        (false, true) => FluidPhase::SupercriticalLiquid,
        (false, false) if d > critical.d => FluidPhase::Liquid,
        (false, false) => FluidPhase::Gas,
    }
}

fn native_pair(pair: InputPair) -> FluidInputPair {
    use FluidInputPair as N;
    match pair {
        InputPair::QT => N::QT,
        InputPair::PQ => N::PQ,
        InputPair::QSmolar => N::QSMolar,
        InputPair::QSmass => N::QSMass,
        InputPair::HmolarQ => N::HMolarQ,
        InputPair::HmassQ => N::HMassQ,
        InputPair::DmolarQ => N::DMolarQ,
        InputPair::DmassQ => N::DMassQ,
        InputPair::PT => N::PT,
        InputPair::DmassT => N::DMassT,
        InputPair::DmolarT => N::DMolarT,
        InputPair::HmolarT => N::HMolarT,
        InputPair::HmassT => N::HMassT,
        InputPair::SmolarT => N::SMolarT,
        InputPair::SmassT => N::SMassT,
        InputPair::TUmolar => N::TUMolar,
        InputPair::TUmass => N::TUMass,
        InputPair::DmassP => N::DMassP,
        InputPair::DmolarP => N::DMolarP,
        InputPair::HmassP => N::HMassP,
        InputPair::HmolarP => N::HMolarP,
        InputPair::PSmass => N::PSMass,
        InputPair::PSmolar => N::PSMolar,
        InputPair::PUmass => N::PUMass,
        InputPair::PUmolar => N::PUMolar,
        InputPair::HmassSmass => N::HMassSMass,
        InputPair::HmolarSmolar => N::HMolarSMolar,
        InputPair::SmassUmass => N::SMassUMass,
        InputPair::SmolarUmolar => N::SMolarUMolar,
        InputPair::DmassHmass => N::DMassHMass,
        InputPair::DmolarHmolar => N::DMolarHMolar,
        InputPair::DmassSmass => N::DMassSMass,
        InputPair::DmolarSmolar => N::DMolarSMolar,
        InputPair::DmassUmass => N::DMassUMass,
        InputPair::DmolarUmolar => N::DMolarUMolar,
    }
}
