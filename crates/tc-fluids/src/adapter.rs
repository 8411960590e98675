//! The property adapter: the one place the workspace asks for properties.

use std::sync::{Arc, Mutex};

use tc_core::FluidPhase;

use crate::backend::PropertyBackend;
use crate::coolprop::CoolPropBackend;
use crate::error::{FluidError, FluidResult};
use crate::fluid::Fluid;
use crate::input_pair::InputPair;
use crate::perfect_gas::PerfectGasBackend;
use crate::properties::{CriticalPoint, Properties, Saturation};

/// Shared handle on a property backend.
///
/// Clones share the backend (and its lock, if any). Calls into a backend that
/// is not reentrant are serialized; reentrant backends are called directly.
#[derive(Clone)]
pub struct PropertyAdapter {
    backend: Arc<dyn PropertyBackend>,
    lock: Option<Arc<Mutex<()>>>,
}

impl PropertyAdapter {
    pub fn new(backend: Arc<dyn PropertyBackend>) -> Self {
        let lock = if backend.is_reentrant() {
            None
        } else {
            Some(Arc::new(Mutex::new(())))
        };
        Self { backend, lock }
    }

    /// CoolProp with its default (`HEOS`) backend.
    pub fn coolprop() -> Self {
        Self::new(Arc::new(CoolPropBackend::new()))
    }

    /// CoolProp with the backend name from `config.coolprop_backend`.
    pub fn from_config(config: &tc_core::Config) -> Self {
        Self::new(Arc::new(CoolPropBackend::with_backend(
            config.coolprop_backend.clone(),
        )))
    }

    pub fn perfect_gas(backend: PerfectGasBackend) -> Self {
        Self::new(Arc::new(backend))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether the adapter can be shared across threads without contention.
    pub fn is_thread_safe(&self) -> bool {
        self.lock.is_none()
    }

    /// An adapter over a fresh backend instance, sharing nothing with `self`.
    pub fn fork(&self) -> Self {
        Self::new(self.backend.fork())
    }

    fn guarded<R>(&self, f: impl FnOnce(&dyn PropertyBackend) -> FluidResult<R>) -> FluidResult<R> {
        match &self.lock {
            Some(lock) => {
                let _guard = lock.lock().map_err(|_| FluidError::Backend {
                    message: "property backend lock poisoned".to_string(),
                })?;
                f(self.backend.as_ref())
            }
            None => f(self.backend.as_ref()),
        }
    }

    pub fn evaluate(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
    ) -> FluidResult<Properties> {
        self.evaluate_with_phase(fluid, pair, v1, v2, FluidPhase::NotImposed)
    }

    /// [`evaluate`](Self::evaluate) from a raw input-pair byte.
    pub fn evaluate_code(&self, fluid: &Fluid, code: u8, v1: f64, v2: f64) -> FluidResult<Properties> {
        let pair = InputPair::from_code(code)?;
        self.evaluate(fluid, pair, v1, v2)
    }

    /// Evaluate with an imposed phase.
    ///
    /// The hint is forwarded to backends that use it; the observed phase is
    /// checked either way, and a disagreement is `OutOfRange`.
    pub fn evaluate_with_phase(
        &self,
        fluid: &Fluid,
        pair: InputPair,
        v1: f64,
        v2: f64,
        imposed: FluidPhase,
    ) -> FluidResult<Properties> {
        if !v1.is_finite() || !v2.is_finite() {
            return Err(FluidError::InvalidInput {
                what: "non-finite input pair value",
            });
        }
        let hint = if self.backend.honors_phase_hint() {
            imposed
        } else {
            FluidPhase::NotImposed
        };
        let props = self.guarded(|backend| backend.evaluate(fluid, pair, v1, v2, hint))?;

        if !admits(&props, imposed) {
            tracing::debug!(
                fluid = %fluid,
                %pair,
                v1,
                v2,
                observed = %props.phase,
                %imposed,
                "imposed phase violated"
            );
            return Err(FluidError::OutOfRange {
                context: format!(
                    "{fluid} {pair}({v1}, {v2}) is {} but {imposed} was imposed",
                    props.phase
                ),
            });
        }
        Ok(props)
    }

    /// Whether `other` calls into the same backend instance.
    pub fn shares_backend(&self, other: &PropertyAdapter) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }

    /// Saturated liquid and vapour at `p`; `None` at or above the critical
    /// pressure (or for fluids without a dome).
    pub fn saturation(&self, fluid: &Fluid, p: f64) -> FluidResult<Option<Saturation>> {
        if !p.is_finite() || p <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "saturation pressure",
            });
        }
        self.guarded(|backend| backend.saturation(fluid, p))
    }

    pub fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
        self.guarded(|backend| backend.critical_point(fluid))
    }
}

/// Quality within which a two-phase state counts as lying on a saturation
/// line. Cell ends sit on the lines up to the march's pressure drift.
const SATURATION_SLACK: f64 = 1e-3;

/// A state on a saturation line is admitted as the single phase it bounds.
fn admits(props: &Properties, imposed: FluidPhase) -> bool {
    if props.phase.satisfies(imposed) {
        return true;
    }
    match (imposed, props.q) {
        (FluidPhase::Liquid, Some(q)) => q <= SATURATION_SLACK,
        (FluidPhase::Gas, Some(q)) => q >= 1.0 - SATURATION_SLACK,
        _ => false,
    }
}

impl std::fmt::Debug for PropertyAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyAdapter")
            .field("backend", &self.backend.name())
            .field("locked", &self.lock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Perfect-gas backend that claims not to be reentrant and counts calls.
    struct Counting {
        inner: PerfectGasBackend,
        calls: AtomicUsize,
    }

    impl PropertyBackend for Counting {
        fn name(&self) -> &str {
            "Counting"
        }
        fn is_reentrant(&self) -> bool {
            false
        }
        fn evaluate(
            &self,
            fluid: &Fluid,
            pair: InputPair,
            v1: f64,
            v2: f64,
            imposed: FluidPhase,
        ) -> FluidResult<Properties> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.evaluate(fluid, pair, v1, v2, imposed)
        }
        fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
            self.inner.critical_point(fluid)
        }
        fn fork(&self) -> Arc<dyn PropertyBackend> {
            Arc::new(Counting {
                inner: self.inner.clone(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    /// Perfect-gas backend that honors phase hints and records them.
    #[derive(Default)]
    struct Recording {
        inner: PerfectGasBackend,
        seen: Mutex<Vec<FluidPhase>>,
    }

    impl PropertyBackend for Recording {
        fn name(&self) -> &str {
            "Recording"
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
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(imposed);
            }
            self.inner.evaluate(fluid, pair, v1, v2, imposed)
        }
        fn critical_point(&self, fluid: &Fluid) -> FluidResult<CriticalPoint> {
            self.inner.critical_point(fluid)
        }
        fn fork(&self) -> Arc<dyn PropertyBackend> {
            Arc::new(Recording::default())
        }
    }

    fn gas_adapter() -> PropertyAdapter {
        PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases())
    }

    #[test]
    fn invalid_codes_fail_before_the_backend() {
        let adapter = gas_adapter();
        let air = Fluid::new("Air");
        assert!(matches!(
            adapter.evaluate_code(&air, 0, 1.0e5, 300.0),
            Err(FluidError::InvalidInput { .. })
        ));
        assert!(matches!(
            adapter.evaluate_code(&air, 99, 1.0e5, 300.0),
            Err(FluidError::InvalidInput { .. })
        ));
        let props = adapter.evaluate_code(&air, 9, 1.0e5, 300.0).unwrap();
        assert!((props.t - 300.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_inputs_rejected() {
        let adapter = gas_adapter();
        let err = adapter
            .evaluate(&Fluid::new("Air"), InputPair::PT, f64::NAN, 300.0)
            .unwrap_err();
        assert!(matches!(err, FluidError::InvalidInput { .. }));
    }

    #[test]
    fn imposed_phase_is_checked() {
        let adapter = gas_adapter();
        let air = Fluid::new("Air");
        let ok = adapter.evaluate_with_phase(&air, InputPair::PT, 1.0e5, 300.0, FluidPhase::Gas);
        assert!(ok.is_ok());
        let err = adapter
            .evaluate_with_phase(&air, InputPair::PT, 1.0e5, 300.0, FluidPhase::Liquid)
            .unwrap_err();
        assert!(matches!(err, FluidError::OutOfRange { .. }));
    }

    #[test]
    fn phase_hint_reaches_backends_that_honor_it() {
        let backend = Arc::new(Recording {
            inner: PerfectGasBackend::with_common_gases(),
            seen: Mutex::new(Vec::new()),
        });
        let adapter = PropertyAdapter::new(backend.clone());
        let air = Fluid::new("Air");
        adapter
            .evaluate_with_phase(&air, InputPair::PT, 1.0e5, 300.0, FluidPhase::Gas)
            .unwrap();
        adapter.evaluate(&air, InputPair::PT, 1.0e5, 300.0).unwrap();
        assert_eq!(
            *backend.seen.lock().unwrap(),
            vec![FluidPhase::Gas, FluidPhase::NotImposed]
        );

        let counting = Arc::new(Counting {
            inner: PerfectGasBackend::with_common_gases(),
            calls: AtomicUsize::new(0),
        });
        let adapter = PropertyAdapter::new(counting.clone());
        adapter
            .evaluate_with_phase(&air, InputPair::PT, 1.0e5, 300.0, FluidPhase::Gas)
            .unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn saturation_lines_admit_the_phase_they_bound() {
        let mut props = PerfectGasBackend::with_common_gases()
            .evaluate(&Fluid::new("Air"), InputPair::PT, 1.0e5, 300.0, FluidPhase::NotImposed)
            .unwrap();
        props.phase = FluidPhase::TwoPhase;
        props.q = Some(0.0);
        assert!(admits(&props, FluidPhase::Liquid));
        assert!(!admits(&props, FluidPhase::Gas));
        props.q = Some(1.0);
        assert!(admits(&props, FluidPhase::Gas));
        props.q = Some(1.0 - 0.5 * SATURATION_SLACK);
        assert!(admits(&props, FluidPhase::Gas));
        props.q = Some(0.5);
        assert!(!admits(&props, FluidPhase::Liquid));
        assert!(admits(&props, FluidPhase::TwoPhase));
    }

    #[test]
    fn non_reentrant_backends_are_locked() {
        let adapter = PropertyAdapter::new(Arc::new(Counting {
            inner: PerfectGasBackend::with_common_gases(),
            calls: AtomicUsize::new(0),
        }));
        assert!(!adapter.is_thread_safe());
        assert!(gas_adapter().is_thread_safe());

        let n2 = Fluid::new("N2");
        std::thread::scope(|scope| {
            for i in 0..4 {
                let adapter = adapter.clone();
                let n2 = n2.clone();
                scope.spawn(move || {
                    let t = 300.0 + f64::from(i);
                    let props = adapter.evaluate(&n2, InputPair::PT, 2.0e5, t).unwrap();
                    assert!((props.t - t).abs() < 1e-9);
                });
            }
        });

        let forked = adapter.fork();
        assert!(!forked.is_thread_safe());
        assert!(!forked.shares_backend(&adapter));
        assert!(adapter.clone().shares_backend(&adapter));
        assert_eq!(forked.backend_name(), "Counting");
    }

    #[test]
    fn saturation_requires_positive_pressure() {
        let adapter = gas_adapter();
        assert!(adapter.saturation(&Fluid::new("He"), -1.0).is_err());
        assert_eq!(adapter.saturation(&Fluid::new("He"), 1.0e5).unwrap(), None);
    }
}
