//! Mixers and splitters.

use tc_core::units::kgps;
use tc_core::TOLABS_X;
use tc_fluids::{FlowState, PropertyAdapter};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};

/// Adiabatic, work-free flow junction.
#[derive(Clone, Debug, PartialEq)]
pub enum Junction {
    /// `inlets` streams into one. The outlet takes the lowest inlet pressure
    /// and the mass-weighted enthalpy.
    Mixer { inlets: usize },
    /// One stream into `fractions.len()` outlets at the inlet state. The last
    /// outlet takes whatever mass the others leave.
    Splitter { fractions: Vec<f64> },
}

impl Junction {
    pub fn mixer(inlets: usize) -> ComponentResult<Self> {
        let junction = Junction::Mixer { inlets };
        junction.validate()?;
        Ok(junction)
    }

    pub fn splitter(fractions: Vec<f64>) -> ComponentResult<Self> {
        let junction = Junction::Splitter { fractions };
        junction.validate()?;
        Ok(junction)
    }

    /// (inlets, outlets)
    pub fn ports(&self) -> (usize, usize) {
        match self {
            Junction::Mixer { inlets } => (*inlets, 1),
            Junction::Splitter { fractions } => (1, fractions.len()),
        }
    }

    pub fn validate(&self) -> ComponentResult<()> {
        match self {
            Junction::Mixer { inlets } if *inlets < 2 => Err(ComponentError::InvalidArg {
                what: "mixer needs at least two inlets",
            }),
            Junction::Splitter { fractions } => {
                if fractions.len() < 2 {
                    return Err(ComponentError::InvalidArg {
                        what: "splitter needs at least two outlets",
                    });
                }
                let leading = &fractions[..fractions.len() - 1];
                if leading.iter().any(|f| !(f.is_finite() && *f >= 0.0)) {
                    return Err(ComponentError::InvalidArg {
                        what: "splitter fractions must be non-negative",
                    });
                }
                if leading.iter().sum::<f64>() > 1.0 + TOLABS_X {
                    return Err(ComponentError::InvalidArg {
                        what: "splitter fractions exceed one",
                    });
                }
                Ok(())
            }
            Junction::Mixer { .. } => Ok(()),
        }
    }

    pub fn solve(&self, adapter: &PropertyAdapter, inlets: &[FlowState]) -> ComponentResult<Vec<FlowState>> {
        self.validate()?;
        if inlets.len() != self.ports().0 {
            return Err(ComponentError::InvalidArg {
                what: "junction inlet count does not match its ports",
            });
        }
        match self {
            Junction::Mixer { .. } => mix(adapter, inlets).map(|out| vec![out]),
            Junction::Splitter { fractions } => split(&inlets[0], fractions),
        }
    }
}

fn mix(adapter: &PropertyAdapter, inlets: &[FlowState]) -> ComponentResult<FlowState> {
    let Some(first) = inlets.first() else {
        return Err(ComponentError::InvalidArg {
            what: "mixer has no inlets",
        });
    };
    if inlets.iter().any(|s| s.fluid() != first.fluid()) {
        return Err(ComponentError::InvalidArg {
            what: "mixer inlets carry different fluids",
        });
    }
    let m: f64 = inlets.iter().map(FlowState::m).sum();
    let p = inlets
        .iter()
        .map(|s| s.p().value)
        .fold(f64::INFINITY, f64::min);
    let h = if m > 0.0 {
        inlets.iter().map(FlowState::enthalpy_flow).sum::<f64>() / m
    } else {
        inlets.iter().map(FlowState::h).sum::<f64>() / inlets.len() as f64
    };
    let h = check_finite(h, "mixed enthalpy")?;
    let mut out = first.at_ph(adapter, p, h)?;
    out.set_mass_flow(kgps(m))?;
    Ok(out)
}

fn split(inlet: &FlowState, fractions: &[f64]) -> ComponentResult<Vec<FlowState>> {
    let m = inlet.m();
    let mut left = m;
    let mut outlets = Vec::with_capacity(fractions.len());
    for f in &fractions[..fractions.len() - 1] {
        let share = (f * m).min(left);
        left -= share;
        outlets.push(inlet.with_mass_flow(kgps(share))?);
    }
    outlets.push(inlet.with_mass_flow(kgps(left.max(0.0)))?);
    Ok(outlets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tc_core::units::{k, pa};
    use tc_fluids::{Fluid, PerfectGasBackend};

    #[test]
    fn mixer_balances_mass_and_energy() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let a = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(1.0), pa(2e5), k(300.0)).unwrap();
        let b = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(3.0), pa(1.5e5), k(400.0)).unwrap();
        let out = Junction::mixer(2).unwrap().solve(&adapter, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].m(), 4.0);
        assert_relative_eq!(out[0].p().value, 1.5e5);
        assert_relative_eq!(out[0].t().value, 375.0, max_relative = 1e-9);
        assert_relative_eq!(
            out[0].enthalpy_flow(),
            a.enthalpy_flow() + b.enthalpy_flow(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn mixer_rejects_unlike_fluids() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let a = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(1.0), pa(1e5), k(300.0)).unwrap();
        let b = FlowState::from_pt(&adapter, Fluid::new("Helium"), kgps(1.0), pa(1e5), k(300.0)).unwrap();
        assert!(Junction::mixer(2).unwrap().solve(&adapter, &[a, b]).is_err());
    }

    #[test]
    fn splitter_last_outlet_takes_the_rest() {
        let adapter = PropertyAdapter::perfect_gas(PerfectGasBackend::with_common_gases());
        let inlet = FlowState::from_pt(&adapter, Fluid::new("Air"), kgps(2.0), pa(1e5), k(300.0)).unwrap();
        let out = Junction::splitter(vec![0.25, 0.0])
            .unwrap()
            .solve(&adapter, std::slice::from_ref(&inlet))
            .unwrap();
        assert_relative_eq!(out[0].m(), 0.5);
        assert_relative_eq!(out[1].m(), 1.5);
        assert_eq!(out[1].h(), inlet.h());
    }

    #[test]
    fn splitter_rejects_oversubscription() {
        assert!(Junction::splitter(vec![0.7, 0.6, 0.0]).is_err());
        assert!(Junction::splitter(vec![1.0]).is_err());
        assert!(Junction::mixer(1).is_err());
    }
}
