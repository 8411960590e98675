//! Evaluated property sets.

use tc_core::FluidPhase;

use crate::input_pair::Property;

/// Properties at one state point, in SI base units (mass basis).
#[derive(Clone, Debug, PartialEq)]
pub struct Properties {
    /// Pressure [Pa]
    pub p: f64,
    /// Temperature [K]
    pub t: f64,
    /// Specific enthalpy [J/kg]
    pub h: f64,
    /// Specific entropy [J/(kg K)]
    pub s: f64,
    /// Density [kg/m^3]
    pub d: f64,
    /// Specific internal energy [J/kg]
    pub u: f64,
    /// Vapour quality, only inside the two-phase dome
    pub q: Option<f64>,
    pub phase: FluidPhase,
    /// Dynamic viscosity [Pa s]
    pub viscosity: Option<f64>,
    /// Thermal conductivity [W/(m K)]
    pub conductivity: Option<f64>,
    /// Isobaric specific heat [J/(kg K)]
    pub cp: Option<f64>,
    /// Molar mass [kg/mol]
    pub molar_mass: f64,
}

impl Properties {
    /// Value of any property that can appear in an input pair.
    ///
    /// Molar quantities are derived from the mass-basis ones. `Q` is `None`
    /// outside the dome.
    pub fn value(&self, property: Property) -> Option<f64> {
        let mm = self.molar_mass;
        match property {
            Property::P => Some(self.p),
            Property::T => Some(self.t),
            Property::Q => self.q,
            Property::Hmass => Some(self.h),
            Property::Hmolar => Some(self.h * mm),
            Property::Smass => Some(self.s),
            Property::Smolar => Some(self.s * mm),
            Property::Dmass => Some(self.d),
            Property::Dmolar => Some(self.d / mm),
            Property::Umass => Some(self.u),
            Property::Umolar => Some(self.u * mm),
        }
    }

    /// Prandtl number, when the transport properties are available.
    pub fn prandtl(&self) -> Option<f64> {
        Some(self.cp? * self.viscosity? / self.conductivity?)
    }

    pub fn is_two_phase(&self) -> bool {
        self.phase.is_two_phase()
    }
}

/// Saturated liquid and vapour at one pressure.
#[derive(Clone, Debug, PartialEq)]
pub struct Saturation {
    pub liquid: Properties,
    pub vapour: Properties,
}

impl Saturation {
    /// Latent heat [J/kg].
    pub fn h_fg(&self) -> f64 {
        self.vapour.h - self.liquid.h
    }

    /// Saturation temperature [K] (bubble point for pure fluids).
    pub fn t_sat(&self) -> f64 {
        self.liquid.t
    }

    pub fn p_sat(&self) -> f64 {
        self.liquid.p
    }

    /// Quality of a mixture at enthalpy `h`, unclamped.
    pub fn quality(&self, h: f64) -> f64 {
        (h - self.liquid.h) / self.h_fg()
    }
}

/// Critical point of a pure fluid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriticalPoint {
    /// Critical temperature [K]
    pub t: f64,
    /// Critical pressure [Pa]
    pub p: f64,
    /// Critical density [kg/m^3]
    pub d: f64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn point(t: f64, h: f64) -> Properties {
        Properties {
            p: 1.0e5,
            t,
            h,
            s: 1000.0,
            d: 1.2,
            u: h - 1.0e5 / 1.2,
            q: None,
            phase: FluidPhase::Gas,
            viscosity: Some(1.8e-5),
            conductivity: Some(0.026),
            cp: Some(1005.0),
            molar_mass: 0.029,
        }
    }
}
