//! SI quantities carried on flow states, and their constructors.
//!
//! Specific properties (enthalpy, entropy, density) stay plain `f64` in SI
//! mass units; state-defining quantities and geometry are typed.

use uom::si::f64::{
    Length as UomLength, MassRate as UomMassRate, Pressure as UomPressure, ThermodynamicTemperature,
};

pub type Length = UomLength;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Temperature = ThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

pub mod constants {
    /// Standard gravity [m/s^2]
    pub const G0_MPS2: f64 = 9.806_65;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn base_units_are_si() {
        assert_relative_eq!(bar(15.0).value, 1.5e6);
        assert_relative_eq!(pa(101_325.0).value, 101_325.0);
        assert_relative_eq!(degc(80.0).value, 353.15, epsilon = 1e-9);
        assert_relative_eq!(k(300.0).value, 300.0);
        assert_eq!(kgps(1.2).value, 1.2);
        assert_relative_eq!(mm(12.0).value, 0.012, epsilon = 1e-15);
        assert_eq!(m(3.0).value, 3.0);
    }
}
