//! Channel and wall geometry.

use std::f64::consts::PI;

use tc_core::units::{Length, mm};

use crate::correlations::MethodTable;
use crate::error::{ComponentError, ComponentResult};

/// Flow passage shape; selects the correlation family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelKind {
    Tube,
    /// Chevron-corrugated plate channel.
    ChevronPlate {
        /// Chevron angle from the flow direction [deg]
        beta_deg: f64,
        /// Surface enlargement factor (developed / projected area)
        phi: f64,
        /// Corrugation pitch [m]
        pitch: f64,
    },
}

impl ChannelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelKind::Tube => "tube",
            ChannelKind::ChevronPlate { .. } => "chevron plate",
        }
    }
}

/// One stream's flow passage, aggregated over parallel channels.
///
/// All quantities are per unit flow length.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub kind: ChannelKind,
    /// Hydraulic diameter [m]
    pub hydraulic_diameter: f64,
    /// Total cross-section open to flow [m^2]
    pub flow_area: f64,
    /// Heat-transfer perimeter: area per unit length [m]
    pub heated_perimeter: f64,
    /// Absolute wall roughness [m]
    pub roughness: f64,
    /// Inclination of the flow direction above horizontal [rad]
    pub inclination: f64,
    /// Port diameter for inlet/outlet port losses [m]
    pub port_diameter: Option<f64>,
    pub methods: MethodTable,
}

impl Channel {
    /// `n` parallel round tubes of inner diameter `d`.
    pub fn tubes(d: Length, n: usize) -> ComponentResult<Self> {
        let d = d.value;
        if !(d.is_finite() && d > 0.0) || n == 0 {
            return Err(ComponentError::InvalidArg {
                what: "tube diameter must be positive and tube count non-zero",
            });
        }
        let n = n as f64;
        Ok(Self {
            kind: ChannelKind::Tube,
            hydraulic_diameter: d,
            flow_area: n * PI * d * d / 4.0,
            heated_perimeter: n * PI * d,
            roughness: 0.0,
            inclination: 0.0,
            port_diameter: None,
            methods: MethodTable::tube(),
        })
    }

    /// `n` chevron plate channels of width `width` and mean gap `gap`.
    ///
    /// Each channel is bounded by two plates, so the heated perimeter per
    /// channel is `2 phi width`.
    pub fn chevron_plates(
        width: Length,
        gap: Length,
        n: usize,
        beta_deg: f64,
        phi: f64,
        pitch: Length,
    ) -> ComponentResult<Self> {
        let (width, gap, pitch) = (width.value, gap.value, pitch.value);
        if !(width > 0.0 && gap > 0.0 && phi >= 1.0 && pitch > 0.0) || n == 0 {
            return Err(ComponentError::InvalidArg {
                what: "plate channel dimensions must be positive and phi >= 1",
            });
        }
        if !(beta_deg > 0.0 && beta_deg < 90.0) {
            return Err(ComponentError::InvalidArg {
                what: "chevron angle must be in (0, 90) degrees",
            });
        }
        let n = n as f64;
        Ok(Self {
            kind: ChannelKind::ChevronPlate {
                beta_deg,
                phi,
                pitch,
            },
            hydraulic_diameter: 2.0 * gap / phi,
            flow_area: n * width * gap,
            heated_perimeter: n * 2.0 * phi * width,
            roughness: 0.0,
            inclination: 0.0,
            port_diameter: None,
            methods: MethodTable::chevron_plate(),
        })
    }

    pub fn with_roughness(mut self, roughness: Length) -> Self {
        self.roughness = roughness.value;
        self
    }

    pub fn with_inclination(mut self, radians: f64) -> Self {
        self.inclination = radians;
        self
    }

    pub fn with_port_diameter(mut self, d: Length) -> Self {
        self.port_diameter = Some(d.value);
        self
    }

    pub fn with_methods(mut self, methods: MethodTable) -> Self {
        self.methods = methods;
        self
    }

    /// Mass flux `G = m / A` [kg/(m^2 s)]
    pub fn mass_flux(&self, m: f64) -> f64 {
        m / self.flow_area
    }

    /// Mass flux through a port, if the channel has one.
    pub fn port_mass_flux(&self, m: f64) -> Option<f64> {
        self.port_diameter.map(|d| m / (PI * d * d / 4.0))
    }

    pub fn validate(&self) -> ComponentResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.hydraulic_diameter)
            || !positive(self.flow_area)
            || !positive(self.heated_perimeter)
        {
            return Err(ComponentError::InvalidArg {
                what: "channel diameter, flow area and perimeter must be positive",
            });
        }
        if !(self.roughness.is_finite() && self.roughness >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "channel roughness must be non-negative",
            });
        }
        if self.port_diameter.is_some_and(|d| !positive(d)) {
            return Err(ComponentError::InvalidArg {
                what: "port diameter must be positive",
            });
        }
        Ok(())
    }
}

/// Conducting wall between two streams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    /// Thickness [m]
    pub thickness: f64,
    /// Thermal conductivity [W/(m K)]
    pub conductivity: f64,
}

impl Wall {
    /// `conductivity` in W/(m K).
    pub fn new(thickness: Length, conductivity: f64) -> Self {
        Self {
            thickness: thickness.value,
            conductivity,
        }
    }

    /// Conduction resistance per unit length for a wall of perimeter `perimeter`.
    pub fn resistance_per_length(&self, perimeter: f64) -> f64 {
        if self.thickness == 0.0 {
            0.0
        } else {
            self.thickness / (self.conductivity * perimeter)
        }
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if !(self.thickness.is_finite() && self.thickness >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "wall thickness must be non-negative",
            });
        }
        if !(self.conductivity.is_finite() && self.conductivity > 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "wall conductivity must be positive",
            });
        }
        Ok(())
    }
}

impl Default for Wall {
    /// 1 mm stainless steel.
    fn default() -> Self {
        Self::new(mm(1.0), 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tc_core::units::m;

    #[test]
    fn tube_bundle_geometry() {
        let ch = Channel::tubes(m(0.01), 4).unwrap();
        assert_relative_eq!(ch.flow_area, 4.0 * PI * 0.01 * 0.01 / 4.0);
        assert_relative_eq!(ch.heated_perimeter, 4.0 * PI * 0.01);
        assert_relative_eq!(ch.mass_flux(0.1), 0.1 / ch.flow_area);
        assert!(ch.validate().is_ok());
    }

    #[test]
    fn plate_channel_geometry() {
        let ch = Channel::chevron_plates(m(0.1), mm(2.0), 10, 60.0, 1.2, mm(7.0)).unwrap();
        assert_relative_eq!(ch.hydraulic_diameter, 2.0 * 0.002 / 1.2, max_relative = 1e-12);
        assert_relative_eq!(ch.heated_perimeter, 10.0 * 2.0 * 1.2 * 0.1, max_relative = 1e-12);
        assert!(Channel::chevron_plates(m(0.1), mm(2.0), 10, 95.0, 1.2, mm(7.0)).is_err());
        assert!(Channel::tubes(m(-0.01), 1).is_err());
    }

    #[test]
    fn port_flux() {
        let ch = Channel::tubes(m(0.01), 1).unwrap();
        assert_eq!(ch.port_mass_flux(1.0), None);
        let ch = ch.with_port_diameter(m(0.05));
        assert_relative_eq!(ch.port_mass_flux(1.0).unwrap(), 1.0 / (PI * 0.05 * 0.05 / 4.0));
    }

    #[test]
    fn wall_resistance() {
        let wall = Wall::new(mm(1.0), 20.0);
        assert_relative_eq!(wall.resistance_per_length(2.0), 0.001 / 40.0, max_relative = 1e-12);
        assert_eq!(Wall::new(m(0.0), 20.0).resistance_per_length(2.0), 0.0);
        assert!(Wall::new(mm(1.0), 0.0).validate().is_err());
    }
}
