//! Fluid identity.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use crate::error::FluidError;

/// Chemical formulas and short names accepted in place of backend names.
const ALIASES: &[(&str, &str)] = &[
    ("H2O", "Water"),
    ("CO2", "CarbonDioxide"),
    ("He", "Helium"),
    ("N2", "Nitrogen"),
    ("O2", "Oxygen"),
    ("NH3", "Ammonia"),
    ("Ar", "Argon"),
    ("H2", "Hydrogen"),
    ("CH4", "Methane"),
    ("N2O", "NitrousOxide"),
    ("SO2", "SulfurDioxide"),
    ("Ne", "Neon"),
    ("Kr", "Krypton"),
    ("Xe", "Xenon"),
    ("CO", "CarbonMonoxide"),
];

/// A pure fluid (or backend pseudo-pure fluid such as `Air`), named the way
/// the property backend names it.
///
/// Cloning is cheap: the name is shared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fluid(Arc<str>);

impl Fluid {
    /// Build a fluid from a name, resolving formula aliases.
    ///
    /// Names that are not aliases pass through untouched; the backend decides
    /// whether it knows them.
    pub fn new(name: &str) -> Self {
        let resolved = ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(name);
        Self(Arc::from(resolved))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fluid {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FluidError::InvalidInput {
                what: "empty fluid name",
            });
        }
        Ok(Self::new(trimmed))
    }
}

impl From<&str> for Fluid {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Fluid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
