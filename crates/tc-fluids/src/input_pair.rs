//! The input-pair codebook.
//!
//! A state point is fixed by two independent intensive properties. Each
//! supported combination has a stable byte code shared with the backend.

use core::fmt;
use core::str::FromStr;

use crate::error::{FluidError, FluidResult};

/// Byte code that never names a valid pair.
pub const INPUT_PAIR_INVALID: u8 = 0;

/// A single intensive property that can appear in an input pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    P,
    T,
    Q,
    Hmass,
    Hmolar,
    Smass,
    Smolar,
    Dmass,
    Dmolar,
    Umass,
    Umolar,
}

impl Property {
    pub fn is_molar(self) -> bool {
        matches!(
            self,
            Property::Hmolar | Property::Smolar | Property::Dmolar | Property::Umolar
        )
    }

    /// Mass-basis counterpart and the converted value.
    ///
    /// `molar_mass` is in kg/mol. Mass-basis properties map to themselves.
    pub fn to_mass_basis(self, value: f64, molar_mass: f64) -> (Property, f64) {
        match self {
            Property::Hmolar => (Property::Hmass, value / molar_mass),
            Property::Smolar => (Property::Smass, value / molar_mass),
            Property::Umolar => (Property::Umass, value / molar_mass),
            Property::Dmolar => (Property::Dmass, value * molar_mass),
            other => (other, value),
        }
    }
}

/// Two-property inputs, numbered the way the backend numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputPair {
    QT = 1,
    PQ = 2,
    QSmolar = 3,
    QSmass = 4,
    HmolarQ = 5,
    HmassQ = 6,
    DmolarQ = 7,
    DmassQ = 8,
    PT = 9,
    DmassT = 10,
    DmolarT = 11,
    HmolarT = 12,
    HmassT = 13,
    SmolarT = 14,
    SmassT = 15,
    TUmolar = 16,
    TUmass = 17,
    DmassP = 18,
    DmolarP = 19,
    HmassP = 20,
    HmolarP = 21,
    PSmass = 22,
    PSmolar = 23,
    PUmass = 24,
    PUmolar = 25,
    HmassSmass = 26,
    HmolarSmolar = 27,
    SmassUmass = 28,
    SmolarUmolar = 29,
    DmassHmass = 30,
    DmolarHmolar = 31,
    DmassSmass = 32,
    DmolarSmolar = 33,
    DmassUmass = 34,
    DmolarUmolar = 35,
}

/// Every pair with its canonical name and its ordered properties.
const PAIRS: &[(InputPair, &str, Property, Property)] = {
    use InputPair as I;
    use Property as P;
    &[
        (I::QT, "QT", P::Q, P::T),
        (I::PQ, "PQ", P::P, P::Q),
        (I::QSmolar, "QSmolar", P::Q, P::Smolar),
        (I::QSmass, "QSmass", P::Q, P::Smass),
        (I::HmolarQ, "HmolarQ", P::Hmolar, P::Q),
        (I::HmassQ, "HmassQ", P::Hmass, P::Q),
        (I::DmolarQ, "DmolarQ", P::Dmolar, P::Q),
        (I::DmassQ, "DmassQ", P::Dmass, P::Q),
        (I::PT, "PT", P::P, P::T),
        (I::DmassT, "DmassT", P::Dmass, P::T),
        (I::DmolarT, "DmolarT", P::Dmolar, P::T),
        (I::HmolarT, "HmolarT", P::Hmolar, P::T),
        (I::HmassT, "HmassT", P::Hmass, P::T),
        (I::SmolarT, "SmolarT", P::Smolar, P::T),
        (I::SmassT, "SmassT", P::Smass, P::T),
        (I::TUmolar, "TUmolar", P::T, P::Umolar),
        (I::TUmass, "TUmass", P::T, P::Umass),
        (I::DmassP, "DmassP", P::Dmass, P::P),
        (I::DmolarP, "DmolarP", P::Dmolar, P::P),
        (I::HmassP, "HmassP", P::Hmass, P::P),
        (I::HmolarP, "HmolarP", P::Hmolar, P::P),
        (I::PSmass, "PSmass", P::P, P::Smass),
        (I::PSmolar, "PSmolar", P::P, P::Smolar),
        (I::PUmass, "PUmass", P::P, P::Umass),
        (I::PUmolar, "PUmolar", P::P, P::Umolar),
        (I::HmassSmass, "HmassSmass", P::Hmass, P::Smass),
        (I::HmolarSmolar, "HmolarSmolar", P::Hmolar, P::Smolar),
        (I::SmassUmass, "SmassUmass", P::Smass, P::Umass),
        (I::SmolarUmolar, "SmolarUmolar", P::Smolar, P::Umolar),
        (I::DmassHmass, "DmassHmass", P::Dmass, P::Hmass),
        (I::DmolarHmolar, "DmolarHmolar", P::Dmolar, P::Hmolar),
        (I::DmassSmass, "DmassSmass", P::Dmass, P::Smass),
        (I::DmolarSmolar, "DmolarSmolar", P::Dmolar, P::Smolar),
        (I::DmassUmass, "DmassUmass", P::Dmass, P::Umass),
        (I::DmolarUmolar, "DmolarUmolar", P::Dmolar, P::Umolar),
    ]
};

impl InputPair {
    pub const ALL: [InputPair; 35] = {
        let mut all = [InputPair::QT; 35];
        let mut i = 0;
        while i < 35 {
            all[i] = PAIRS[i].0;
            i += 1;
        }
        all
    };

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw byte. `INPUT_PAIR_INVALID` and unknown codes are rejected.
    pub fn from_code(code: u8) -> FluidResult<Self> {
        PAIRS
            .iter()
            .find(|(pair, ..)| pair.code() == code)
            .map(|(pair, ..)| *pair)
            .ok_or(FluidError::InvalidInput {
                what: "unrecognized input pair code",
            })
    }

    /// The pair made of two properties, in either order.
    pub fn from_properties(a: Property, b: Property) -> Option<Self> {
        PAIRS
            .iter()
            .find(|(_, _, x, y)| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|(pair, ..)| *pair)
    }

    /// The two properties, in value order (`v1`, `v2`).
    pub fn properties(self) -> (Property, Property) {
        let (_, _, a, b) = PAIRS[usize::from(self.code()) - 1];
        (a, b)
    }

    pub fn name(self) -> &'static str {
        PAIRS[usize::from(self.code()) - 1].1
    }

    pub fn is_molar(self) -> bool {
        let (a, b) = self.properties();
        a.is_molar() || b.is_molar()
    }

    pub fn involves(self, property: Property) -> bool {
        let (a, b) = self.properties();
        a == property || b == property
    }

    /// Rewrite a molar-basis pair and its values on a mass basis.
    pub fn to_mass_basis(self, v1: f64, v2: f64, molar_mass: f64) -> (InputPair, f64, f64) {
        if !self.is_molar() {
            return (self, v1, v2);
        }
        let (a, b) = self.properties();
        let (a, v1) = a.to_mass_basis(v1, molar_mass);
        let (b, v2) = b.to_mass_basis(v2, molar_mass);
        // The mass-basis counterpart always exists in the codebook.
        let pair = InputPair::from_properties(a, b).unwrap_or(self);
        let (first, _) = pair.properties();
        if first == a { (pair, v1, v2) } else { (pair, v2, v1) }
    }
}

impl TryFrom<u8> for InputPair {
    type Error = FluidError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        InputPair::from_code(code)
    }
}

impl FromStr for InputPair {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PAIRS
            .iter()
            .find(|(_, name, ..)| name.eq_ignore_ascii_case(s))
            .map(|(pair, ..)| *pair)
            .ok_or(FluidError::InvalidInput {
                what: "unrecognized input pair name",
            })
    }
}

impl fmt::Display for InputPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
