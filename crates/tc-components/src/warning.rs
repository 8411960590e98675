//! Non-fatal diagnostics attached to component and exchanger results.

use core::fmt;

use tc_core::UnitPhase;

#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// No correlation was registered for the regime; the conservative
    /// default (Dittus-Boelter, Blasius) was used instead.
    RegimeFallback {
        regime: UnitPhase,
        geometry: &'static str,
    },
    /// A correlation was evaluated outside its validated Reynolds range.
    OutsideValidatedRange {
        method: &'static str,
        reynolds: f64,
        min: f64,
        max: f64,
    },
    /// Crossflow is rated as counterflow (no correction factor).
    CrossflowAsCounterflow,
    /// A cell failure was answered by re-solving with more cells.
    RefinedRetry { cells: usize },
}

impl Warning {
    /// Append `warning` unless an equivalent one is already present.
    pub fn push_unique(list: &mut Vec<Warning>, warning: Warning) {
        let duplicate = list.iter().any(|w| match (w, &warning) {
            (
                Warning::OutsideValidatedRange { method: a, .. },
                Warning::OutsideValidatedRange { method: b, .. },
            ) => a == b,
            (a, b) => a == b,
        });
        if !duplicate {
            list.push(warning);
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::RegimeFallback { regime, geometry } => write!(
                f,
                "no {geometry} correlation for {regime}; used Dittus-Boelter/Blasius"
            ),
            Warning::OutsideValidatedRange {
                method,
                reynolds,
                min,
                max,
            } => write!(
                f,
                "{method} evaluated at Re = {reynolds:.0}, outside [{min:.0}, {max:.0}]"
            ),
            Warning::CrossflowAsCounterflow => {
                f.write_str("crossflow rated as counterflow")
            }
            Warning::RefinedRetry { cells } => {
                write!(f, "re-solved with {cells} cells after a cell failure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_warnings_deduplicate_per_method() {
        let mut list = Vec::new();
        let w = |re| Warning::OutsideValidatedRange {
            method: "Gnielinski",
            reynolds: re,
            min: 3000.0,
            max: 5e6,
        };
        Warning::push_unique(&mut list, w(2500.0));
        Warning::push_unique(&mut list, w(2600.0));
        Warning::push_unique(&mut list, Warning::CrossflowAsCounterflow);
        assert_eq!(list.len(), 2);
        assert!(list[0].to_string().contains("Gnielinski"));
    }
}
