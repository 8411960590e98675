//! Phase, regime, transfer and flow tags.
//!
//! Every tag has a canonical enum variant plus the constant names it is known
//! by. Synonymous constants (`PHASE_VAPOR`, `PHASE_VAPOUR`, `PHASE_GAS`) are the
//! same value, so they compare equal by construction. Each enum parses from any
//! of its constant names through [`FromStr`].

use core::fmt;
use core::str::FromStr;

use crate::TcError;

/// Thermodynamic phase, observed from the backend or imposed as a hint.
///
/// Discriminants follow the backend-native `iphase` numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FluidPhase {
    Liquid = 0,
    Supercritical = 1,
    SupercriticalGas = 2,
    SupercriticalLiquid = 3,
    CriticalPoint = 4,
    Gas = 5,
    TwoPhase = 6,
    Unknown = 7,
    NotImposed = 8,
}

impl FluidPhase {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        use FluidPhase::*;
        Some(match code {
            0 => Liquid,
            1 => Supercritical,
            2 => SupercriticalGas,
            3 => SupercriticalLiquid,
            4 => CriticalPoint,
            5 => Gas,
            6 => TwoPhase,
            7 => Unknown,
            8 => NotImposed,
            _ => return None,
        })
    }

    pub fn is_two_phase(self) -> bool {
        self == FluidPhase::TwoPhase
    }

    pub fn is_supercritical(self) -> bool {
        matches!(
            self,
            FluidPhase::Supercritical
                | FluidPhase::SupercriticalGas
                | FluidPhase::SupercriticalLiquid
                | FluidPhase::CriticalPoint
        )
    }

    /// True for a phase that pins the state to one side of the dome.
    pub fn is_single_phase(self) -> bool {
        matches!(self, FluidPhase::Liquid | FluidPhase::Gas) || self.is_supercritical()
    }

    /// Whether an observed phase is consistent with an imposed one.
    pub fn satisfies(self, imposed: FluidPhase) -> bool {
        use FluidPhase::*;
        match imposed {
            NotImposed | Unknown => true,
            TwoPhase => self == TwoPhase,
            Liquid => matches!(self, Liquid | SupercriticalLiquid),
            Gas => matches!(self, Gas | SupercriticalGas),
            Supercritical | SupercriticalGas | SupercriticalLiquid | CriticalPoint => {
                self.is_supercritical()
            }
        }
    }
}

pub const IPHASE_LIQUID: FluidPhase = FluidPhase::Liquid;
pub const IPHASE_SUPERCRITICAL: FluidPhase = FluidPhase::Supercritical;
pub const IPHASE_SUPERCRITICAL_GAS: FluidPhase = FluidPhase::SupercriticalGas;
pub const IPHASE_SUPERCRITICAL_LIQUID: FluidPhase = FluidPhase::SupercriticalLiquid;
pub const IPHASE_CRITICAL_POINT: FluidPhase = FluidPhase::CriticalPoint;
pub const IPHASE_GAS: FluidPhase = FluidPhase::Gas;
pub const IPHASE_TWOPHASE: FluidPhase = FluidPhase::TwoPhase;
pub const IPHASE_UNKNOWN: FluidPhase = FluidPhase::Unknown;
pub const IPHASE_NOT_IMPOSED: FluidPhase = FluidPhase::NotImposed;

pub const PHASE_LIQUID: FluidPhase = FluidPhase::Liquid;
pub const PHASE_SUPERCRITICAL: FluidPhase = FluidPhase::Supercritical;
pub const PHASE_SUPERCRITICAL_GAS: FluidPhase = FluidPhase::SupercriticalGas;
pub const PHASE_SUPERCRITICAL_LIQUID: FluidPhase = FluidPhase::SupercriticalLiquid;
pub const PHASE_CRITICAL_POINT: FluidPhase = FluidPhase::CriticalPoint;
pub const PHASE_GAS: FluidPhase = FluidPhase::Gas;
pub const PHASE_VAPOUR: FluidPhase = FluidPhase::Gas;
pub const PHASE_VAPOR: FluidPhase = FluidPhase::Gas;
pub const PHASE_TWOPHASE: FluidPhase = FluidPhase::TwoPhase;
pub const PHASE_TP: FluidPhase = FluidPhase::TwoPhase;
pub const PHASE_UNKNOWN: FluidPhase = FluidPhase::Unknown;
pub const PHASE_NOT_IMPOSED: FluidPhase = FluidPhase::NotImposed;

const FLUID_PHASE_NAMES: &[(&str, FluidPhase)] = &[
    ("IPHASE_LIQUID", IPHASE_LIQUID),
    ("IPHASE_SUPERCRITICAL", IPHASE_SUPERCRITICAL),
    ("IPHASE_SUPERCRITICAL_GAS", IPHASE_SUPERCRITICAL_GAS),
    ("IPHASE_SUPERCRITICAL_LIQUID", IPHASE_SUPERCRITICAL_LIQUID),
    ("IPHASE_CRITICAL_POINT", IPHASE_CRITICAL_POINT),
    ("IPHASE_GAS", IPHASE_GAS),
    ("IPHASE_TWOPHASE", IPHASE_TWOPHASE),
    ("IPHASE_UNKNOWN", IPHASE_UNKNOWN),
    ("IPHASE_NOT_IMPOSED", IPHASE_NOT_IMPOSED),
    ("PHASE_LIQUID", PHASE_LIQUID),
    ("PHASE_SUPERCRITICAL", PHASE_SUPERCRITICAL),
    ("PHASE_SUPERCRITICAL_GAS", PHASE_SUPERCRITICAL_GAS),
    ("PHASE_SUPERCRITICAL_LIQUID", PHASE_SUPERCRITICAL_LIQUID),
    ("PHASE_CRITICAL_POINT", PHASE_CRITICAL_POINT),
    ("PHASE_GAS", PHASE_GAS),
    ("PHASE_VAPOUR", PHASE_VAPOUR),
    ("PHASE_VAPOR", PHASE_VAPOR),
    ("PHASE_TWOPHASE", PHASE_TWOPHASE),
    ("PHASE_TP", PHASE_TP),
    ("PHASE_UNKNOWN", PHASE_UNKNOWN),
    ("PHASE_NOT_IMPOSED", PHASE_NOT_IMPOSED),
    ("liquid", FluidPhase::Liquid),
    ("gas", FluidPhase::Gas),
    ("vapour", FluidPhase::Gas),
    ("vapor", FluidPhase::Gas),
    ("supercritical", FluidPhase::Supercritical),
    ("supercritical_gas", FluidPhase::SupercriticalGas),
    ("supercritical_liquid", FluidPhase::SupercriticalLiquid),
    ("critical_point", FluidPhase::CriticalPoint),
    ("twophase", FluidPhase::TwoPhase),
    ("two_phase", FluidPhase::TwoPhase),
    ("unknown", FluidPhase::Unknown),
    ("not_imposed", FluidPhase::NotImposed),
];

/// Flow regime of a unit cell; selects the correlation set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitPhase {
    None,
    Liquid,
    Vapour,
    TwoPhaseEvaporating,
    TwoPhaseCondensing,
    Supercritical,
    AllSinglePhase,
    AllTwoPhase,
    All,
}

impl UnitPhase {
    /// Concrete regimes carry no aggregation.
    pub fn is_concrete(self) -> bool {
        matches!(
            self,
            UnitPhase::Liquid
                | UnitPhase::Vapour
                | UnitPhase::TwoPhaseEvaporating
                | UnitPhase::TwoPhaseCondensing
                | UnitPhase::Supercritical
        )
    }

    pub fn is_two_phase(self) -> bool {
        matches!(
            self,
            UnitPhase::TwoPhaseEvaporating | UnitPhase::TwoPhaseCondensing | UnitPhase::AllTwoPhase
        )
    }

    /// Whether this (possibly aggregate) tag covers `regime`.
    pub fn covers(self, regime: UnitPhase) -> bool {
        use UnitPhase::*;
        match self {
            None => regime == None,
            All => regime != None,
            AllSinglePhase => matches!(regime, Liquid | Vapour | Supercritical | AllSinglePhase),
            AllTwoPhase => matches!(
                regime,
                TwoPhaseEvaporating | TwoPhaseCondensing | AllTwoPhase
            ),
            concrete => concrete == regime,
        }
    }

    /// Aggregate tags to try, most specific first, when `self` has no entry.
    pub fn fallbacks(self) -> &'static [UnitPhase] {
        use UnitPhase::*;
        match self {
            Liquid | Vapour | Supercritical => &[AllSinglePhase, All],
            TwoPhaseEvaporating | TwoPhaseCondensing => &[AllTwoPhase, All],
            AllSinglePhase | AllTwoPhase => &[All],
            None | All => &[],
        }
    }

    /// Regime of a stream segment from its observed phase.
    ///
    /// `heating` tells evaporation from condensation inside the dome.
    pub fn from_phase(phase: FluidPhase, heating: bool) -> UnitPhase {
        match phase {
            FluidPhase::Liquid => UnitPhase::Liquid,
            FluidPhase::Gas => UnitPhase::Vapour,
            FluidPhase::TwoPhase if heating => UnitPhase::TwoPhaseEvaporating,
            FluidPhase::TwoPhase => UnitPhase::TwoPhaseCondensing,
            FluidPhase::Supercritical
            | FluidPhase::SupercriticalGas
            | FluidPhase::SupercriticalLiquid
            | FluidPhase::CriticalPoint => UnitPhase::Supercritical,
            FluidPhase::Unknown | FluidPhase::NotImposed => UnitPhase::None,
        }
    }

    /// Phase to impose on property calls made for a cell of this regime.
    ///
    /// Only subcritical single-phase regimes pin the flash. Two-phase cells
    /// end on the saturation lines and supercritical cells may straddle the
    /// pseudo-critical line, so both are left free.
    pub fn imposed_phase(self) -> FluidPhase {
        match self {
            UnitPhase::Liquid => FluidPhase::Liquid,
            UnitPhase::Vapour => FluidPhase::Gas,
            _ => FluidPhase::NotImposed,
        }
    }
}

pub const UNITPHASE_NONE: UnitPhase = UnitPhase::None;
pub const UNITPHASE_ALL: UnitPhase = UnitPhase::All;
pub const UNITPHASE_LIQUID: UnitPhase = UnitPhase::Liquid;
pub const UNITPHASE_VAPOUR: UnitPhase = UnitPhase::Vapour;
pub const UNITPHASE_VAPOR: UnitPhase = UnitPhase::Vapour;
pub const UNITPHASE_GAS: UnitPhase = UnitPhase::Vapour;
pub const UNITPHASE_TWOPHASE_EVAPORATING: UnitPhase = UnitPhase::TwoPhaseEvaporating;
pub const UNITPHASE_TP_EVAP: UnitPhase = UnitPhase::TwoPhaseEvaporating;
pub const UNITPHASE_TWOPHASE_CONDENSING: UnitPhase = UnitPhase::TwoPhaseCondensing;
pub const UNITPHASE_TP_COND: UnitPhase = UnitPhase::TwoPhaseCondensing;
pub const UNITPHASE_SUPERCRITICAL: UnitPhase = UnitPhase::Supercritical;
pub const UNITPHASE_ALL_SINGLEPHASE: UnitPhase = UnitPhase::AllSinglePhase;
pub const UNITPHASE_ALL_SP: UnitPhase = UnitPhase::AllSinglePhase;
pub const UNITPHASE_ALL_TWOPHASE: UnitPhase = UnitPhase::AllTwoPhase;
pub const UNITPHASE_ALL_TP: UnitPhase = UnitPhase::AllTwoPhase;

const UNIT_PHASE_NAMES: &[(&str, UnitPhase)] = &[
    ("UNITPHASE_NONE", UNITPHASE_NONE),
    ("UNITPHASE_ALL", UNITPHASE_ALL),
    ("UNITPHASE_LIQUID", UNITPHASE_LIQUID),
    ("UNITPHASE_VAPOUR", UNITPHASE_VAPOUR),
    ("UNITPHASE_VAPOR", UNITPHASE_VAPOR),
    ("UNITPHASE_GAS", UNITPHASE_GAS),
    ("UNITPHASE_TWOPHASE_EVAPORATING", UNITPHASE_TWOPHASE_EVAPORATING),
    ("UNITPHASE_TP_EVAP", UNITPHASE_TP_EVAP),
    ("UNITPHASE_TWOPHASE_CONDENSING", UNITPHASE_TWOPHASE_CONDENSING),
    ("UNITPHASE_TP_COND", UNITPHASE_TP_COND),
    ("UNITPHASE_SUPERCRITICAL", UNITPHASE_SUPERCRITICAL),
    ("UNITPHASE_ALL_SINGLEPHASE", UNITPHASE_ALL_SINGLEPHASE),
    ("UNITPHASE_ALL_SP", UNITPHASE_ALL_SP),
    ("UNITPHASE_ALL_TWOPHASE", UNITPHASE_ALL_TWOPHASE),
    ("UNITPHASE_ALL_TP", UNITPHASE_ALL_TP),
    ("none", UnitPhase::None),
    ("all", UnitPhase::All),
    ("liquid", UnitPhase::Liquid),
    ("vapour", UnitPhase::Vapour),
    ("vapor", UnitPhase::Vapour),
    ("tpEvap", UnitPhase::TwoPhaseEvaporating),
    ("tpCond", UnitPhase::TwoPhaseCondensing),
    ("supercritical", UnitPhase::Supercritical),
    ("sp", UnitPhase::AllSinglePhase),
    ("tp", UnitPhase::AllTwoPhase),
];

/// Which balances a unit cell enforces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferMode {
    None,
    Heat,
    Friction,
    #[default]
    All,
}

impl TransferMode {
    pub fn includes_heat(self) -> bool {
        matches!(self, TransferMode::Heat | TransferMode::All)
    }

    pub fn includes_friction(self) -> bool {
        matches!(self, TransferMode::Friction | TransferMode::All)
    }
}

pub const TRANSFER_NONE: TransferMode = TransferMode::None;
pub const TRANSFER_ALL: TransferMode = TransferMode::All;
pub const TRANSFER_HEAT: TransferMode = TransferMode::Heat;
pub const TRANSFER_FRICTION: TransferMode = TransferMode::Friction;

const TRANSFER_NAMES: &[(&str, TransferMode)] = &[
    ("TRANSFER_NONE", TRANSFER_NONE),
    ("TRANSFER_ALL", TRANSFER_ALL),
    ("TRANSFER_HEAT", TRANSFER_HEAT),
    ("TRANSFER_FRICTION", TRANSFER_FRICTION),
    ("none", TransferMode::None),
    ("all", TransferMode::All),
    ("heat", TransferMode::Heat),
    ("friction", TransferMode::Friction),
];

/// Role of a stream inside a two-stream exchanger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FluidRole {
    /// The cycle's working fluid.
    Primary,
    Secondary,
}

impl FluidRole {
    pub fn other(self) -> FluidRole {
        match self {
            FluidRole::Primary => FluidRole::Secondary,
            FluidRole::Secondary => FluidRole::Primary,
        }
    }
}

pub const WORKING_FLUID: FluidRole = FluidRole::Primary;
pub const SECONDARY_FLUID: FluidRole = FluidRole::Secondary;

/// Stream selection tag (`FLOW_*`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowSelection {
    None,
    All,
    Primary,
    Secondary,
}

impl FlowSelection {
    pub fn includes(self, role: FluidRole) -> bool {
        match self {
            FlowSelection::None => false,
            FlowSelection::All => true,
            FlowSelection::Primary => role == FluidRole::Primary,
            FlowSelection::Secondary => role == FluidRole::Secondary,
        }
    }
}

impl From<FluidRole> for FlowSelection {
    fn from(role: FluidRole) -> Self {
        match role {
            FluidRole::Primary => FlowSelection::Primary,
            FluidRole::Secondary => FlowSelection::Secondary,
        }
    }
}

pub const FLOW_NONE: FlowSelection = FlowSelection::None;
pub const FLOW_ALL: FlowSelection = FlowSelection::All;
pub const FLOW_PRIMARY: FlowSelection = FlowSelection::Primary;
pub const FLOW_SECONDARY: FlowSelection = FlowSelection::Secondary;

const FLOW_NAMES: &[(&str, FlowSelection)] = &[
    ("FLOW_NONE", FLOW_NONE),
    ("FLOW_ALL", FLOW_ALL),
    ("FLOW_PRIMARY", FLOW_PRIMARY),
    ("FLOW_SECONDARY", FLOW_SECONDARY),
    ("WORKING_FLUID", FlowSelection::Primary),
    ("SECONDARY_FLUID", FlowSelection::Secondary),
];

/// Relative direction of the two streams in an exchanger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowSense {
    #[default]
    Undefined,
    Counterflow,
    Parallelflow,
    Crossflow,
}

pub const FLOWSENSE_UNDEFINED: FlowSense = FlowSense::Undefined;
pub const FLOWSENSE_COUNTERFLOW: FlowSense = FlowSense::Counterflow;
pub const FLOWSENSE_PARALLELFLOW: FlowSense = FlowSense::Parallelflow;
pub const FLOWSENSE_CROSSFLOW: FlowSense = FlowSense::Crossflow;

const FLOWSENSE_NAMES: &[(&str, FlowSense)] = &[
    ("FLOWSENSE_UNDEFINED", FLOWSENSE_UNDEFINED),
    ("FLOWSENSE_COUNTERFLOW", FLOWSENSE_COUNTERFLOW),
    ("FLOWSENSE_PARALLELFLOW", FLOWSENSE_PARALLELFLOW),
    ("FLOWSENSE_CROSSFLOW", FLOWSENSE_CROSSFLOW),
    ("counterflow", FlowSense::Counterflow),
    ("parallelflow", FlowSense::Parallelflow),
    ("crossflow", FlowSense::Crossflow),
];

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    let name = name.trim();
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}

fn canonical_name<T: Copy + PartialEq>(table: &'static [(&'static str, T)], value: T) -> &'static str {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(key, _)| *key)
        .unwrap_or("UNKNOWN")
}

macro_rules! tag_text {
    ($ty:ty, $table:expr, $what:literal) => {
        impl FromStr for $ty {
            type Err = TcError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                lookup($table, s).ok_or(TcError::InvalidArg { what: $what })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(canonical_name($table, *self))
            }
        }
    };
}

tag_text!(FluidPhase, FLUID_PHASE_NAMES, "unrecognized phase tag");
tag_text!(UnitPhase, UNIT_PHASE_NAMES, "unrecognized unit phase tag");
tag_text!(TransferMode, TRANSFER_NAMES, "unrecognized transfer tag");
tag_text!(FlowSelection, FLOW_NAMES, "unrecognized flow tag");
tag_text!(FlowSense, FLOWSENSE_NAMES, "unrecognized flow sense tag");

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn vapour_synonyms_compare_equal() {
        assert_eq!(PHASE_VAPOR, PHASE_VAPOUR);
        assert_eq!(PHASE_VAPOUR, PHASE_GAS);
        assert_eq!(PHASE_GAS, IPHASE_GAS);
        assert_eq!(PHASE_TP, PHASE_TWOPHASE);
    }

    #[test]
    fn two_phase_unit_synonyms_compare_equal() {
        assert_eq!(UNITPHASE_TP_EVAP, UNITPHASE_TWOPHASE_EVAPORATING);
        assert_eq!(UNITPHASE_TP_COND, UNITPHASE_TWOPHASE_CONDENSING);
        assert_eq!(UNITPHASE_ALL_TP, UNITPHASE_ALL_TWOPHASE);
        assert_eq!(UNITPHASE_ALL_SP, UNITPHASE_ALL_SINGLEPHASE);
        assert_eq!(UNITPHASE_VAPOR, UNITPHASE_VAPOUR);
    }

    #[test]
    fn parse_names() {
        assert_eq!("PHASE_VAPOR".parse::<FluidPhase>().unwrap(), FluidPhase::Gas);
        assert_eq!(
            "unitphase_tp_evap".parse::<UnitPhase>().unwrap(),
            UnitPhase::TwoPhaseEvaporating
        );
        assert_eq!(
            "WORKING_FLUID".parse::<FlowSelection>().unwrap(),
            FlowSelection::Primary
        );
        assert_eq!(
            "FLOWSENSE_COUNTERFLOW".parse::<FlowSense>().unwrap(),
            FlowSense::Counterflow
        );
        assert!("PHASE_PLASMA".parse::<FluidPhase>().is_err());
    }

    #[test]
    fn phase_codes_follow_backend_numbering() {
        assert_eq!(IPHASE_LIQUID.code(), 0);
        assert_eq!(IPHASE_GAS.code(), 5);
        assert_eq!(IPHASE_TWOPHASE.code(), 6);
        assert_eq!(IPHASE_NOT_IMPOSED.code(), 8);
        assert_eq!(FluidPhase::from_code(9), None);
    }

    #[test]
    fn aggregate_unit_phases_cover_concrete_regimes() {
        assert!(UnitPhase::AllSinglePhase.covers(UnitPhase::Liquid));
        assert!(UnitPhase::AllSinglePhase.covers(UnitPhase::Supercritical));
        assert!(!UnitPhase::AllSinglePhase.covers(UnitPhase::TwoPhaseCondensing));
        assert!(UnitPhase::AllTwoPhase.covers(UnitPhase::TwoPhaseEvaporating));
        assert!(UnitPhase::All.covers(UnitPhase::Vapour));
        assert!(!UnitPhase::Liquid.covers(UnitPhase::Vapour));
    }

    #[test]
    fn regime_from_phase() {
        assert_eq!(
            UnitPhase::from_phase(FluidPhase::TwoPhase, true),
            UnitPhase::TwoPhaseEvaporating
        );
        assert_eq!(
            UnitPhase::from_phase(FluidPhase::TwoPhase, false),
            UnitPhase::TwoPhaseCondensing
        );
        assert_eq!(
            UnitPhase::from_phase(FluidPhase::SupercriticalGas, false),
            UnitPhase::Supercritical
        );
    }

    #[test]
    fn single_phase_regimes_impose_their_phase() {
        assert_eq!(UnitPhase::Liquid.imposed_phase(), FluidPhase::Liquid);
        assert_eq!(UnitPhase::Vapour.imposed_phase(), FluidPhase::Gas);
        assert_eq!(UnitPhase::TwoPhaseEvaporating.imposed_phase(), FluidPhase::NotImposed);
        assert_eq!(UnitPhase::Supercritical.imposed_phase(), FluidPhase::NotImposed);
        assert_eq!(UnitPhase::None.imposed_phase(), FluidPhase::NotImposed);
        for regime in [UnitPhase::Liquid, UnitPhase::Vapour] {
            let phase = regime.imposed_phase();
            assert_eq!(UnitPhase::from_phase(phase, true), regime);
        }
    }

    #[test]
    fn imposed_phase_agreement() {
        assert!(FluidPhase::Liquid.satisfies(FluidPhase::NotImposed));
        assert!(FluidPhase::SupercriticalGas.satisfies(FluidPhase::Gas));
        assert!(!FluidPhase::TwoPhase.satisfies(FluidPhase::Liquid));
        assert!(!FluidPhase::Gas.satisfies(FluidPhase::TwoPhase));
    }

    #[test]
    fn transfer_mode_flags() {
        assert!(TRANSFER_ALL.includes_heat() && TRANSFER_ALL.includes_friction());
        assert!(TRANSFER_HEAT.includes_heat() && !TRANSFER_HEAT.includes_friction());
        assert!(!TRANSFER_NONE.includes_heat() && !TRANSFER_NONE.includes_friction());
    }

    proptest! {
        #[test]
        fn phase_name_round_trip(idx in 0usize..FLUID_PHASE_NAMES.len()) {
            let (name, phase) = FLUID_PHASE_NAMES[idx];
            let parsed: FluidPhase = name.parse().unwrap();
            prop_assert_eq!(parsed, phase);
            let canonical: FluidPhase = phase.to_string().parse().unwrap();
            prop_assert_eq!(canonical, phase);
        }

        #[test]
        fn unit_phase_name_round_trip(idx in 0usize..UNIT_PHASE_NAMES.len()) {
            let (name, regime) = UNIT_PHASE_NAMES[idx];
            let parsed: UnitPhase = name.parse().unwrap();
            prop_assert_eq!(parsed, regime);
            let canonical: UnitPhase = regime.to_string().parse().unwrap();
            prop_assert_eq!(canonical, regime);
        }

        #[test]
        fn phase_code_round_trip(code in 0u8..9) {
            let phase = FluidPhase::from_code(code).unwrap();
            prop_assert_eq!(phase.code(), code);
        }
    }
}
