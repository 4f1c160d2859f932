//! Data-driven numeric formulas.
//!
//! Power and condition definitions describe dynamic numbers (durations, apply
//! chances, healing curves, per-level bonuses) as small expression trees that
//! are evaluated against read-only property views.
//!
//! ```ignore
//! // 2000ms + 100ms per power rank
//! Formula::Sum(vec![
//!     Formula::Constant(2000.0),
//!     Formula::Product(vec![Formula::PowerRank, Formula::Constant(100.0)]),
//! ])
//!
//! // healing from a level curve
//! Formula::Curve { curve: CurveId(3), index: Box::new(Formula::CombatLevel) }
//! ```

mod curve;
pub mod evaluate;

pub use curve::{Curve, CurveOracle, CurveTable};
pub use evaluate::{FormulaContext, FormulaError};

use crate::property::{PropertyId, PropertyKey};
use crate::state::CurveId;

// ============================================================================
// Formula Definition
// ============================================================================

/// Expression evaluated to an `f32`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    Constant(f32),

    /// Property of the source (attacker, payload or condition creator).
    Property { key: PropertyKey, param: u32 },

    /// Property of the target being calculated.
    TargetProperty { key: PropertyKey, param: u32 },

    /// Curve value at the (truncated) index formula.
    Curve { curve: CurveId, index: Box<Formula> },

    PowerRank,
    CombatLevel,

    /// Live stacks under the stack id being applied.
    ExistingStacks,

    Sum(Vec<Formula>),
    Product(Vec<Formula>),
    Min(Box<Formula>, Box<Formula>),
    Max(Box<Formula>, Box<Formula>),
    Clamp { value: Box<Formula>, min: f32, max: f32 },
}

impl Formula {
    pub const ZERO: Formula = Formula::Constant(0.0);
    pub const ONE: Formula = Formula::Constant(1.0);

    pub fn property(id: PropertyId) -> Self {
        Self::Property {
            key: id.key,
            param: id.param,
        }
    }

    pub fn target_property(id: PropertyId) -> Self {
        Self::TargetProperty {
            key: id.key,
            param: id.param,
        }
    }

    /// Returns the constant value when the formula is a plain constant.
    pub fn as_constant(&self) -> Option<f32> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Curves referenced anywhere in the tree.
    pub fn curves(&self) -> Vec<CurveId> {
        let mut out = Vec::new();
        self.collect_curves(&mut out);
        out
    }

    fn collect_curves(&self, out: &mut Vec<CurveId>) {
        match self {
            Self::Curve { curve, index } => {
                out.push(*curve);
                index.collect_curves(out);
            }
            Self::Sum(items) | Self::Product(items) => {
                items.iter().for_each(|f| f.collect_curves(out));
            }
            Self::Min(a, b) | Self::Max(a, b) => {
                a.collect_curves(out);
                b.collect_curves(out);
            }
            Self::Clamp { value, .. } => value.collect_curves(out),
            Self::Constant(_)
            | Self::Property { .. }
            | Self::TargetProperty { .. }
            | Self::PowerRank
            | Self::CombatLevel
            | Self::ExistingStacks => {}
        }
    }
}

impl Default for Formula {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A formula whose result is written to a property.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyFormula {
    pub key: PropertyKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub param: u32,
    pub formula: Formula,
}

impl PropertyFormula {
    pub fn new(id: PropertyId, formula: Formula) -> Self {
        Self {
            key: id.key,
            param: id.param,
            formula,
        }
    }

    pub fn id(&self) -> PropertyId {
        PropertyId::new(self.key, self.param)
    }
}
