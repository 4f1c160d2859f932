//! Formula evaluation.

use super::{CurveOracle, Formula};
use crate::error::{CombatError, ErrorSeverity};
use crate::property::{PropertyCollection, PropertyId, PropertyKey};
use crate::state::CurveId;

/// Read-only inputs a formula may consult.
#[derive(Clone, Copy)]
pub struct FormulaContext<'a> {
    pub source: &'a PropertyCollection,
    pub target: Option<&'a PropertyCollection>,
    pub curves: Option<&'a dyn CurveOracle>,
    pub power_rank: u32,
    pub combat_level: u32,
    pub existing_stacks: u32,
}

impl<'a> FormulaContext<'a> {
    pub fn new(source: &'a PropertyCollection) -> Self {
        Self {
            source,
            target: None,
            curves: None,
            power_rank: 0,
            combat_level: 0,
            existing_stacks: 0,
        }
    }

    pub fn with_target(mut self, target: &'a PropertyCollection) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_curves(mut self, curves: &'a dyn CurveOracle) -> Self {
        self.curves = Some(curves);
        self
    }

    pub fn with_rank(mut self, power_rank: u32) -> Self {
        self.power_rank = power_rank;
        self
    }

    pub fn with_combat_level(mut self, combat_level: u32) -> Self {
        self.combat_level = combat_level;
        self
    }

    pub fn with_existing_stacks(mut self, existing_stacks: u32) -> Self {
        self.existing_stacks = existing_stacks;
        self
    }
}

/// Failure to resolve a formula input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("curve oracle not available")]
    CurvesNotAvailable,

    #[error("curve {0} not found")]
    CurveNotFound(CurveId),

    #[error("formula reads target property {0} but no target is bound")]
    NoTarget(PropertyKey),

    #[error("formula produced a non-finite value")]
    NonFinite,
}

impl CombatError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CurvesNotAvailable => ErrorSeverity::Fatal,
            Self::CurveNotFound(_) | Self::NoTarget(_) | Self::NonFinite => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CurvesNotAvailable => "FORMULA_CURVES_NOT_AVAILABLE",
            Self::CurveNotFound(_) => "FORMULA_CURVE_NOT_FOUND",
            Self::NoTarget(_) => "FORMULA_NO_TARGET",
            Self::NonFinite => "FORMULA_NON_FINITE",
        }
    }
}

// ============================================================================
// Formula Evaluation
// ============================================================================

impl Formula {
    /// Evaluates the formula.
    ///
    /// ## Errors
    /// - `CurvesNotAvailable` / `CurveNotFound` for unresolvable curve lookups
    /// - `NoTarget` for target reads without a bound target
    /// - `NonFinite` if the arithmetic produced NaN or infinity
    pub fn evaluate(&self, ctx: &FormulaContext<'_>) -> Result<f32, FormulaError> {
        let value = self.eval(ctx)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }

    /// Evaluates the formula, degrading to zero on failure.
    pub fn evaluate_or_zero(&self, ctx: &FormulaContext<'_>, what: &'static str) -> f32 {
        match self.evaluate(ctx) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(%error, what, "formula fell back to zero");
                0.0
            }
        }
    }

    fn eval(&self, ctx: &FormulaContext<'_>) -> Result<f32, FormulaError> {
        match self {
            Formula::Constant(value) => Ok(*value),

            Formula::Property { key, param } => Ok(ctx.source.real(PropertyId::new(*key, *param))),

            Formula::TargetProperty { key, param } => ctx
                .target
                .map(|target| target.real(PropertyId::new(*key, *param)))
                .ok_or(FormulaError::NoTarget(*key)),

            Formula::Curve { curve, index } => {
                let curves = ctx.curves.ok_or(FormulaError::CurvesNotAvailable)?;
                let index = index.eval(ctx)? as i32;
                curves
                    .lookup(*curve, index)
                    .ok_or(FormulaError::CurveNotFound(*curve))
            }

            Formula::PowerRank => Ok(ctx.power_rank as f32),
            Formula::CombatLevel => Ok(ctx.combat_level as f32),
            Formula::ExistingStacks => Ok(ctx.existing_stacks as f32),

            Formula::Sum(items) => items
                .iter()
                .try_fold(0.0_f32, |acc, f| f.eval(ctx).map(|v| acc + v)),

            Formula::Product(items) => items
                .iter()
                .try_fold(1.0_f32, |acc, f| f.eval(ctx).map(|v| acc * v)),

            Formula::Min(a, b) => Ok(a.eval(ctx)?.min(b.eval(ctx)?)),
            Formula::Max(a, b) => Ok(a.eval(ctx)?.max(b.eval(ctx)?)),

            // max/min rather than clamp: data may author min > max
            Formula::Clamp { value, min, max } => Ok(value.eval(ctx)?.max(*min).min(*max)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{Curve, CurveTable};

    fn source() -> PropertyCollection {
        let mut props = PropertyCollection::new();
        props.set_real(PropertyKey::HealingBase, 40.0);
        props
    }

    #[test]
    fn arithmetic_over_properties() {
        let props = source();
        let ctx = FormulaContext::new(&props).with_rank(3);
        let formula = Formula::Sum(vec![
            Formula::Property {
                key: PropertyKey::HealingBase,
                param: 0,
            },
            Formula::Product(vec![Formula::PowerRank, Formula::Constant(10.0)]),
        ]);
        assert_eq!(formula.evaluate(&ctx), Ok(70.0));
    }

    #[test]
    fn curve_lookup_uses_index_formula() {
        let props = source();
        let table: CurveTable = [Curve::new(CurveId(1), 1, vec![5.0, 6.0, 7.0])]
            .into_iter()
            .collect();
        let ctx = FormulaContext::new(&props)
            .with_curves(&table)
            .with_combat_level(2);
        let formula = Formula::Curve {
            curve: CurveId(1),
            index: Box::new(Formula::CombatLevel),
        };
        assert_eq!(formula.evaluate(&ctx), Ok(6.0));
    }

    #[test]
    fn missing_inputs_are_errors() {
        let props = source();
        let ctx = FormulaContext::new(&props);
        let curve = Formula::Curve {
            curve: CurveId(9),
            index: Box::new(Formula::ZERO),
        };
        assert_eq!(curve.evaluate(&ctx), Err(FormulaError::CurvesNotAvailable));

        let target = Formula::TargetProperty {
            key: PropertyKey::ResistScore,
            param: 0,
        };
        assert_eq!(
            target.evaluate(&ctx),
            Err(FormulaError::NoTarget(PropertyKey::ResistScore))
        );
        assert_eq!(target.evaluate_or_zero(&ctx, "test"), 0.0);
    }

    #[test]
    fn clamp_and_min_max() {
        let props = source();
        let ctx = FormulaContext::new(&props);
        let formula = Formula::Clamp {
            value: Box::new(Formula::Max(
                Box::new(Formula::Constant(3.0)),
                Box::new(Formula::Constant(9.0)),
            )),
            min: 0.0,
            max: 5.0,
        };
        assert_eq!(formula.evaluate(&ctx), Ok(5.0));
    }
}
