//! Cross-reference validation of loaded content.
//!
//! Loading only checks syntax and id uniqueness. A catalog that references a
//! missing condition, power or curve still loads, and the engine would then
//! skip the reference at runtime; validation reports every such problem up
//! front.

use combat_core::{
    CombatConfig, CombatError, ConditionDefId, ConditionDefinition, ConditionRef, CurveId,
    CurveOracle, CurveTable, DefinitionCatalog, DefinitionOracle, ErrorSeverity, PowerId,
    RemovalFilter,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{power} references unknown {condition}")]
    UnknownCondition {
        power: PowerId,
        condition: ConditionDefId,
    },

    #[error("{power} is an extra activation of unknown {parent}")]
    UnknownParentPower { power: PowerId, parent: PowerId },

    #[error("{power} removes conditions of unknown {removed}")]
    UnknownRemovalPower { power: PowerId, removed: PowerId },

    #[error("{owner} references unknown {curve}")]
    UnknownCurve { owner: String, curve: CurveId },

    #[error("{condition} allows {max_stacks} stacks; the limit is {limit}")]
    StackLimit {
        condition: ConditionDefId,
        max_stacks: u32,
        limit: u32,
    },

    #[error("{0} has a negative range")]
    NegativeRange(PowerId),
}

impl CombatError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCondition { .. } => "CATALOG_UNKNOWN_CONDITION",
            Self::UnknownParentPower { .. } => "CATALOG_UNKNOWN_PARENT_POWER",
            Self::UnknownRemovalPower { .. } => "CATALOG_UNKNOWN_REMOVAL_POWER",
            Self::UnknownCurve { .. } => "CATALOG_UNKNOWN_CURVE",
            Self::StackLimit { .. } => "CATALOG_STACK_LIMIT",
            Self::NegativeRange(_) => "CATALOG_NEGATIVE_RANGE",
        }
    }
}

/// Reports every dangling reference and out-of-range value in `catalog`.
pub fn validate_catalog(catalog: &DefinitionCatalog, curves: &CurveTable) -> Vec<CatalogError> {
    let mut errors = Vec::new();

    for power in catalog.powers() {
        if power.range < 0.0 {
            errors.push(CatalogError::NegativeRange(power.id));
        }
        for condition in &power.conditions {
            if let ConditionRef::Reference(id) = condition {
                if catalog.condition(*id).is_none() {
                    errors.push(CatalogError::UnknownCondition {
                        power: power.id,
                        condition: *id,
                    });
                }
            }
        }
        if let Some(parent) = power.extra_activation_of {
            if catalog.power(parent).is_none() {
                errors.push(CatalogError::UnknownParentPower {
                    power: power.id,
                    parent,
                });
            }
        }
        for removal in &power.removals {
            if let RemovalFilter::ByPower { power: removed, .. } = *removal {
                if catalog.power(removed).is_none() {
                    errors.push(CatalogError::UnknownRemovalPower {
                        power: power.id,
                        removed,
                    });
                }
            }
        }

        let formulas = power
            .properties
            .iter()
            .map(|property| &property.formula)
            .chain(power.healing.base_curve.as_ref());
        for formula in formulas {
            for curve in formula.curves() {
                if curves.curve(curve).is_none() {
                    errors.push(CatalogError::UnknownCurve {
                        owner: power.id.to_string(),
                        curve,
                    });
                }
            }
        }
    }

    for condition in catalog.conditions() {
        check_condition(condition, curves, &mut errors);
    }

    errors
}

fn check_condition(condition: &ConditionDefinition, curves: &CurveTable, errors: &mut Vec<CatalogError>) {
    let stacking = &condition.stacking;
    let widest = stacking
        .max_stacks_by_rank
        .iter()
        .copied()
        .chain([stacking.max_stacks])
        .max()
        .unwrap_or(0);
    if widest > CombatConfig::MAX_STACKS {
        errors.push(CatalogError::StackLimit {
            condition: condition.id,
            max_stacks: widest,
            limit: CombatConfig::MAX_STACKS,
        });
    }

    let formulas = [&condition.duration_ms, &condition.apply_chance]
        .into_iter()
        .chain(condition.properties.iter().map(|property| &property.formula));
    for formula in formulas {
        for curve in formula.curves() {
            if curves.curve(curve).is_none() {
                errors.push(CatalogError::UnknownCurve {
                    owner: condition.id.to_string(),
                    curve,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        Curve, Formula, PowerDefinition, StackingBehavior, StackingStyle,
    };

    fn catalog_with(power: PowerDefinition) -> DefinitionCatalog {
        let mut catalog = DefinitionCatalog::new();
        catalog.insert_power(power).expect("power inserts");
        catalog
    }

    #[test]
    fn dangling_references_are_reported() {
        let power = PowerDefinition::new(PowerId(1), "broken")
            .with_condition(ConditionRef::Reference(ConditionDefId(9)))
            .with_removal(RemovalFilter::ByPower {
                power: PowerId(77),
                max_stacks: None,
            })
            .with_range(-1.0);
        let errors = validate_catalog(&catalog_with(power), &CurveTable::new());
        assert_eq!(
            errors,
            vec![
                CatalogError::NegativeRange(PowerId(1)),
                CatalogError::UnknownCondition {
                    power: PowerId(1),
                    condition: ConditionDefId(9),
                },
                CatalogError::UnknownRemovalPower {
                    power: PowerId(1),
                    removed: PowerId(77),
                },
            ]
        );
        assert!(errors.iter().all(|e| e.severity() == ErrorSeverity::Validation));
    }

    #[test]
    fn curves_inside_condition_formulas_are_checked() {
        let condition = ConditionDefinition::new(ConditionDefId(3), "scaled")
            .with_duration(Formula::Curve {
                curve: CurveId(4),
                index: Box::new(Formula::PowerRank),
            })
            .with_stacking(StackingBehavior::new(StackingStyle::Replace, 500));
        let mut catalog = DefinitionCatalog::new();
        catalog.insert_condition(condition).expect("condition inserts");

        let errors = validate_catalog(&catalog, &CurveTable::new());
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&CatalogError::UnknownCurve {
            owner: "condition:3".to_string(),
            curve: CurveId(4),
        }));

        let curves: CurveTable = [Curve::new(CurveId(4), 0, vec![1000.0])].into_iter().collect();
        assert_eq!(validate_catalog(&catalog, &curves).len(), 1);
    }
}
