use std::collections::BTreeMap;

use super::OracleError;
use crate::condition::ConditionDefinition;
use crate::power::PowerDefinition;
use crate::state::{ConditionDefId, PowerId};

/// Read-only access to power and condition definitions.
pub trait DefinitionOracle: Send + Sync {
    fn power(&self, id: PowerId) -> Option<&PowerDefinition>;

    fn condition(&self, id: ConditionDefId) -> Option<&ConditionDefinition>;
}

/// In-memory definition catalog, built once at startup.
#[derive(Clone, Debug, Default)]
pub struct DefinitionCatalog {
    powers: BTreeMap<PowerId, PowerDefinition>,
    conditions: BTreeMap<ConditionDefId, ConditionDefinition>,
}

impl DefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_condition(&mut self, definition: ConditionDefinition) -> Result<(), OracleError> {
        if self.conditions.contains_key(&definition.id) {
            return Err(OracleError::DuplicateCondition(definition.id));
        }
        self.conditions.insert(definition.id, definition);
        Ok(())
    }

    /// Inserts a power and registers its inline (mixin) conditions.
    ///
    /// Nothing is inserted if any id collides.
    pub fn insert_power(&mut self, definition: PowerDefinition) -> Result<(), OracleError> {
        if self.powers.contains_key(&definition.id) {
            return Err(OracleError::DuplicatePower(definition.id));
        }
        let mut mixin_ids = Vec::new();
        for mixin in definition.mixins() {
            if self.conditions.contains_key(&mixin.id) || mixin_ids.contains(&mixin.id) {
                return Err(OracleError::DuplicateCondition(mixin.id));
            }
            mixin_ids.push(mixin.id);
        }
        let mixins: Vec<ConditionDefinition> = definition.mixins().cloned().collect();
        for mixin in mixins {
            self.conditions.insert(mixin.id, mixin);
        }
        self.powers.insert(definition.id, definition);
        Ok(())
    }

    pub fn powers(&self) -> impl Iterator<Item = &PowerDefinition> {
        self.powers.values()
    }

    pub fn conditions(&self) -> impl Iterator<Item = &ConditionDefinition> {
        self.conditions.values()
    }

    pub fn power_count(&self) -> usize {
        self.powers.len()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }
}

impl DefinitionOracle for DefinitionCatalog {
    fn power(&self, id: PowerId) -> Option<&PowerDefinition> {
        self.powers.get(&id)
    }

    fn condition(&self, id: ConditionDefId) -> Option<&ConditionDefinition> {
        self.conditions.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::ConditionRef;

    #[test]
    fn mixins_are_registered_with_their_power() {
        let mut catalog = DefinitionCatalog::new();
        let power = PowerDefinition::new(PowerId(1), "burn").with_condition(ConditionRef::Mixin(
            Box::new(ConditionDefinition::new(ConditionDefId(50), "burning")),
        ));
        catalog.insert_power(power).unwrap();
        assert!(catalog.condition(ConditionDefId(50)).is_some());
    }

    #[test]
    fn colliding_mixin_inserts_nothing() {
        let mut catalog = DefinitionCatalog::new();
        catalog
            .insert_condition(ConditionDefinition::new(ConditionDefId(50), "taken"))
            .unwrap();
        let power = PowerDefinition::new(PowerId(1), "burn").with_condition(ConditionRef::Mixin(
            Box::new(ConditionDefinition::new(ConditionDefId(50), "burning")),
        ));
        assert_eq!(
            catalog.insert_power(power),
            Err(OracleError::DuplicateCondition(ConditionDefId(50)))
        );
        assert!(catalog.power(PowerId(1)).is_none());
    }
}
