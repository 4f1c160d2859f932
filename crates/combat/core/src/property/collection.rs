use std::collections::BTreeMap;

use super::key::PropertyKey;
use crate::state::EntityId;

/// Property address: key plus an integer parameter (damage type, keyword, power id ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyId {
    pub key: PropertyKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub param: u32,
}

impl PropertyId {
    pub const fn new(key: PropertyKey, param: u32) -> Self {
        Self { key, param }
    }

    pub const fn plain(key: PropertyKey) -> Self {
        Self { key, param: 0 }
    }
}

impl From<PropertyKey> for PropertyId {
    fn from(key: PropertyKey) -> Self {
        Self::plain(key)
    }
}

/// Typed property value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Real(f32),
    Int(i64),
    Bool(bool),
    Entity(EntityId),
    Asset(u64),
}

impl PropertyValue {
    pub fn as_real(self) -> f32 {
        match self {
            Self::Real(v) => v,
            Self::Int(v) => v as f32,
            Self::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Entity(_) | Self::Asset(_) => 0.0,
        }
    }

    pub fn as_int(self) -> i64 {
        match self {
            Self::Real(v) => v as i64,
            Self::Int(v) => v,
            Self::Bool(v) => i64::from(v),
            Self::Entity(_) | Self::Asset(_) => 0,
        }
    }

    pub fn as_bool(self) -> bool {
        match self {
            Self::Real(v) => v != 0.0,
            Self::Int(v) => v != 0,
            Self::Bool(v) => v,
            Self::Entity(id) => id.is_valid(),
            Self::Asset(v) => v != 0,
        }
    }
}

/// One entry of a [`PropertyCollection`], used as its serialized form.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyEntry {
    pub id: PropertyId,
    pub value: PropertyValue,
}

/// Owned, ordered property store.
///
/// Payloads and conditions hold their own collection so later changes to the
/// live entity never leak into a calculation already in flight. Iteration is
/// ordered by `(key, param)` and therefore deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<PropertyEntry>", into = "Vec<PropertyEntry>")
)]
pub struct PropertyCollection {
    values: BTreeMap<PropertyId, PropertyValue>,
}

impl PropertyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, id: impl Into<PropertyId>) -> Option<PropertyValue> {
        self.values.get(&id.into()).copied()
    }

    pub fn contains(&self, id: impl Into<PropertyId>) -> bool {
        self.values.contains_key(&id.into())
    }

    /// Real value, or the key's default when unset.
    pub fn real(&self, id: impl Into<PropertyId>) -> f32 {
        let id = id.into();
        self.values
            .get(&id)
            .map_or(id.key.default_real(), |v| v.as_real())
    }

    pub fn int(&self, id: impl Into<PropertyId>) -> i64 {
        self.get(id).map_or(0, PropertyValue::as_int)
    }

    pub fn flag(&self, id: impl Into<PropertyId>) -> bool {
        self.get(id).is_some_and(PropertyValue::as_bool)
    }

    pub fn entity(&self, id: impl Into<PropertyId>) -> Option<EntityId> {
        match self.get(id) {
            Some(PropertyValue::Entity(entity)) if entity.is_valid() => Some(entity),
            _ => None,
        }
    }

    pub fn set(&mut self, id: impl Into<PropertyId>, value: PropertyValue) {
        self.values.insert(id.into(), value);
    }

    pub fn set_real(&mut self, id: impl Into<PropertyId>, value: f32) {
        self.set(id, PropertyValue::Real(value));
    }

    pub fn set_int(&mut self, id: impl Into<PropertyId>, value: i64) {
        self.set(id, PropertyValue::Int(value));
    }

    pub fn set_flag(&mut self, id: impl Into<PropertyId>, value: bool) {
        self.set(id, PropertyValue::Bool(value));
    }

    /// Adds to a real value, starting from the key's default.
    pub fn add_real(&mut self, id: impl Into<PropertyId>, delta: f32) {
        let id = id.into();
        let current = self.real(id);
        self.values.insert(id, PropertyValue::Real(current + delta));
    }

    pub fn remove(&mut self, id: impl Into<PropertyId>) -> Option<PropertyValue> {
        self.values.remove(&id.into())
    }

    /// Every set value of `key`, in parameter order.
    pub fn params(&self, key: PropertyKey) -> impl Iterator<Item = (u32, PropertyValue)> + '_ {
        self.values
            .range(PropertyId::new(key, 0)..=PropertyId::new(key, u32::MAX))
            .map(|(id, value)| (id.param, *value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, PropertyValue)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    /// Copies every parameter of each listed key from `source`.
    pub fn copy_keys_from(&mut self, source: &PropertyCollection, keys: &[PropertyKey]) {
        for &key in keys {
            for (param, value) in source.params(key) {
                self.values.insert(PropertyId::new(key, param), value);
            }
        }
    }

    /// Overwrites this collection with every value of `other`.
    pub fn merge(&mut self, other: &PropertyCollection) {
        self.values
            .extend(other.values.iter().map(|(id, value)| (*id, *value)));
    }
}

impl From<Vec<PropertyEntry>> for PropertyCollection {
    fn from(entries: Vec<PropertyEntry>) -> Self {
        Self {
            values: entries.into_iter().map(|e| (e.id, e.value)).collect(),
        }
    }
}

impl From<PropertyCollection> for Vec<PropertyEntry> {
    fn from(collection: PropertyCollection) -> Self {
        collection
            .values
            .into_iter()
            .map(|(id, value)| PropertyEntry { id, value })
            .collect()
    }
}

impl FromIterator<(PropertyId, PropertyValue)> for PropertyCollection {
    fn from_iter<T: IntoIterator<Item = (PropertyId, PropertyValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::DamageType;

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let props = PropertyCollection::new();
        assert_eq!(props.real(PropertyKey::DamageTuningScore), 1.0);
        assert_eq!(props.real(PropertyKey::DamageMult), 0.0);
        assert!(!props.flag(PropertyKey::NoLootDrop));
        assert_eq!(props.entity(PropertyKey::BounceFirstTarget), None);
    }

    #[test]
    fn params_iterates_only_the_requested_key() {
        let mut props = PropertyCollection::new();
        props.set_real(PropertyId::new(PropertyKey::DamageBase, DamageType::Energy.param()), 5.0);
        props.set_real(PropertyId::new(PropertyKey::DamageBase, DamageType::Physical.param()), 7.0);
        props.set_real(PropertyId::new(PropertyKey::DamageBaseBonus, 0), 3.0);

        let params: Vec<_> = props
            .params(PropertyKey::DamageBase)
            .map(|(param, value)| (param, value.as_real()))
            .collect();
        assert_eq!(params, vec![(0, 7.0), (1, 5.0)]);
    }

    #[test]
    fn copy_keys_takes_all_params() {
        let mut owner = PropertyCollection::new();
        owner.set_real(PropertyId::new(PropertyKey::DamagePct, 0), 0.2);
        owner.set_real(PropertyId::new(PropertyKey::DamagePct, 3), 0.1);
        owner.set_real(PropertyKey::HealthMax, 900.0);

        let mut snapshot = PropertyCollection::new();
        snapshot.copy_keys_from(&owner, &[PropertyKey::DamagePct]);
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains(PropertyKey::HealthMax));
    }

    #[test]
    fn add_real_starts_from_default() {
        let mut props = PropertyCollection::new();
        props.add_real(PropertyKey::HealingMagnitude, 0.5);
        assert_eq!(props.real(PropertyKey::HealingMagnitude), 1.5);
    }
}
