use std::collections::{BTreeMap, BTreeSet};

use super::error::ConditionError;
use super::instance::{Condition, OwnerLink, PendingCondition};
use super::removal::RemovalFilter;
use super::stack::{
    ConditionRefresh, StackApplicationData, StackEntry, StackId, StackingBehavior,
    resolve_stacking,
};
use crate::results::PowerResults;
use crate::state::{ConditionId, EntityId, PowerId, TimeMs};

/// Condition added by [`ConditionCollection::apply_results`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddedCondition {
    pub id: ConditionId,
    /// Register with the owning power so it can cancel the condition later.
    pub owner_link: Option<OwnerLink>,
}

/// Outcome of applying one [`PowerResults`] to a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub removed: Vec<ConditionId>,
    pub refreshed: Vec<ConditionId>,
    pub added: Vec<AddedCondition>,
    pub rejected: Vec<ConditionError>,
    /// A negative status was refreshed; the target is notified once.
    pub negative_status_notified: bool,
}

/// Per-entity ledger of live conditions.
///
/// Ids are unique within the collection and strictly increasing, so id order
/// is creation order.
#[derive(Clone, Debug)]
pub struct ConditionCollection {
    owner: EntityId,
    conditions: BTreeMap<ConditionId, Condition>,
    next_id: u64,
}

impl ConditionCollection {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            conditions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }

    /// Live stacks under `stack_id`, oldest first.
    pub fn stacks<'a>(&'a self, stack_id: &'a StackId) -> impl Iterator<Item = &'a Condition> {
        self.conditions
            .values()
            .filter(move |condition| condition.stack_id == *stack_id)
    }

    pub fn stack_count(&self, stack_id: &StackId) -> u32 {
        self.stacks(stack_id).count() as u32
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Adds a condition, enforcing its stack cap.
    pub fn add(
        &mut self,
        pending: PendingCondition,
        now: TimeMs,
    ) -> Result<ConditionId, ConditionError> {
        let live = self.stack_count(&pending.stack_id);
        if live >= pending.max_stacks {
            return Err(ConditionError::StackCapExceeded {
                stack: pending.stack_id,
                live,
                max: pending.max_stacks,
            });
        }
        let id = ConditionId(self.next_id);
        self.next_id += 1;
        self.conditions
            .insert(id, Condition::from_pending(id, pending, now));
        Ok(id)
    }

    /// Re-inserts a condition with its original id (e.g. after a region transfer).
    pub fn restore(&mut self, condition: Condition) -> Result<(), ConditionError> {
        if self.conditions.contains_key(&condition.id) {
            return Err(ConditionError::DuplicateId(condition.id));
        }
        self.next_id = self.next_id.max(condition.id.0 + 1);
        self.conditions.insert(condition.id, condition);
        Ok(())
    }

    pub fn remove(&mut self, id: ConditionId) -> Result<Condition, ConditionError> {
        self.conditions.remove(&id).ok_or(ConditionError::NotFound {
            owner: self.owner,
            id,
        })
    }

    /// Applies a duration refresh. Sets `notified` the first time a negative
    /// status is refreshed and returns true only for that call.
    pub fn refresh(
        &mut self,
        refresh: &ConditionRefresh,
        now: TimeMs,
        notified: &mut bool,
    ) -> Result<bool, ConditionError> {
        let owner = self.owner;
        let condition = self
            .conditions
            .get_mut(&refresh.id)
            .ok_or(ConditionError::NotFound {
                owner,
                id: refresh.id,
            })?;
        condition.apply_refresh(refresh, now);
        if condition.is_negative_status() && !*notified {
            *notified = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Removes every condition that has run out at `now`.
    pub fn remove_expired(&mut self, now: TimeMs) -> Vec<Condition> {
        let expired: Vec<ConditionId> = self
            .conditions
            .values()
            .filter(|condition| condition.is_expired(now))
            .map(|condition| condition.id)
            .collect();
        self.take_all(&expired)
    }

    /// Removes every condition `owner` created with `power`.
    pub fn remove_from_power(&mut self, owner: EntityId, power: PowerId) -> Vec<Condition> {
        let matching: Vec<ConditionId> = self
            .conditions
            .values()
            .filter(|condition| condition.creator == owner && condition.power == power)
            .map(|condition| condition.id)
            .collect();
        self.take_all(&matching)
    }

    fn take_all(&mut self, ids: &[ConditionId]) -> Vec<Condition> {
        ids.iter()
            .filter_map(|id| self.conditions.remove(id))
            .collect()
    }

    // ========================================================================
    // Decisions (read-only)
    // ========================================================================

    /// Ids matched by any of `filters`, ascending.
    pub fn collect_removals(&self, filters: &[RemovalFilter]) -> Vec<ConditionId> {
        let mut ids = BTreeSet::new();
        for filter in filters {
            let matches = self
                .conditions
                .values()
                .filter(|condition| filter.matches(condition))
                .map(|condition| condition.id);
            match filter.limit() {
                Some(limit) => ids.extend(matches.take(limit)),
                None => ids.extend(matches),
            }
        }
        ids.into_iter().collect()
    }

    /// Live stacks under `stack_id` not listed in `excluded`, oldest first.
    pub fn stack_entries(
        &self,
        stack_id: &StackId,
        now: TimeMs,
        excluded: &[ConditionId],
    ) -> Vec<StackEntry> {
        self.stacks(stack_id)
            .filter(|condition| !excluded.contains(&condition.id))
            .map(|condition| StackEntry {
                id: condition.id,
                remaining_ms: condition.remaining_ms(now).unwrap_or(0),
                infinite: condition.is_infinite(),
            })
            .collect()
    }

    /// Stacking decisions for one application; does not mutate.
    pub fn stack_application_data(
        &self,
        stack_id: &StackId,
        behavior: &StackingBehavior,
        power_rank: u32,
        rolled_duration_ms: u64,
        now: TimeMs,
        excluded: &[ConditionId],
    ) -> StackApplicationData {
        let entries = self.stack_entries(stack_id, now, excluded);
        resolve_stacking(&entries, behavior, power_rank, rolled_duration_ms)
    }

    // ========================================================================
    // Result application
    // ========================================================================

    /// Applies the condition changes of `results`: removals, then refreshes,
    /// then additions.
    ///
    /// Stale ids (already expired or removed) are reported in `rejected`
    /// rather than failing the whole application.
    pub fn apply_results(&mut self, results: &PowerResults, now: TimeMs) -> ApplyReport {
        let mut report = ApplyReport::default();

        for &id in &results.conditions_to_remove {
            match self.remove(id) {
                Ok(_) => report.removed.push(id),
                Err(error) => {
                    tracing::debug!(%error, "skipping stale condition removal");
                    report.rejected.push(error);
                }
            }
        }

        let mut notified = false;
        for refresh in &results.conditions_to_refresh {
            match self.refresh(refresh, now, &mut notified) {
                Ok(_) => report.refreshed.push(refresh.id),
                Err(error) => {
                    tracing::debug!(%error, "skipping stale condition refresh");
                    report.rejected.push(error);
                }
            }
        }
        report.negative_status_notified = notified;

        for pending in &results.conditions_to_add {
            let owner_link = pending.owner_link;
            match self.add(pending.clone(), now) {
                Ok(id) => report.added.push(AddedCondition { id, owner_link }),
                Err(error) => {
                    tracing::warn!(%error, entity = %self.owner, "condition rejected");
                    report.rejected.push(error);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::condition::{ConditionFlags, ConditionType, RefreshMode};
    use crate::property::{PropertyCollection, PropertyKey};
    use crate::state::{ConditionDefId, KeywordId, KeywordSet};

    fn stack() -> StackId {
        StackId {
            power: PowerId(1),
            condition: ConditionDefId(10),
            ultimate_owner: EntityId(5),
            creator_player: EntityId(5),
        }
    }

    fn pending(duration_ms: u64, max_stacks: u32) -> PendingCondition {
        PendingCondition {
            definition: ConditionDefId(10),
            power: PowerId(1),
            creator: EntityId(5),
            ultimate_creator: EntityId(5),
            stack_id: stack(),
            condition_type: ConditionType::Status,
            keywords: KeywordSet::from_keywords([KeywordId(4)]),
            flags: ConditionFlags::NEGATIVE_STATUS,
            duration_ms,
            max_stacks,
            properties: Arc::new(PropertyCollection::new()),
            owner_link: None,
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        let a = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let b = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        conditions.remove(a).unwrap();
        let c = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn add_enforces_stack_cap() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        conditions.add(pending(100, 1), TimeMs(0)).unwrap();
        let err = conditions.add(pending(100, 1), TimeMs(0)).unwrap_err();
        assert!(matches!(err, ConditionError::StackCapExceeded { live: 1, max: 1, .. }));
    }

    #[test]
    fn expiry_sweep_keeps_infinite_conditions() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let infinite = conditions.add(pending(0, 5), TimeMs(0)).unwrap();
        let expired = conditions.remove_expired(TimeMs(100));
        assert_eq!(expired.len(), 1);
        assert!(conditions.get(infinite).is_some());
    }

    #[test]
    fn removal_filters_union_and_cap() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        let a = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let b = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let ids = conditions.collect_removals(&[RemovalFilter::ByPower {
            power: PowerId(1),
            max_stacks: Some(1),
        }]);
        assert_eq!(ids, vec![a]);

        let ids = conditions.collect_removals(&[
            RemovalFilter::ByPower {
                power: PowerId(1),
                max_stacks: Some(1),
            },
            RemovalFilter::ByKeyword(KeywordId(4)),
        ]);
        assert_eq!(ids, vec![a, b]);

        let ids = conditions.collect_removals(&[RemovalFilter::ByProperty {
            key: PropertyKey::ConditionTag,
            param: 2,
        }]);
        assert!(ids.is_empty());
    }

    #[test]
    fn negative_status_notifies_once() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        let a = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let b = conditions.add(pending(100, 5), TimeMs(0)).unwrap();
        let mut notified = false;
        let reset = |id| ConditionRefresh {
            id,
            duration_ms: 500,
            mode: RefreshMode::Reset,
        };
        assert!(conditions.refresh(&reset(a), TimeMs(50), &mut notified).unwrap());
        assert!(!conditions.refresh(&reset(b), TimeMs(50), &mut notified).unwrap());
        assert_eq!(conditions.get(a).unwrap().remaining_ms(TimeMs(50)), Some(500));
    }

    #[test]
    fn remove_from_power_matches_creator() {
        let mut conditions = ConditionCollection::new(EntityId(9));
        conditions.add(pending(0, 5), TimeMs(0)).unwrap();
        assert!(conditions.remove_from_power(EntityId(6), PowerId(1)).is_empty());
        assert_eq!(conditions.remove_from_power(EntityId(5), PowerId(1)).len(), 1);
        assert!(conditions.is_empty());
    }
}
