//! Stacking policy resolution.
//!
//! Deciding what an application does to a stack group is a pure function of
//! the live stacks under its [`StackId`]. Mutation happens later, when the
//! collection applies the resulting remove and refresh lists.

use crate::config::CombatConfig;
use crate::state::{ConditionDefId, ConditionId, EntityId, PowerId};

/// Identity under which condition instances stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackId {
    pub power: PowerId,
    pub condition: ConditionDefId,
    pub ultimate_owner: EntityId,
    pub creator_player: EntityId,
}

/// How a new application interacts with existing stacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingStyle {
    /// Existing stacks untouched; new stacks only below the cap.
    DontRefresh,
    /// Existing stacks restart at the rolled duration; new stacks only below the cap.
    #[default]
    Replace,
    /// Oldest stacks make room for the new ones.
    Recreate,
    /// Existing and new stacks all last `max(rolled, longest remaining)`.
    MatchDuration,
    /// A single stack whose duration grows by each application.
    SingleStackAddDuration,
    /// Existing stacks grow by the rolled duration; new stacks last
    /// `rolled + longest remaining`, oldest removed at the cap.
    MultiStackAddDuration,
}

/// Stacking rules of a condition definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StackingBehavior {
    pub max_stacks: u32,
    /// Per power rank overrides of `max_stacks`; the last entry covers higher ranks.
    pub max_stacks_by_rank: Vec<u32>,
    pub style: StackingStyle,
    /// Stacks from different owners are tracked separately.
    pub stacks_by_owner: bool,
    pub stacks_per_application: u32,
}

impl Default for StackingBehavior {
    fn default() -> Self {
        Self {
            max_stacks: 1,
            max_stacks_by_rank: Vec::new(),
            style: StackingStyle::Replace,
            stacks_by_owner: true,
            stacks_per_application: 1,
        }
    }
}

impl StackingBehavior {
    pub fn new(style: StackingStyle, max_stacks: u32) -> Self {
        Self {
            style,
            max_stacks,
            ..Self::default()
        }
    }

    pub fn with_stacks_per_application(mut self, stacks: u32) -> Self {
        self.stacks_per_application = stacks;
        self
    }

    pub fn shared_between_owners(mut self) -> Self {
        self.stacks_by_owner = false;
        self
    }

    /// Effective cap for the applying power's rank, always in `1..=MAX_STACKS`.
    pub fn max_stacks_for_rank(&self, power_rank: u32) -> u32 {
        let cap = match self.max_stacks_by_rank.as_slice() {
            [] => self.max_stacks,
            ranks => ranks[(power_rank as usize).min(ranks.len() - 1)],
        };
        cap.clamp(1, CombatConfig::MAX_STACKS)
    }

    pub fn stack_id(
        &self,
        power: PowerId,
        condition: ConditionDefId,
        ultimate_owner: EntityId,
        creator_player: EntityId,
    ) -> StackId {
        if self.stacks_by_owner {
            StackId {
                power,
                condition,
                ultimate_owner,
                creator_player,
            }
        } else {
            StackId {
                power,
                condition,
                ultimate_owner: EntityId::INVALID,
                creator_player: EntityId::INVALID,
            }
        }
    }
}

/// In-place duration change of a live condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefreshMode {
    /// Restart the clock with the given duration.
    Reset,
    /// Add the given duration to what is left.
    Extend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionRefresh {
    pub id: ConditionId,
    pub duration_ms: u64,
    pub mode: RefreshMode,
}

/// A live stack as seen by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub id: ConditionId,
    /// Ignored when `infinite`.
    pub remaining_ms: u64,
    pub infinite: bool,
}

/// Decisions for one application against one stack group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackApplicationData {
    pub num_new_stacks: u32,
    /// Duration for the new stacks; zero means infinite.
    pub duration_ms: u64,
    /// Longest finite remaining duration before any refresh.
    pub longest_remaining_ms: u64,
    pub remove: Vec<ConditionId>,
    pub refresh: Vec<ConditionRefresh>,
}

/// Resolves one application against the live stacks of its group.
///
/// `existing` must be ordered oldest first. The result never leads to more
/// than the behavior's cap once `remove` has been applied.
pub fn resolve_stacking(
    existing: &[StackEntry],
    behavior: &StackingBehavior,
    power_rank: u32,
    rolled_duration_ms: u64,
) -> StackApplicationData {
    let max = behavior.max_stacks_for_rank(power_rank) as usize;
    let per_application = (behavior.stacks_per_application.max(1) as usize).min(max);
    let count = existing.len();
    let free = max.saturating_sub(count);
    let longest = existing
        .iter()
        .filter(|entry| !entry.infinite)
        .map(|entry| entry.remaining_ms)
        .max()
        .unwrap_or(0);
    let infinite = rolled_duration_ms == 0;

    let mut data = StackApplicationData {
        duration_ms: rolled_duration_ms,
        longest_remaining_ms: longest,
        ..StackApplicationData::default()
    };

    let reset_all = |entries: &[StackEntry], duration_ms: u64| -> Vec<ConditionRefresh> {
        entries
            .iter()
            .map(|entry| ConditionRefresh {
                id: entry.id,
                duration_ms,
                mode: RefreshMode::Reset,
            })
            .collect()
    };
    let extend_all = |entries: &[StackEntry]| -> Vec<ConditionRefresh> {
        if infinite {
            return Vec::new();
        }
        entries
            .iter()
            .filter(|entry| !entry.infinite)
            .map(|entry| ConditionRefresh {
                id: entry.id,
                duration_ms: rolled_duration_ms,
                mode: RefreshMode::Extend,
            })
            .collect()
    };

    let new_stacks = match behavior.style {
        StackingStyle::DontRefresh => per_application.min(free),

        StackingStyle::Replace => {
            data.refresh = reset_all(existing, rolled_duration_ms);
            per_application.min(free)
        }

        StackingStyle::Recreate => {
            let overflow = (count + per_application).saturating_sub(max).min(count);
            data.remove = existing[..overflow].iter().map(|e| e.id).collect();
            per_application
        }

        StackingStyle::MatchDuration => {
            let matched = if infinite {
                0
            } else {
                rolled_duration_ms.max(longest)
            };
            data.duration_ms = matched;
            data.refresh = reset_all(existing, matched);
            per_application.min(free)
        }

        StackingStyle::SingleStackAddDuration => match existing.split_first() {
            Some((first, rest)) => {
                data.remove = rest.iter().map(|e| e.id).collect();
                data.refresh = extend_all(std::slice::from_ref(first));
                0
            }
            None => 1,
        },

        StackingStyle::MultiStackAddDuration => {
            let overflow = (count + per_application).saturating_sub(max).min(count);
            data.remove = existing[..overflow].iter().map(|e| e.id).collect();
            data.refresh = extend_all(&existing[overflow..]);
            data.duration_ms = if infinite {
                0
            } else {
                rolled_duration_ms.saturating_add(longest)
            };
            per_application
        }
    };

    data.num_new_stacks = new_stacks as u32;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, remaining_ms: u64) -> StackEntry {
        StackEntry {
            id: ConditionId(id),
            remaining_ms,
            infinite: false,
        }
    }

    #[test]
    fn match_duration_keeps_the_longer_duration() {
        let behavior = StackingBehavior::new(StackingStyle::MatchDuration, 1);
        let first = resolve_stacking(&[], &behavior, 0, 5000);
        assert_eq!(first.num_new_stacks, 1);
        assert_eq!(first.duration_ms, 5000);

        let second = resolve_stacking(&[entry(1, 5000)], &behavior, 0, 2000);
        assert_eq!(second.num_new_stacks, 0);
        assert_eq!(
            second.refresh,
            vec![ConditionRefresh {
                id: ConditionId(1),
                duration_ms: 5000,
                mode: RefreshMode::Reset,
            }]
        );
    }

    #[test]
    fn multi_stack_add_duration_uses_pre_refresh_longest() {
        let behavior = StackingBehavior::new(StackingStyle::MultiStackAddDuration, 2);
        let data = resolve_stacking(&[entry(1, 1000), entry(2, 3000)], &behavior, 0, 2000);
        assert_eq!(data.remove, vec![ConditionId(1)]);
        assert_eq!(data.num_new_stacks, 1);
        assert_eq!(data.duration_ms, 5000);
        assert_eq!(data.longest_remaining_ms, 3000);
        assert_eq!(
            data.refresh,
            vec![ConditionRefresh {
                id: ConditionId(2),
                duration_ms: 2000,
                mode: RefreshMode::Extend,
            }]
        );
    }

    #[test]
    fn single_stack_add_duration_extends_in_place() {
        let behavior = StackingBehavior::new(StackingStyle::SingleStackAddDuration, 5);
        let data = resolve_stacking(&[entry(4, 700)], &behavior, 0, 300);
        assert_eq!(data.num_new_stacks, 0);
        assert_eq!(data.refresh.len(), 1);
        assert_eq!(data.refresh[0].mode, RefreshMode::Extend);
    }

    #[test]
    fn recreate_removes_oldest_first() {
        let behavior =
            StackingBehavior::new(StackingStyle::Recreate, 3).with_stacks_per_application(2);
        let data = resolve_stacking(
            &[entry(1, 10), entry(2, 20), entry(3, 30)],
            &behavior,
            0,
            100,
        );
        assert_eq!(data.remove, vec![ConditionId(1), ConditionId(2)]);
        assert_eq!(data.num_new_stacks, 2);
    }

    #[test]
    fn never_exceeds_cap() {
        let styles = [
            StackingStyle::DontRefresh,
            StackingStyle::Replace,
            StackingStyle::Recreate,
            StackingStyle::MatchDuration,
            StackingStyle::SingleStackAddDuration,
            StackingStyle::MultiStackAddDuration,
        ];
        for style in styles {
            let behavior = StackingBehavior::new(style, 3).with_stacks_per_application(2);
            let mut live: Vec<StackEntry> = Vec::new();
            let mut next = 1;
            for _ in 0..6 {
                let data = resolve_stacking(&live, &behavior, 0, 1000);
                live.retain(|e| !data.remove.contains(&e.id));
                for _ in 0..data.num_new_stacks {
                    live.push(entry(next, 1000));
                    next += 1;
                }
                assert!(live.len() <= 3, "{style} exceeded cap: {}", live.len());
            }
        }
    }

    #[test]
    fn rank_overrides_cap() {
        let behavior = StackingBehavior {
            max_stacks_by_rank: vec![1, 2, 4],
            ..StackingBehavior::default()
        };
        assert_eq!(behavior.max_stacks_for_rank(0), 1);
        assert_eq!(behavior.max_stacks_for_rank(1), 2);
        assert_eq!(behavior.max_stacks_for_rank(9), 4);
    }
}
