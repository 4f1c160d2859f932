use super::definition::ConditionType;
use super::instance::Condition;
use crate::property::{PropertyId, PropertyKey};
use crate::state::{KeywordId, PowerId};

/// Condition removal requested by a power. Filters are unioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalFilter {
    /// Conditions created by `power`, oldest first, at most `max_stacks` of them.
    ByPower {
        power: PowerId,
        #[cfg_attr(feature = "serde", serde(default))]
        max_stacks: Option<u32>,
    },
    ByKeyword(KeywordId),
    /// Conditions whose own properties set the flag.
    ByProperty {
        key: PropertyKey,
        #[cfg_attr(feature = "serde", serde(default))]
        param: u32,
    },
    ByType(ConditionType),
}

impl RemovalFilter {
    pub fn matches(&self, condition: &Condition) -> bool {
        match *self {
            Self::ByPower { power, .. } => condition.power == power,
            Self::ByKeyword(keyword) => condition.keywords.contains(keyword),
            Self::ByProperty { key, param } => {
                condition.properties.flag(PropertyId::new(key, param))
            }
            Self::ByType(condition_type) => condition.condition_type == condition_type,
        }
    }

    /// Cap on matches this filter may schedule.
    pub fn limit(&self) -> Option<usize> {
        match *self {
            Self::ByPower { max_stacks, .. } => max_stacks.map(|n| n as usize),
            _ => None,
        }
    }
}
