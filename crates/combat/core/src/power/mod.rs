//! Powers: immutable definitions, per-owner instances and activation requests.
mod application;
mod collection;
mod definition;
mod instance;

pub use application::PowerApplication;
pub use collection::{PowerCollection, PowerError, Unassigned};
pub use definition::{
    ActivationRequirement, ActivationType, BounceProfile, ConditionRef, DamageProfile,
    HealingProfile, KnockbackProfile, LosRequirement, PowerDefinition, PowerFlags,
    ResourceAmount, SummonProfile, TargetingStyle,
};
pub use instance::{PowerInstance, TrackedCondition};
