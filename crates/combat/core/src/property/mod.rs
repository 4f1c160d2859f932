//! Typed property store.
//!
//! Entities, payloads and conditions describe their numbers through
//! [`PropertyCollection`]s addressed by [`PropertyKey`] plus an integer
//! parameter (damage type, mana type, keyword or power id).
mod collection;
mod key;

pub use collection::{PropertyCollection, PropertyEntry, PropertyId, PropertyValue};
pub use key::{DamageType, ManaType, PropertyKey};
