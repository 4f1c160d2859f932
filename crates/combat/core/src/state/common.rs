use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for any entity known to the world.
    EntityId(u64),
    "#"
);
define_id!(
    /// Identifier of a power definition in the catalog.
    PowerId(u32),
    "power:"
);
define_id!(
    /// Identifier of a condition definition in the catalog.
    ConditionDefId(u32),
    "condition:"
);
define_id!(
    /// Identifier of a live condition, scoped to one [`crate::ConditionCollection`].
    ConditionId(u64),
    "cond#"
);
define_id!(
    /// Identifier of a curve served by the curve oracle.
    CurveId(u32),
    "curve:"
);
define_id!(
    /// Alliance (faction) an entity fights for.
    AllianceId(u32),
    "alliance:"
);
define_id!(
    /// Region an entity currently occupies.
    RegionId(u32),
    "region:"
);

impl EntityId {
    /// Reserved "no entity" value.
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

/// World-space position (or direction) in game units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn length_2d(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Distance on the ground plane, ignoring height.
    pub fn distance_2d(self, other: Self) -> f32 {
        (other - self).length_2d()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Same position projected onto the ground plane.
    pub fn flattened(self) -> Self {
        Self::new(self.x, self.y, 0.0)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f32) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Game time in milliseconds, driven by the world's tick loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for TimeMs {
    type Output = TimeMs;
    fn add(self, rhs: u64) -> TimeMs {
        TimeMs(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Data-driven keyword (e.g. "Melee", "Fire", "Stun").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct KeywordId(pub u8);

impl KeywordId {
    /// Keywords are packed into a 64-bit mask.
    pub const MAX: u8 = 63;
}

/// Bitmask of keywords carried by a power or condition.
///
/// Data files list keywords by id; the mask is what gets copied into payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<KeywordId>", into = "Vec<KeywordId>")
)]
pub struct KeywordSet(u64);

impl KeywordSet {
    pub const EMPTY: Self = Self(0);

    pub fn from_keywords(keywords: impl IntoIterator<Item = KeywordId>) -> Self {
        let mut set = Self::EMPTY;
        for keyword in keywords {
            set.insert(keyword);
        }
        set
    }

    pub fn insert(&mut self, keyword: KeywordId) {
        debug_assert!(keyword.0 <= KeywordId::MAX, "keyword {keyword:?} out of range");
        self.0 |= 1u64 << (keyword.0 & KeywordId::MAX);
    }

    pub fn contains(self, keyword: KeywordId) -> bool {
        keyword.0 <= KeywordId::MAX && self.0 & (1u64 << keyword.0) != 0
    }

    pub fn intersects(self, other: KeywordSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Iterates keywords in ascending id order.
    pub fn iter(self) -> impl Iterator<Item = KeywordId> {
        (0..=KeywordId::MAX)
            .filter(move |bit| self.0 & (1u64 << bit) != 0)
            .map(KeywordId)
    }
}

impl From<Vec<KeywordId>> for KeywordSet {
    fn from(keywords: Vec<KeywordId>) -> Self {
        Self::from_keywords(keywords)
    }
}

impl From<KeywordSet> for Vec<KeywordId> {
    fn from(set: KeywordSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<KeywordId> for KeywordSet {
    fn from_iter<T: IntoIterator<Item = KeywordId>>(iter: T) -> Self {
        Self::from_keywords(iter)
    }
}

/// Rank of an entity for rank-specific bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rank {
    #[default]
    Normal,
    Elite,
    MiniBoss,
    Boss,
}

impl Rank {
    /// Returns true for ranks that receive boss-specific damage bonuses.
    pub const fn is_boss(self) -> bool {
        matches!(self, Rank::MiniBoss | Rank::Boss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_set_iterates_in_order() {
        let set = KeywordSet::from_keywords([KeywordId(9), KeywordId(2), KeywordId(63)]);
        let keywords: Vec<_> = set.iter().collect();
        assert_eq!(keywords, vec![KeywordId(2), KeywordId(9), KeywordId(63)]);
        assert!(set.contains(KeywordId(9)));
        assert!(!set.contains(KeywordId(3)));
    }

    #[test]
    fn distance_2d_ignores_height() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 4.0, 100.0);
        assert_eq!(a.distance_2d(b), 5.0);
    }

    #[test]
    fn time_since_saturates() {
        assert_eq!(TimeMs(10).since(TimeMs(25)), 0);
        assert_eq!(TimeMs(25).since(TimeMs(10)), 15);
    }
}
