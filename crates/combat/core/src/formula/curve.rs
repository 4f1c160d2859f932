use std::collections::BTreeMap;

use crate::state::CurveId;

/// Integer-indexed lookup table (level curves, difficulty curves ...).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve {
    pub id: CurveId,
    /// Index of `values[0]`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_index: i32,
    pub values: Vec<f32>,
}

impl Curve {
    pub fn new(id: CurveId, min_index: i32, values: Vec<f32>) -> Self {
        Self {
            id,
            min_index,
            values,
        }
    }

    pub fn max_index(&self) -> i32 {
        self.min_index + self.values.len() as i32 - 1
    }

    /// Value at `index`, clamped to the table's ends. Empty curves yield zero.
    pub fn value_at(&self, index: i32) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let offset = index.saturating_sub(self.min_index).max(0) as usize;
        self.values[offset.min(self.values.len() - 1)]
    }
}

/// Serves curves by id.
pub trait CurveOracle: Send + Sync {
    fn curve(&self, id: CurveId) -> Option<&Curve>;

    /// Convenience lookup; `None` when the curve is unknown.
    fn lookup(&self, id: CurveId, index: i32) -> Option<f32> {
        self.curve(id).map(|curve| curve.value_at(index))
    }
}

/// In-memory curve directory.
#[derive(Clone, Debug, Default)]
pub struct CurveTable {
    curves: BTreeMap<CurveId, Curve>,
}

impl CurveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a curve, returning the one it replaced.
    pub fn insert(&mut self, curve: Curve) -> Option<Curve> {
        self.curves.insert(curve.id, curve)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CurveId> + '_ {
        self.curves.keys().copied()
    }
}

impl FromIterator<Curve> for CurveTable {
    fn from_iter<T: IntoIterator<Item = Curve>>(iter: T) -> Self {
        let mut table = Self::new();
        for curve in iter {
            table.insert(curve);
        }
        table
    }
}

impl CurveOracle for CurveTable {
    fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_clamps_both_ends() {
        let curve = Curve::new(CurveId(1), 1, vec![10.0, 20.0, 30.0]);
        assert_eq!(curve.value_at(-5), 10.0);
        assert_eq!(curve.value_at(1), 10.0);
        assert_eq!(curve.value_at(2), 20.0);
        assert_eq!(curve.value_at(3), 30.0);
        assert_eq!(curve.value_at(99), 30.0);
        assert_eq!(curve.max_index(), 3);
    }

    #[test]
    fn empty_curve_is_zero() {
        let curve = Curve::new(CurveId(2), 0, Vec::new());
        assert_eq!(curve.value_at(4), 0.0);
    }

    #[test]
    fn table_serves_by_id() {
        let table: CurveTable = [Curve::new(CurveId(5), 0, vec![1.0, 2.0])].into_iter().collect();
        assert_eq!(table.lookup(CurveId(5), 1), Some(2.0));
        assert_eq!(table.lookup(CurveId(6), 1), None);
    }
}
