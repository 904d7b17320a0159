//! Shared registry of operators.
//!
//! Elements and faces store an [`OperatorKey`] index only; the matrices are
//! built once per (shape, order, point set) and read concurrently afterwards.

use std::collections::HashMap;
use std::ops::Index;

use tracing::debug;

use super::Operators;
use crate::config::PointSet;
use crate::error::Result;
use crate::geometry::ElementShape;

/// Handle to an entry of an [`OperatorLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperatorKey(usize);

/// Operators indexed by element shape, order and point family.
#[derive(Clone, Default)]
pub struct OperatorLibrary {
    ops: Vec<Operators>,
    lookup: HashMap<(ElementShape, usize, PointSet), OperatorKey>,
}

impl OperatorLibrary {
    /// Empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for the requested operators, building them on first use.
    pub fn get_or_build(
        &mut self,
        shape: ElementShape,
        order: usize,
        point_set: PointSet,
    ) -> Result<OperatorKey> {
        if let Some(&key) = self.lookup.get(&(shape, order, point_set)) {
            return Ok(key);
        }
        debug!(?shape, order, ?point_set, "building operators");
        let ops = Operators::new(shape, order, point_set)?;
        let key = OperatorKey(self.ops.len());
        self.ops.push(ops);
        self.lookup.insert((shape, order, point_set), key);
        Ok(key)
    }

    /// Look up existing operators.
    pub fn find(&self, shape: ElementShape, order: usize, point_set: PointSet) -> Option<&Operators> {
        self.lookup
            .get(&(shape, order, point_set))
            .map(|&key| &self.ops[key.0])
    }

    /// Number of distinct operator sets.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Index<OperatorKey> for OperatorLibrary {
    type Output = Operators;

    fn index(&self, key: OperatorKey) -> &Operators {
        &self.ops[key.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_are_shared() {
        let mut lib = OperatorLibrary::new();
        let a = lib.get_or_build(ElementShape::Quad, 2, PointSet::Legendre).unwrap();
        let b = lib.get_or_build(ElementShape::Quad, 2, PointSet::Legendre).unwrap();
        let c = lib.get_or_build(ElementShape::Quad, 3, PointSet::Legendre).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib[c].order, 3);
        assert!(lib.find(ElementShape::Hex, 2, PointSet::Legendre).is_none());
    }

    #[test]
    fn test_unsupported_shape_propagates() {
        let mut lib = OperatorLibrary::new();
        assert!(lib.get_or_build(ElementShape::Tet, 1, PointSet::Legendre).is_err());
        assert!(lib.is_empty());
    }
}
