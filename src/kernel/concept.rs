//! Formal concepts: Galois-closed (extent, intent) pairs.
//!
//! A formal concept `(A, B)` is a set of objects `A` and a set of attributes
//! `B` such that `A` is exactly the set of objects having every attribute in
//! `B`, and `B` is exactly the set of attributes shared by every object in
//! `A`. `A` is the extent, `B` the intent.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::relation::{Axis, Relation, RelationHash};
use crate::error::{LatticeError, Result};

/// An immutable formal concept.
///
/// Equality and hashing look at the extent index set only. Order
/// comparisons go through [`Concept::try_le`] and friends, which refuse to
/// compare concepts of different relations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Concept {
    extent: Vec<usize>,
    extent_names: Vec<String>,
    intent: Vec<usize>,
    intent_names: Vec<String>,
    relation_hash: RelationHash,
    /// When set, a smaller extent means a bigger concept.
    monotone: bool,
}

impl Concept {
    /// Build a concept from index sets, taking names and hash from `relation`.
    ///
    /// The caller is responsible for `(extent, intent)` being closed in
    /// `relation`; indices are sorted and deduplicated here.
    pub fn new<R: Relation + ?Sized>(extent: Vec<usize>, intent: Vec<usize>, relation: &R) -> Self {
        let extent = normalized(extent);
        let intent = normalized(intent);
        let extent_names = extent
            .iter()
            .map(|&g| relation.name(Axis::Objects, g).to_string())
            .collect();
        let intent_names = intent
            .iter()
            .map(|&m| relation.name(Axis::Attributes, m).to_string())
            .collect();
        Self {
            extent,
            extent_names,
            intent,
            intent_names,
            relation_hash: relation.content_hash(),
            monotone: false,
        }
    }

    /// Flip the order direction: smaller extent, bigger concept.
    pub fn with_monotone(mut self, monotone: bool) -> Self {
        self.monotone = monotone;
        self
    }

    pub fn extent(&self) -> &[usize] {
        &self.extent
    }

    pub fn intent(&self) -> &[usize] {
        &self.intent
    }

    pub fn extent_names(&self) -> &[String] {
        &self.extent_names
    }

    pub fn intent_names(&self) -> &[String] {
        &self.intent_names
    }

    pub fn relation_hash(&self) -> RelationHash {
        self.relation_hash
    }

    pub fn is_monotone(&self) -> bool {
        self.monotone
    }

    /// Number of objects in the extent.
    pub fn support(&self) -> usize {
        self.extent.len()
    }

    /// Equality that refuses to compare across relations.
    pub fn try_eq(&self, other: &Concept) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.extent == other.extent)
    }

    /// `self <= other` in the concept order.
    pub fn try_le(&self, other: &Concept) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.le_unchecked(other))
    }

    /// `self < other` in the concept order.
    pub fn try_lt(&self, other: &Concept) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.lt_unchecked(other))
    }

    /// Both concepts come from the same relation and share the order direction.
    pub fn check_comparable(&self, other: &Concept) -> Result<()> {
        if self.relation_hash != other.relation_hash {
            return Err(LatticeError::UnmatchedRelation {
                left: self.relation_hash,
                right: other.relation_hash,
            });
        }
        if self.monotone != other.monotone {
            return Err(LatticeError::UnmatchedMonotonicity);
        }
        Ok(())
    }

    /// Order test without the relation check; the lattice validates hashes
    /// once on entry and compares through its own epoch afterwards.
    pub(crate) fn le_unchecked(&self, other: &Concept) -> bool {
        let (lesser, greater) = if self.monotone {
            (other, self)
        } else {
            (self, other)
        };
        lesser.support() <= greater.support() && is_subset(&lesser.extent, &greater.extent)
    }

    pub(crate) fn lt_unchecked(&self, other: &Concept) -> bool {
        self.support() != other.support() && self.le_unchecked(other)
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.extent == other.extent
    }
}

impl Eq for Concept {}

impl Hash for Concept {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.extent.hash(state);
    }
}

/// Sort and deduplicate an index set.
pub(crate) fn normalized(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Is sorted `a` a subset of sorted `b`?
pub(crate) fn is_subset(a: &[usize], b: &[usize]) -> bool {
    if a.len() > b.len() {
        return false;
    }
    let mut rest = b.iter();
    'outer: for x in a {
        for y in rest.by_ref() {
            if y == x {
                continue 'outer;
            }
            if y > x {
                return false;
            }
        }
        return false;
    }
    true
}

/// Elements of sorted `a` that are not in sorted `b`.
pub(crate) fn difference(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .copied()
        .filter(|x| b.binary_search(x).is_err())
        .collect()
}
