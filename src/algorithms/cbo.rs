//! Close-by-One: duplicate-free enumeration of every closed set.
//!
//! The enumeration walks index combinations on one axis (the "iteration
//! side"). Every combination is closed with one derivation round-trip;
//! a closure is accepted only through its canonical generating path
//! (no newly added element is smaller than the combination's last element)
//! and only the first time it is seen. Accepted closures are extended by
//! every larger index not already inside them.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::algorithms::cbo::{close_by_one, CbOParams};
//! use concept_lattice::FormalContext;
//!
//! let ctx = FormalContext::new(vec![
//!     vec![true, false, true],
//!     vec![false, true, true],
//! ])?;
//! let raw = close_by_one(&ctx, &CbOParams::default())?;
//! assert_eq!(raw.len(), 4);
//! assert!(raw.extents.contains(&vec![0, 1]));
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use std::collections::HashSet;

use tracing::debug;

use crate::error::{LatticeError, Result};
use crate::kernel::{Axis, Concept, Relation, RelationKind};

/// Knobs for a Close-by-One run.
///
/// `seeds` and `restrict` are expressed on the iteration side, so they
/// require an explicit `iterate_extents`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CbOParams {
    /// Iterate object sets (`true`) or attribute sets (`false`).
    /// Defaults to the smaller side for binary relations and to objects
    /// otherwise.
    pub iterate_extents: Option<bool>,
    /// Combinations to start from instead of the empty one
    pub seeds: Option<Vec<Vec<usize>>>,
    /// Indices allowed to extend a combination
    pub restrict: Option<Vec<usize>>,
}

impl CbOParams {
    /// Enumerate along an explicit direction.
    pub fn directed(iterate_extents: bool) -> Self {
        Self {
            iterate_extents: Some(iterate_extents),
            ..Self::default()
        }
    }

    pub fn with_seeds(mut self, seeds: Vec<Vec<usize>>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn with_restrict(mut self, restrict: Vec<usize>) -> Self {
        self.restrict = Some(restrict);
        self
    }
}

/// Closed pairs in index form, `extents[i]` paired with `intents[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawConcepts {
    pub extents: Vec<Vec<usize>>,
    pub intents: Vec<Vec<usize>>,
}

impl RawConcepts {
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Iterate `(extent, intent)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&[usize], &[usize])> {
        self.extents
            .iter()
            .zip(&self.intents)
            .map(|(e, i)| (e.as_slice(), i.as_slice()))
    }
}

/// Resolve the iteration direction for `relation`.
///
/// General relations only derive intents from object sets, so they can
/// only be enumerated along extents.
pub(crate) fn resolve_direction<R: Relation + ?Sized>(
    relation: &R,
    requested: Option<bool>,
) -> Result<bool> {
    match (relation.kind(), requested) {
        (RelationKind::General, Some(false)) => Err(LatticeError::TypeMismatch(
            "attribute-side iteration needs a binary relation".to_string(),
        )),
        (RelationKind::General, _) => Ok(true),
        (RelationKind::Binary, Some(direction)) => Ok(direction),
        (RelationKind::Binary, None) => Ok(relation.object_count() < relation.attribute_count()),
    }
}

fn check_indices(sets: &[Vec<usize>], len: usize) -> Result<()> {
    match sets.iter().flatten().find(|&&i| i >= len) {
        Some(&index) => Err(LatticeError::IndexOutOfRange { index, len }),
        None => Ok(()),
    }
}

/// Enumerate closed pairs of `relation` by Close-by-One.
///
/// Work items are processed depth-first; every closed set is reported once.
pub fn close_by_one<R: Relation + ?Sized>(relation: &R, params: &CbOParams) -> Result<RawConcepts> {
    if params.iterate_extents.is_none() && (params.seeds.is_some() || params.restrict.is_some()) {
        return Err(LatticeError::Configuration(
            "seeds and restrict indices need an explicit iterate_extents".to_string(),
        ));
    }
    let iterate_extents = resolve_direction(relation, params.iterate_extents)?;
    let axis = if iterate_extents {
        Axis::Objects
    } else {
        Axis::Attributes
    };
    let n = relation.count(axis);

    let candidates: Vec<usize> = match &params.restrict {
        Some(restrict) => {
            check_indices(std::slice::from_ref(restrict), n)?;
            restrict.clone()
        }
        None => (0..n).collect(),
    };
    // Stack: the first seed must be popped first
    let mut stack: Vec<Vec<usize>> = match &params.seeds {
        Some(seeds) => {
            check_indices(seeds, n)?;
            seeds.iter().rev().cloned().collect()
        }
        None => vec![Vec::new()],
    };

    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut itersets = Vec::new();
    let mut sidesets = Vec::new();
    let mut tested = 0usize;

    while let Some(combination) = stack.pop() {
        tested += 1;
        let mut members = combination.clone();
        members.sort_unstable();
        members.dedup();

        let sideset = relation.derive(axis, &members);
        let closed = relation.derive(axis.dual(), &sideset);

        if let Some(&last) = combination.last() {
            let canonical = closed
                .iter()
                .all(|x| *x > last || members.binary_search(x).is_ok());
            if !canonical {
                continue;
            }
        }
        if seen.contains(&closed) {
            continue;
        }
        seen.insert(closed.clone());

        for &g in candidates.iter().rev() {
            let above_last = combination.last().map_or(true, |&last| g > last);
            if above_last && closed.binary_search(&g).is_err() {
                let mut next = closed.clone();
                next.push(g);
                stack.push(next);
            }
        }
        itersets.push(closed);
        sidesets.push(sideset);
    }

    debug!(
        iterate_extents,
        tested,
        found = itersets.len(),
        "close-by-one finished"
    );

    Ok(if iterate_extents {
        RawConcepts {
            extents: itersets,
            intents: sidesets,
        }
    } else {
        RawConcepts {
            extents: sidesets,
            intents: itersets,
        }
    })
}

/// Enumerate the concepts of `relation`, with names and relation hash.
pub fn enumerate_concepts<R: Relation + ?Sized>(
    relation: &R,
    params: &CbOParams,
) -> Result<Vec<Concept>> {
    let raw = close_by_one(relation, params)?;
    Ok(raw
        .extents
        .into_iter()
        .zip(raw.intents)
        .map(|(extent, intent)| Concept::new(extent, intent, relation))
        .collect())
}
