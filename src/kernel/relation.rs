//! Relation capability trait.
//!
//! Every algorithm in the crate talks to its input through [`Relation`]: two
//! derivation operators (`objects_sharing`, `attributes_shared_by`), names,
//! a content hash and projection. Storage layout is the implementor's business.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::{Axis, FormalContext, Relation};
//!
//! let ctx = FormalContext::new(vec![
//!     vec![true, false],
//!     vec![true, true],
//! ])?;
//!
//! assert_eq!(ctx.objects_sharing(&[0]), vec![0, 1]);
//! assert_eq!(ctx.attributes_shared_by(&[1]), vec![0, 1]);
//!
//! let first_column = ctx.project(&[0], Axis::Attributes)?;
//! assert_eq!(first_column.attribute_count(), 1);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Stable digest of a relation's data.
///
/// Concepts carry the hash of the relation they were derived from; concepts
/// with different hashes are incomparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationHash(pub u64);

impl fmt::Display for RelationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// One of the two index spaces of a relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Rows (the extent side)
    Objects,
    /// Columns (the intent side)
    Attributes,
}

impl Axis {
    /// The other axis.
    pub fn dual(self) -> Self {
        match self {
            Axis::Objects => Axis::Attributes,
            Axis::Attributes => Axis::Objects,
        }
    }
}

/// Which closure operators a relation can supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    /// Plain binary incidence: both derivation directions may drive an
    /// enumeration.
    Binary,
    /// General closure system (e.g. a scaled many-valued context): only
    /// object subsets may be enumerated; intents are derived, never iterated.
    General,
}

/// A binary relation between object indices and attribute indices.
///
/// All index sets going in and out are sorted and duplicate-free.
/// Implementations are immutable; several builds may share one relation.
pub trait Relation: Send + Sync {
    /// Number of objects (rows).
    fn object_count(&self) -> usize;

    /// Number of attributes (columns).
    fn attribute_count(&self) -> usize;

    /// Name of an object. Panics if `object` is out of range.
    fn object_name(&self, object: usize) -> &str;

    /// Name of an attribute. Panics if `attribute` is out of range.
    fn attribute_name(&self, attribute: usize) -> &str;

    /// All objects that have every attribute in `attributes`.
    fn objects_sharing(&self, attributes: &[usize]) -> Vec<usize>;

    /// All attributes shared by every object in `objects`.
    fn attributes_shared_by(&self, objects: &[usize]) -> Vec<usize>;

    /// Digest identifying the relation's names and incidence.
    fn content_hash(&self) -> RelationHash;

    /// Closure capabilities of this relation.
    fn kind(&self) -> RelationKind {
        RelationKind::Binary
    }

    /// Restrict the relation to `indices` of `axis`, re-indexed `0..indices.len()`
    /// in the given order.
    fn project(&self, indices: &[usize], axis: Axis) -> Result<Self>
    where
        Self: Sized;

    /// Size of one axis.
    fn count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Objects => self.object_count(),
            Axis::Attributes => self.attribute_count(),
        }
    }

    /// Name of an element of one axis.
    fn name(&self, axis: Axis, index: usize) -> &str {
        match axis {
            Axis::Objects => self.object_name(index),
            Axis::Attributes => self.attribute_name(index),
        }
    }

    /// Derive a set on `axis` into the dual axis.
    fn derive(&self, axis: Axis, indices: &[usize]) -> Vec<usize> {
        match axis {
            Axis::Objects => self.attributes_shared_by(indices),
            Axis::Attributes => self.objects_sharing(indices),
        }
    }

    /// Closure of a set on `axis` (derive twice).
    fn close(&self, axis: Axis, indices: &[usize]) -> Vec<usize> {
        let dual = self.derive(axis, indices);
        self.derive(axis.dual(), &dual)
    }
}
