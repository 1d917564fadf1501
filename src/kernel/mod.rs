//! Kernel layer: relations and concepts.
//!
//! The kernel provides the minimal, stable foundation for every builder:
//! - The [`Relation`] capability trait (two derivation operators, names,
//!   content hash, projection)
//! - [`FormalContext`], a bit-packed binary relation
//! - [`Concept`], the immutable (extent, intent) value object
//!
//! This layer has no dependencies on [`lattice`](crate::lattice) or
//! [`algorithms`](crate::algorithms).
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::kernel::{Concept, FormalContext, Relation};
//!
//! let ctx = FormalContext::new(vec![vec![true, true], vec![true, false]])?;
//! let intent = ctx.attributes_shared_by(&[0, 1]);
//! let extent = ctx.objects_sharing(&intent);
//! let concept = Concept::new(extent, intent, &ctx);
//! assert_eq!(concept.support(), 2);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

pub mod concept;
pub mod context;
pub mod relation;

#[cfg(test)]
pub(crate) mod strategy;
#[cfg(test)]
pub(crate) mod test_data;

pub use concept::Concept;
pub use context::FormalContext;
pub use relation::{Axis, Relation, RelationHash, RelationKind};
