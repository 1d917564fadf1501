//! Lattice layer: covering order, the mutable lattice, measures.
//!
//! - [`order`]: pairwise covering computation, top/bottom detection and
//!   linear extensions over plain concept slices
//! - [`ConceptLattice`]: concepts plus Hasse diagram, with local-relink
//!   insertion and removal
//! - [`Measure`]: interestingness measures stored in the lattice's side table
//!
//! Depends on [`kernel`](crate::kernel) only; the complete-lattice
//! constructor [`ConceptLattice::from_relation`] calls into Close-by-One.

pub mod concept_lattice;
pub mod measures;
pub mod order;

pub use concept_lattice::{is_covering_relation, ConceptLattice};
pub use measures::{Measure, MeasureChain, MeasureFn};
pub use order::{complete_comparison, sort_concepts, top_bottom};
