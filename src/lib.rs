//! # concept-lattice: Formal Concept Analysis lattices
//!
//! Enumerate the formal concepts of a binary object × attribute relation,
//! compute their covering order, and keep a bounded lattice of the most
//! interesting concepts when the full one is too large.
//!
//! ## Quick Start
//!
//! ```rust
//! use concept_lattice::{lindig, ConceptLattice, FormalContext, Sofia, SofiaConfig};
//!
//! let ctx = FormalContext::new(vec![
//!     vec![false, false, true, false],
//!     vec![true, false, true, true],
//!     vec![true, true, false, false],
//! ])?
//! .with_object_names(["hen", "goose", "owl"])?
//! .with_attribute_names(["fly", "hunt", "run", "swim"])?;
//!
//! // Complete lattice, two ways
//! let by_cbo = ConceptLattice::from_relation(&ctx)?;
//! let by_lindig = lindig(&ctx, None)?;
//! assert_eq!(by_cbo.len(), by_lindig.len());
//!
//! // At most four concepts, ranked by lower stability
//! let config = SofiaConfig { max_concepts: 4, ..SofiaConfig::default() };
//! let bounded = Sofia::from_config(&config)?.build(&ctx)?;
//! assert!(bounded.len() <= 4);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Relation**: objects, attributes and the two derivation operators
//! - **Concept**: a Galois-closed (extent, intent) pair
//! - **Covering order**: the Hasse diagram between concepts
//! - **Close-by-One**: duplicate-free enumeration of all concepts
//! - **SOFIA**: incremental construction bounded to `L_max` concepts
//!
//! ## Layers
//!
//! - [`kernel`]: relations, contexts, concepts
//! - [`lattice`]: covering order, [`ConceptLattice`], measures
//! - [`algorithms`]: Close-by-One, Lindig, SOFIA

pub mod algorithms;
pub mod error;
pub mod kernel;
pub mod lattice;

// Re-exports for convenience
pub use algorithms::{
    close_by_one, enumerate_concepts, lindig, sofia_binary, sofia_general, CbOParams,
    ProjectionOrder, RawConcepts, Sofia, SofiaConfig,
};
pub use error::{LatticeError, Result};
pub use kernel::{Axis, Concept, FormalContext, Relation, RelationHash, RelationKind};
pub use lattice::{
    complete_comparison, is_covering_relation, sort_concepts, top_bottom, ConceptLattice,
    Measure, MeasureChain, MeasureFn,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_data::animal_movement;

    #[test]
    fn test_animal_scenario_end_to_end() {
        let ctx = animal_movement();

        let cbo = ConceptLattice::from_relation(&ctx).unwrap();
        let hunters = cbo
            .concepts()
            .iter()
            .find(|c| c.extent_names() == ["owl", "hawk", "eagle"])
            .unwrap();
        assert_eq!(hunters.intent_names(), &["fly", "hunt"]);

        let intent: Vec<&str> = hunters.intent_names().iter().map(String::as_str).collect();
        let extent = ctx.extension(&intent).unwrap();
        let extent: Vec<&str> = extent.iter().map(String::as_str).collect();
        assert_eq!(ctx.intention(&extent).unwrap(), intent);

        let by_lindig = lindig(&ctx, None).unwrap();
        let pairs = |l: &ConceptLattice| {
            let mut v: Vec<(Vec<usize>, Vec<usize>)> = l
                .concepts()
                .iter()
                .map(|c| (c.extent().to_vec(), c.intent().to_vec()))
                .collect();
            v.sort();
            v
        };
        assert_eq!(pairs(&cbo), pairs(&by_lindig));
        assert_eq!(cbo.edges().len(), by_lindig.edges().len());

        let top = cbo.concept(cbo.top());
        assert!(top.intent().is_empty());
        assert_eq!(top.extent(), &[0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_bounded_lattice_keeps_extremes() {
        let ctx = animal_movement();
        for max_concepts in 2..=9 {
            let config = SofiaConfig {
                max_concepts,
                ..SofiaConfig::default()
            };
            let lattice = sofia_binary(&ctx, &config).unwrap();
            assert!(lattice.len() <= max_concepts);
            assert!(is_covering_relation(&lattice));
            assert_eq!(lattice.concept(lattice.top()).support(), 7);
            assert_eq!(lattice.concept(lattice.bottom()).support(), 0);
        }
    }
}
