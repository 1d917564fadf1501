//! SOFIA: a lattice of at most `L_max` interesting concepts, built one
//! projection at a time.
//!
//! The relation is revealed index by index along one axis (attributes by
//! default). After each new index, Close-by-One is re-run from the current
//! lattice's concepts with only the new index allowed to extend a
//! combination. The delta is merged in place:
//!
//! - **unchanged** concepts are dropped;
//! - **expansions** keep their stable side (extent when revealing
//!   attributes, intent when revealing objects) and are replaced in place;
//! - **brand new** concepts are inserted top-first with local relinking.
//!
//! Whenever the lattice grows past `L_max`, every measure of the chain is
//! computed and the lowest-ranked concepts (by the last measure) are evicted.
//! Top and bottom always survive.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::{FormalContext, Sofia, SofiaConfig};
//!
//! let ctx = FormalContext::new(vec![
//!     vec![true, false, true, false],
//!     vec![true, true, false, false],
//!     vec![false, true, true, true],
//! ])?;
//! let config = SofiaConfig::from_json(r#"{"max_concepts": 4, "measures": ["LStab"]}"#)?;
//! let lattice = Sofia::from_config(&config)?.build(&ctx)?;
//! assert!(lattice.len() <= 4);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cbo::{close_by_one, enumerate_concepts, CbOParams};
use crate::error::{LatticeError, Result};
use crate::kernel::{Axis, Concept, Relation, RelationKind};
use crate::lattice::{sort_concepts, ConceptLattice, Measure, MeasureChain};

/// Serializable SOFIA settings.
///
/// Missing JSON fields take their [`Default`] values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SofiaConfig {
    /// Upper bound on the lattice size (`L_max`)
    pub max_concepts: usize,
    /// Reveal attributes (`true`) or objects (`false`) one at a time
    pub iterate_attributes: bool,
    /// Measure names; all are stored, the last one ranks
    pub measures: Vec<String>,
    /// `identity`, `ascending`, `descending` or `random`
    pub projection_order: String,
    /// Indices revealed before the first incremental step;
    /// defaults to `floor(log2(max_concepts))`
    pub initial_projections: Option<usize>,
    /// Seed of the `random` projection order
    pub seed: u64,
}

impl Default for SofiaConfig {
    fn default() -> Self {
        Self {
            max_concepts: 100,
            iterate_attributes: true,
            measures: vec!["LStab".to_string()],
            projection_order: "identity".to_string(),
            initial_projections: None,
            seed: 0,
        }
    }
}

impl SofiaConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Order in which the iterated axis is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionOrder {
    /// Index order
    Identity,
    /// Smallest single-index closure first
    Ascending,
    /// Largest single-index closure first
    Descending,
    /// Seeded shuffle
    Random,
}

impl ProjectionOrder {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionOrder::Identity => "identity",
            ProjectionOrder::Ascending => "ascending",
            ProjectionOrder::Descending => "descending",
            ProjectionOrder::Random => "random",
        }
    }

    /// Arrange the indices of `axis`.
    ///
    /// Ascending and descending sort by the size of each index's derived set
    /// and keep index order among ties.
    pub fn arrange<R: Relation + ?Sized>(&self, relation: &R, axis: Axis, seed: u64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..relation.count(axis)).collect();
        match self {
            ProjectionOrder::Identity => {}
            ProjectionOrder::Ascending => {
                order.sort_by_key(|&i| relation.derive(axis, &[i]).len());
            }
            ProjectionOrder::Descending => {
                order.sort_by_key(|&i| std::cmp::Reverse(relation.derive(axis, &[i]).len()));
            }
            ProjectionOrder::Random => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                order.shuffle(&mut rng);
            }
        }
        order
    }
}

impl FromStr for ProjectionOrder {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identity" => Ok(ProjectionOrder::Identity),
            "ascending" => Ok(ProjectionOrder::Ascending),
            "descending" => Ok(ProjectionOrder::Descending),
            "random" => Ok(ProjectionOrder::Random),
            other => Err(LatticeError::Configuration(format!(
                "unknown projection order \"{}\"; use identity, ascending, descending or random",
                other
            ))),
        }
    }
}

impl fmt::Display for ProjectionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated SOFIA builder.
#[derive(Clone, Debug)]
pub struct Sofia {
    max_concepts: usize,
    iterate_attributes: bool,
    measures: MeasureChain,
    order: ProjectionOrder,
    initial_projections: Option<usize>,
    seed: u64,
}

impl Sofia {
    /// Validate a configuration.
    ///
    /// Fails with [`LatticeError::Configuration`] on an unknown order or
    /// measure name, an empty measure list, or `max_concepts < 2`.
    pub fn from_config(config: &SofiaConfig) -> Result<Self> {
        if config.max_concepts < 2 {
            return Err(LatticeError::Configuration(format!(
                "max_concepts must be at least 2 to hold a top and a bottom, got {}",
                config.max_concepts
            )));
        }
        Ok(Self {
            max_concepts: config.max_concepts,
            iterate_attributes: config.iterate_attributes,
            measures: MeasureChain::from_names(config.measures.as_slice())?,
            order: config.projection_order.parse()?,
            initial_projections: config.initial_projections,
            seed: config.seed,
        })
    }

    /// Append a measure to the chain; it becomes the ranking key.
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn max_concepts(&self) -> usize {
        self.max_concepts
    }

    pub fn measures(&self) -> &MeasureChain {
        &self.measures
    }

    /// Build the bounded lattice of `relation`.
    ///
    /// The result is indexed like `relation` and tagged with its hash.
    pub fn build<R: Relation>(&self, relation: &R) -> Result<ConceptLattice> {
        self.build_observed(relation, |_, _| {})
    }

    /// [`Sofia::build`], calling `on_step(revealed, &lattice)` after every
    /// projection step once eviction is done.
    pub(crate) fn build_observed<R, F>(&self, relation: &R, mut on_step: F) -> Result<ConceptLattice>
    where
        R: Relation,
        F: FnMut(usize, &ConceptLattice),
    {
        if self.iterate_attributes && relation.kind() == RelationKind::General {
            return Err(LatticeError::TypeMismatch(
                "revealing attributes needs a binary relation".to_string(),
            ));
        }
        let axis = if self.iterate_attributes {
            Axis::Attributes
        } else {
            Axis::Objects
        };
        // CbO walks the revealed axis
        let iterate_extents = !self.iterate_attributes;

        let order = self.order.arrange(relation, axis, self.seed);
        let n = order.len();
        let start = self
            .initial_projections
            .unwrap_or(self.max_concepts.ilog2() as usize)
            .min(n);

        let mut projected = relation.project(&order[..start], axis)?;
        let concepts = enumerate_concepts(&projected, &CbOParams::directed(iterate_extents))?;
        let mut lattice = ConceptLattice::from_concepts(concepts)?;
        debug!(revealed = start, concepts = lattice.len(), "initial projection built");
        self.evict(&mut lattice, &projected)?;
        on_step(start, &lattice);

        for revealed in start + 1..=n {
            projected = relation.project(&order[..revealed], axis)?;
            let seeds: Vec<Vec<usize>> = lattice
                .concepts()
                .iter()
                .map(|c| self.revealed_side(c).to_vec())
                .collect();
            let params = CbOParams::directed(iterate_extents)
                .with_seeds(seeds)
                .with_restrict(vec![revealed - 1]);
            let raw = close_by_one(&projected, &params)?;

            lattice.retag(projected.content_hash());
            let (expanded, added) = self.merge(&mut lattice, &projected, raw.pairs())?;
            let evicted = self.evict(&mut lattice, &projected)?;
            debug!(
                revealed,
                expanded,
                added,
                evicted,
                concepts = lattice.len(),
                "projection merged"
            );
            on_step(revealed, &lattice);
        }

        let lattice = lattice.remap(relation.content_hash(), |c| {
            let (extent, intent) = if self.iterate_attributes {
                (c.extent().to_vec(), c.intent().iter().map(|&m| order[m]).collect())
            } else {
                (c.extent().iter().map(|&g| order[g]).collect(), c.intent().to_vec())
            };
            Concept::new(extent, intent, relation)
        });
        info!(
            concepts = lattice.len(),
            max_concepts = self.max_concepts,
            order = %self.order,
            "bounded lattice built"
        );
        Ok(lattice)
    }

    /// The side that grows as indices are revealed.
    fn revealed_side<'a>(&self, concept: &'a Concept) -> &'a [usize] {
        if self.iterate_attributes {
            concept.intent()
        } else {
            concept.extent()
        }
    }

    /// The side that a revealed index cannot change.
    fn stable_side<'a>(&self, concept: &'a Concept) -> &'a [usize] {
        if self.iterate_attributes {
            concept.extent()
        } else {
            concept.intent()
        }
    }

    /// Fold the closed pairs of one projection step into `lattice`.
    ///
    /// Returns the number of expanded and added concepts.
    fn merge<'p, R, I>(
        &self,
        lattice: &mut ConceptLattice,
        projected: &R,
        pairs: I,
    ) -> Result<(usize, usize)>
    where
        R: Relation,
        I: Iterator<Item = (&'p [usize], &'p [usize])>,
    {
        let mut expansions: Vec<(usize, Concept)> = Vec::new();
        let mut fresh: Vec<Concept> = Vec::new();
        for (extent, intent) in pairs {
            let concept = Concept::new(extent.to_vec(), intent.to_vec(), projected);
            let existing = lattice
                .concepts()
                .iter()
                .position(|c| self.stable_side(c) == self.stable_side(&concept));
            match existing {
                Some(i) if self.revealed_side(lattice.concept(i)) == self.revealed_side(&concept) => {}
                Some(i) => expansions.push((i, concept)),
                None => fresh.push(concept),
            }
        }

        // Ancestors of an expanded concept expand too; replace them first
        expansions.sort_by_key(|(_, c)| std::cmp::Reverse(c.support()));
        let expanded = expansions.len();
        for (i, concept) in expansions {
            lattice.replace_concept(i, concept)?;
        }

        let mut fresh = sort_concepts(fresh);
        if fresh.len() >= 2 {
            let bottom = lattice.concept(lattice.bottom());
            let new_bottom = fresh
                .last()
                .map_or(false, |c| c.lt_unchecked(bottom));
            if new_bottom {
                fresh.rotate_right(1);
            }
        }
        let added = fresh.len();
        for concept in fresh {
            lattice.add_concept(concept)?;
        }
        Ok((expanded, added))
    }

    /// Shrink `lattice` to at most `max_concepts`, keeping top and bottom.
    ///
    /// Every measure of the chain is stored; the last one ranks. All
    /// evictable concepts scoring at or below the first score that does not
    /// fit are removed. Returns the number of removed concepts.
    fn evict(&self, lattice: &mut ConceptLattice, projected: &dyn Relation) -> Result<usize> {
        if lattice.len() <= self.max_concepts {
            return Ok(0);
        }
        let mut scores = Vec::new();
        for measure in self.measures.iter() {
            scores = lattice.calc_measure(measure, projected);
        }

        let protected = [lattice.top(), lattice.bottom()];
        let evictable: Vec<usize> = (0..lattice.len())
            .filter(|i| !protected.contains(i))
            .collect();
        let kept = if lattice.top() == lattice.bottom() { 1 } else { 2 };
        let budget = self.max_concepts.saturating_sub(kept);
        if evictable.len() <= budget {
            return Ok(0);
        }

        // NaN ranks below every number
        let rank = |i: usize| if scores[i].is_nan() { f64::NEG_INFINITY } else { scores[i] };
        let mut ranked: Vec<f64> = evictable.iter().map(|&i| rank(i)).collect();
        ranked.sort_by(|a, b| b.total_cmp(a));
        let threshold = ranked[budget];

        let doomed: Vec<usize> = evictable
            .into_iter()
            .filter(|&i| rank(i) <= threshold)
            .collect();
        // Descending positions stay valid while removing
        for &i in doomed.iter().rev() {
            lattice.remove_concept(i)?;
        }
        debug!(
            measure = self.measures.key().name(),
            threshold,
            removed = doomed.len(),
            "evicted low-ranked concepts"
        );
        Ok(doomed.len())
    }
}

/// SOFIA with the given configuration.
pub fn sofia_binary<R: Relation>(relation: &R, config: &SofiaConfig) -> Result<ConceptLattice> {
    Sofia::from_config(config)?.build(relation)
}

/// SOFIA revealing objects, for relations without attribute-side closure.
pub fn sofia_general<R: Relation>(relation: &R, config: &SofiaConfig) -> Result<ConceptLattice> {
    let config = SofiaConfig {
        iterate_attributes: false,
        ..config.clone()
    };
    sofia_binary(relation, &config)
}
