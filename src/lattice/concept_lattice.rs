//! ConceptLattice: concepts plus their covering relation.
//!
//! The lattice owns its concept list, the direct sub/superconcept adjacency
//! (indexed by position) and a side table of measure values. Every mutation
//! keeps three invariants:
//!
//! - exactly one top and one bottom concept;
//! - the adjacency is exactly the covering relation (no redundant edges, no
//!   missing direct edges);
//! - every member concept is compared under the lattice's current relation
//!   epoch.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::{ConceptLattice, FormalContext};
//!
//! let ctx = FormalContext::new(vec![
//!     vec![true, false],
//!     vec![true, true],
//! ])?;
//! let lattice = ConceptLattice::from_relation(&ctx)?;
//!
//! assert_eq!(lattice.len(), 2);
//! let top = lattice.top();
//! assert_eq!(lattice.concept(top).extent(), &[0, 1]);
//! assert_eq!(lattice.subconcepts(top), &[lattice.bottom()]);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::measures::Measure;
use super::order::{
    check_all_comparable, complete_comparison, covering_unchecked, invert, top_bottom,
};
use crate::algorithms::cbo::{enumerate_concepts, CbOParams};
use crate::error::{LatticeError, Result};
use crate::kernel::concept::{difference, is_subset};
use crate::kernel::{Concept, Relation, RelationHash};

/// A set of concepts with its Hasse diagram.
#[derive(Clone, Debug)]
pub struct ConceptLattice {
    concepts: Vec<Concept>,
    /// Direct lower neighbours of each position
    subconcepts: Vec<Vec<usize>>,
    /// Direct upper neighbours of each position
    superconcepts: Vec<Vec<usize>>,
    top: usize,
    bottom: usize,
    /// Relation hash every member is compared under
    epoch: RelationHash,
    monotone: bool,
    /// extent -> measure name -> value
    measures: HashMap<Vec<usize>, BTreeMap<String, f64>>,
}

impl ConceptLattice {
    /// Build a lattice from a set of concepts, computing the covering order.
    pub fn from_concepts(concepts: Vec<Concept>) -> Result<Self> {
        let subconcepts = complete_comparison(&concepts)?;
        let superconcepts = invert(&subconcepts);
        Self::assemble(concepts, subconcepts, superconcepts)
    }

    /// Build the complete lattice of a relation (Close-by-One + covering order).
    pub fn from_relation<R: Relation + ?Sized>(relation: &R) -> Result<Self> {
        let concepts = enumerate_concepts(relation, &CbOParams::default())?;
        Self::from_concepts(concepts)
    }

    /// Build a lattice from concepts and an already known covering relation.
    ///
    /// Both adjacency maps must list the same edges in opposite directions,
    /// the edges must be exactly the covering relation of `concepts`, and
    /// there must be a single maximal and a single minimal concept.
    pub fn from_parts(
        concepts: Vec<Concept>,
        subconcepts: Vec<Vec<usize>>,
        superconcepts: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let lattice = Self::from_parts_unchecked(concepts, subconcepts, superconcepts)?;
        if covering_unchecked(&lattice.concepts) != lattice.subconcepts {
            return Err(LatticeError::OrderViolation(
                "adjacency is not the covering relation".to_string(),
            ));
        }
        let maximal = lattice.superconcepts.iter().filter(|s| s.is_empty()).count();
        let minimal = lattice.subconcepts.iter().filter(|s| s.is_empty()).count();
        if maximal != 1 || minimal != 1 {
            return Err(LatticeError::OrderViolation(format!(
                "expected one top and one bottom, found {} maximal and {} minimal concepts",
                maximal, minimal
            )));
        }
        Ok(lattice)
    }

    /// [`ConceptLattice::from_parts`] checking shapes and symmetry only, for
    /// adjacency that was built as a covering relation.
    pub(crate) fn from_parts_unchecked(
        concepts: Vec<Concept>,
        mut subconcepts: Vec<Vec<usize>>,
        mut superconcepts: Vec<Vec<usize>>,
    ) -> Result<Self> {
        for map in [&subconcepts, &superconcepts] {
            if map.len() != concepts.len() {
                return Err(LatticeError::DimensionMismatch {
                    expected: concepts.len(),
                    got: map.len(),
                });
            }
            if let Some(&index) = map.iter().flatten().find(|&&j| j >= concepts.len()) {
                return Err(LatticeError::IndexOutOfRange {
                    index,
                    len: concepts.len(),
                });
            }
        }
        for list in subconcepts.iter_mut().chain(superconcepts.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        if invert(&subconcepts) != superconcepts {
            return Err(LatticeError::OrderViolation(
                "subconcept and superconcept maps disagree".to_string(),
            ));
        }
        Self::assemble(concepts, subconcepts, superconcepts)
    }

    fn assemble(
        concepts: Vec<Concept>,
        subconcepts: Vec<Vec<usize>>,
        superconcepts: Vec<Vec<usize>>,
    ) -> Result<Self> {
        check_all_comparable(&concepts)?;
        let (top, bottom) = top_bottom(&concepts).ok_or_else(|| {
            LatticeError::Configuration("a lattice needs at least one concept".to_string())
        })?;
        let epoch = concepts[top].relation_hash();
        let monotone = concepts[top].is_monotone();
        Ok(Self {
            concepts,
            subconcepts,
            superconcepts,
            top,
            bottom,
            epoch,
            monotone,
            measures: HashMap::new(),
        })
    }

    // =========================================================================
    // Reading
    // =========================================================================

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Always false for a constructed lattice.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// All concepts in position order.
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Concept at a position. Panics if out of range.
    pub fn concept(&self, i: usize) -> &Concept {
        &self.concepts[i]
    }

    /// Direct lower neighbours of `i`, ascending by position.
    pub fn subconcepts(&self, i: usize) -> &[usize] {
        &self.subconcepts[i]
    }

    /// Direct upper neighbours of `i`, ascending by position.
    pub fn superconcepts(&self, i: usize) -> &[usize] {
        &self.superconcepts[i]
    }

    /// Position of the greatest concept.
    pub fn top(&self) -> usize {
        self.top
    }

    /// Position of the least concept.
    pub fn bottom(&self) -> usize {
        self.bottom
    }

    /// Relation hash the members are currently compared under.
    pub fn epoch(&self) -> RelationHash {
        self.epoch
    }

    /// Covering edges as `(superconcept, subconcept)` pairs, sorted.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.subconcepts
            .iter()
            .enumerate()
            .flat_map(|(i, subs)| subs.iter().map(move |&j| (i, j)))
            .collect()
    }

    /// Position of the concept with exactly this extent.
    pub fn index_of(&self, extent: &[usize]) -> Option<usize> {
        self.concepts.iter().position(|c| c.extent() == extent)
    }

    /// All concepts strictly above `i`, ascending by position.
    pub fn ancestors(&self, i: usize) -> Vec<usize> {
        Self::reach(&self.superconcepts, i)
    }

    /// All concepts strictly below `i`, ascending by position.
    pub fn descendants(&self, i: usize) -> Vec<usize> {
        Self::reach(&self.subconcepts, i)
    }

    fn reach(adjacency: &[Vec<usize>], start: usize) -> Vec<usize> {
        let mut seen = vec![false; adjacency.len()];
        let mut queue: VecDeque<usize> = adjacency[start].iter().copied().collect();
        while let Some(j) = queue.pop_front() {
            if !seen[j] {
                seen[j] = true;
                queue.extend(adjacency[j].iter().copied());
            }
        }
        (0..adjacency.len()).filter(|&j| seen[j]).collect()
    }

    /// Intent elements that first appear at `i`: not in any direct
    /// superconcept's intent. Used for reduced labelling.
    pub fn new_intent(&self, i: usize) -> Vec<usize> {
        let mut fresh = self.concepts[i].intent().to_vec();
        for &p in &self.superconcepts[i] {
            fresh = difference(&fresh, self.concepts[p].intent());
        }
        fresh
    }

    /// Extent elements that first appear at `i`: not in any direct
    /// subconcept's extent.
    pub fn new_extent(&self, i: usize) -> Vec<usize> {
        let mut fresh = self.concepts[i].extent().to_vec();
        for &s in &self.subconcepts[i] {
            fresh = difference(&fresh, self.concepts[s].extent());
        }
        fresh
    }

    // =========================================================================
    // Measures
    // =========================================================================

    /// Value of a named measure for concept `i`, if computed.
    pub fn measure(&self, i: usize, name: &str) -> Option<f64> {
        self.measures
            .get(self.concepts[i].extent())
            .and_then(|values| values.get(name))
            .copied()
    }

    /// All measure values stored for concept `i`.
    pub fn measures(&self, i: usize) -> Option<&BTreeMap<String, f64>> {
        self.measures.get(self.concepts[i].extent())
    }

    /// Store a measure value for concept `i`.
    pub fn set_measure(&mut self, i: usize, name: &str, value: f64) {
        self.measures
            .entry(self.concepts[i].extent().to_vec())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Evaluate `measure` on every concept against `relation` and store the values.
    ///
    /// Returns the values by position.
    pub fn calc_measure(&mut self, measure: &Measure, relation: &dyn Relation) -> Vec<f64> {
        let values = measure.evaluate_all(self, relation);
        for (i, &value) in values.iter().enumerate() {
            self.set_measure(i, measure.name(), value);
        }
        values
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Switch the relation every member is compared under.
    ///
    /// Concepts keep the hash they were created with; the lattice compares
    /// them through the epoch instead.
    pub fn retag(&mut self, epoch: RelationHash) {
        self.epoch = epoch;
    }

    fn check_member(&self, concept: &Concept) -> Result<()> {
        if concept.relation_hash() != self.epoch {
            return Err(LatticeError::UnmatchedRelation {
                left: self.epoch,
                right: concept.relation_hash(),
            });
        }
        if concept.is_monotone() != self.monotone {
            return Err(LatticeError::UnmatchedMonotonicity);
        }
        Ok(())
    }

    /// Insert a concept, relinking only around the new node.
    ///
    /// The concept must carry the lattice epoch, must have an extent not yet
    /// present, and must be comparable with the current top and bottom (it
    /// may replace either). Returns the new position.
    pub fn add_concept(&mut self, concept: Concept) -> Result<usize> {
        self.check_member(&concept)?;
        if self.index_of(concept.extent()).is_some() {
            return Err(LatticeError::OrderViolation(format!(
                "a concept with extent {:?} is already present",
                concept.extent()
            )));
        }

        let above: Vec<usize> = (0..self.len())
            .filter(|&j| concept.lt_unchecked(&self.concepts[j]))
            .collect();
        let below: Vec<usize> = (0..self.len())
            .filter(|&j| self.concepts[j].lt_unchecked(&concept))
            .collect();

        let under_top = above.contains(&self.top);
        let over_top = below.contains(&self.top);
        let over_bottom = below.contains(&self.bottom);
        let under_bottom = above.contains(&self.bottom);
        if !(under_top || over_top) || !(over_bottom || under_bottom) {
            return Err(LatticeError::OrderViolation(format!(
                "concept with extent {:?} is incomparable with the top or bottom",
                concept.extent()
            )));
        }

        // Minimal elements above, maximal elements below
        let uppers: Vec<usize> = above
            .iter()
            .copied()
            .filter(|&u| {
                !above
                    .iter()
                    .any(|&a| self.concepts[a].lt_unchecked(&self.concepts[u]))
            })
            .collect();
        let lowers: Vec<usize> = below
            .iter()
            .copied()
            .filter(|&d| {
                !below
                    .iter()
                    .any(|&b| self.concepts[d].lt_unchecked(&self.concepts[b]))
            })
            .collect();

        // The new node sits between every upper/lower pair
        for &u in &uppers {
            self.subconcepts[u].retain(|d| !lowers.contains(d));
        }
        for &d in &lowers {
            self.superconcepts[d].retain(|u| !uppers.contains(u));
        }

        let n = self.concepts.len();
        for &u in &uppers {
            self.subconcepts[u].push(n);
        }
        for &d in &lowers {
            self.superconcepts[d].push(n);
        }
        self.concepts.push(concept);
        self.subconcepts.push(lowers);
        self.superconcepts.push(uppers);

        if over_top {
            self.top = n;
        }
        if under_bottom {
            self.bottom = n;
        }
        Ok(n)
    }

    /// Remove the concept at `i`, linking its subconcepts to its
    /// superconcepts wherever no other path covers them.
    ///
    /// The top (bottom) can only be removed when it has exactly one
    /// subconcept (superconcept), which then takes its place.
    pub fn remove_concept(&mut self, i: usize) -> Result<Concept> {
        if i >= self.len() {
            return Err(LatticeError::IndexOutOfRange {
                index: i,
                len: self.len(),
            });
        }
        if self.len() == 1 {
            return Err(LatticeError::OrderViolation(
                "cannot remove the only concept".to_string(),
            ));
        }
        let mut new_top = self.top;
        let mut new_bottom = self.bottom;
        if i == self.top {
            match self.subconcepts[i].as_slice() {
                [only] => new_top = *only,
                _ => {
                    return Err(LatticeError::OrderViolation(
                        "removing the top would leave several maximal concepts".to_string(),
                    ))
                }
            }
        }
        if i == self.bottom {
            match self.superconcepts[i].as_slice() {
                [only] => new_bottom = *only,
                _ => {
                    return Err(LatticeError::OrderViolation(
                        "removing the bottom would leave several minimal concepts".to_string(),
                    ))
                }
            }
        }

        let supers = std::mem::take(&mut self.superconcepts[i]);
        let subs = std::mem::take(&mut self.subconcepts[i]);

        let mut bridges = Vec::new();
        for &p in &supers {
            for &s in &subs {
                let covered_elsewhere = self.subconcepts[p]
                    .iter()
                    .any(|&y| y != i && self.concepts[s].lt_unchecked(&self.concepts[y]));
                if !covered_elsewhere {
                    bridges.push((p, s));
                }
            }
        }
        for &p in &supers {
            self.subconcepts[p].retain(|&j| j != i);
        }
        for &s in &subs {
            self.superconcepts[s].retain(|&j| j != i);
        }
        for (p, s) in bridges {
            self.subconcepts[p].push(s);
            self.superconcepts[s].push(p);
        }

        let removed = self.concepts.remove(i);
        self.subconcepts.remove(i);
        self.superconcepts.remove(i);
        let shift = |j: usize| if j > i { j - 1 } else { j };
        for list in self.subconcepts.iter_mut().chain(self.superconcepts.iter_mut()) {
            for j in list.iter_mut() {
                *j = shift(*j);
            }
            list.sort_unstable();
        }
        self.top = shift(new_top);
        self.bottom = shift(new_bottom);
        self.measures.remove(removed.extent());
        Ok(removed)
    }

    /// Swap the concept at `i` for `concept`, keeping its position and edges.
    ///
    /// Only order-preserving replacements are allowed: the new concept must
    /// still lie strictly between the direct neighbours of `i`. Measure
    /// values follow the concept to its new extent. Returns the old concept.
    pub fn replace_concept(&mut self, i: usize, concept: Concept) -> Result<Concept> {
        if i >= self.len() {
            return Err(LatticeError::IndexOutOfRange {
                index: i,
                len: self.len(),
            });
        }
        self.check_member(&concept)?;
        if let Some(j) = self.index_of(concept.extent()) {
            if j != i {
                return Err(LatticeError::OrderViolation(format!(
                    "a concept with extent {:?} is already present",
                    concept.extent()
                )));
            }
        }
        let fits = self.superconcepts[i]
            .iter()
            .all(|&p| concept.lt_unchecked(&self.concepts[p]))
            && self.subconcepts[i]
                .iter()
                .all(|&s| self.concepts[s].lt_unchecked(&concept));
        if !fits {
            return Err(LatticeError::OrderViolation(format!(
                "concept with extent {:?} does not fit between the neighbours of {}",
                concept.extent(),
                i
            )));
        }

        let old = std::mem::replace(&mut self.concepts[i], concept);
        if old.extent() != self.concepts[i].extent() {
            if let Some(values) = self.measures.remove(old.extent()) {
                self.measures.insert(self.concepts[i].extent().to_vec(), values);
            }
        }
        Ok(old)
    }

    /// Rewrite every concept through `f`, keeping positions and edges.
    ///
    /// Used to move a lattice built on a projection back onto its source
    /// relation. `f` must preserve the order between concepts.
    pub(crate) fn remap<F>(self, epoch: RelationHash, mut f: F) -> Self
    where
        F: FnMut(Concept) -> Concept,
    {
        let mut measures = HashMap::with_capacity(self.measures.len());
        let mut old_measures = self.measures;
        let concepts: Vec<Concept> = self
            .concepts
            .into_iter()
            .map(|c| {
                let values = old_measures.remove(c.extent());
                let mapped = f(c);
                if let Some(values) = values {
                    measures.insert(mapped.extent().to_vec(), values);
                }
                mapped
            })
            .collect();
        Self {
            concepts,
            subconcepts: self.subconcepts,
            superconcepts: self.superconcepts,
            top: self.top,
            bottom: self.bottom,
            epoch,
            monotone: self.monotone,
            measures,
        }
    }
}

/// Is the adjacency of `lattice` exactly the covering relation of its
/// concepts, with a single top and bottom?
///
/// Quadratic; meant for tests and debug assertions.
pub fn is_covering_relation(lattice: &ConceptLattice) -> bool {
    let expected = covering_unchecked(lattice.concepts());
    let actual: Vec<Vec<usize>> = (0..lattice.len())
        .map(|i| {
            let mut subs = lattice.subconcepts(i).to_vec();
            subs.sort_unstable();
            subs
        })
        .collect();
    let maximal = (0..lattice.len())
        .filter(|&i| lattice.superconcepts(i).is_empty())
        .collect::<Vec<_>>();
    let minimal = (0..lattice.len())
        .filter(|&i| lattice.subconcepts(i).is_empty())
        .collect::<Vec<_>>();
    expected == actual
        && invert(&actual) == lattice.superconcepts
        && maximal == vec![lattice.top()]
        && minimal == vec![lattice.bottom()]
        && lattice
            .concepts()
            .iter()
            .all(|c| is_subset(c.extent(), lattice.concept(lattice.top()).extent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_data::animal_movement;
    use crate::kernel::FormalContext;

    fn animal_lattice() -> (FormalContext, ConceptLattice) {
        let ctx = animal_movement();
        let lattice = ConceptLattice::from_relation(&ctx).unwrap();
        (ctx, lattice)
    }

    #[test]
    fn test_from_relation_animals() {
        let (ctx, lattice) = animal_lattice();
        assert_eq!(lattice.len(), 9);
        assert_eq!(lattice.edges().len(), 12);
        assert!(is_covering_relation(&lattice));

        let top = lattice.concept(lattice.top());
        assert_eq!(top.extent().len(), ctx.object_count());
        assert!(top.intent().is_empty());

        let bottom = lattice.concept(lattice.bottom());
        assert!(bottom.extent().is_empty());
        assert_eq!(bottom.intent(), &[0, 1, 2, 3]);
        assert_eq!(lattice.epoch(), ctx.content_hash());
    }

    #[test]
    fn test_new_intent_and_extent_labels() {
        let (_, lattice) = animal_lattice();
        let hunters = lattice.index_of(&[4, 5, 6]).unwrap();
        // "hunt" is introduced here, "fly" comes from above
        assert_eq!(lattice.new_intent(hunters), vec![1]);
        // owl and hawk live here, eagle lives further down
        assert_eq!(lattice.new_extent(hunters), vec![4, 5]);
        assert!(lattice.new_intent(lattice.top()).is_empty());
    }

    #[test]
    fn test_ancestors_descendants() {
        let (_, lattice) = animal_lattice();
        let eagle = lattice.index_of(&[6]).unwrap();
        assert_eq!(lattice.descendants(eagle), vec![lattice.bottom()]);
        // {3,6}, {4,5,6}, run, fly, top
        assert_eq!(lattice.ancestors(eagle).len(), 5);
        assert_eq!(lattice.descendants(lattice.top()).len(), 8);
    }

    #[test]
    fn test_remove_relinks() {
        let (_, mut lattice) = animal_lattice();
        let fly_run = lattice.index_of(&[3, 6]).unwrap();
        let removed = lattice.remove_concept(fly_run).unwrap();
        assert_eq!(removed.extent(), &[3, 6]);
        assert_eq!(lattice.len(), 8);
        assert!(is_covering_relation(&lattice));

        // {3} and {6} now hang directly below run and (via hunters) fly
        let run = lattice.index_of(&[0, 1, 3, 6]).unwrap();
        let goose = lattice.index_of(&[3]).unwrap();
        let eagle = lattice.index_of(&[6]).unwrap();
        assert_eq!(lattice.subconcepts(run), {
            let mut v = vec![goose, eagle];
            v.sort_unstable();
            v
        });
    }

    #[test]
    fn test_remove_keeps_shortcut_out() {
        let (_, mut lattice) = animal_lattice();
        // removing the hunters must not link fly to eagle: {3,6} already covers it
        let hunters = lattice.index_of(&[4, 5, 6]).unwrap();
        lattice.remove_concept(hunters).unwrap();
        assert!(is_covering_relation(&lattice));
        let fly = lattice.index_of(&[2, 3, 4, 5, 6]).unwrap();
        let eagle = lattice.index_of(&[6]).unwrap();
        assert!(!lattice.subconcepts(fly).contains(&eagle));
    }

    #[test]
    fn test_remove_top_needs_single_child() {
        let (_, mut lattice) = animal_lattice();
        let top = lattice.top();
        assert!(matches!(
            lattice.remove_concept(top),
            Err(LatticeError::OrderViolation(_))
        ));
        assert!(lattice.remove_concept(99).is_err());
    }

    #[test]
    fn test_add_restores_removed() {
        let (_, mut lattice) = animal_lattice();
        let original_edges = lattice.edges().len();
        let fly_run = lattice.index_of(&[3, 6]).unwrap();
        let removed = lattice.remove_concept(fly_run).unwrap();

        let pos = lattice.add_concept(removed).unwrap();
        assert_eq!(pos, 8);
        assert!(is_covering_relation(&lattice));
        assert_eq!(lattice.edges().len(), original_edges);
    }

    #[test]
    fn test_add_new_top_and_bottom() {
        let ctx = animal_movement();
        let mid = Concept::new(vec![4, 5, 6], vec![0, 1], &ctx);
        let mut lattice = ConceptLattice::from_concepts(vec![mid]).unwrap();
        assert_eq!(lattice.top(), lattice.bottom());

        let top = lattice
            .add_concept(Concept::new((0..7).collect(), vec![], &ctx))
            .unwrap();
        assert_eq!(lattice.top(), top);
        let bottom = lattice
            .add_concept(Concept::new(vec![], vec![0, 1, 2, 3], &ctx))
            .unwrap();
        assert_eq!(lattice.bottom(), bottom);
        assert!(is_covering_relation(&lattice));
    }

    #[test]
    fn test_add_rejects_bad_concepts() {
        let (ctx, mut lattice) = animal_lattice();
        let dup = Concept::new(vec![6], vec![0, 1, 2], &ctx);
        assert!(matches!(
            lattice.add_concept(dup),
            Err(LatticeError::OrderViolation(_))
        ));

        let other = FormalContext::new(vec![vec![true]]).unwrap();
        assert!(matches!(
            lattice.add_concept(Concept::new(vec![0], vec![0], &other)),
            Err(LatticeError::UnmatchedRelation { .. })
        ));

        let mut partial = ConceptLattice::from_concepts(vec![
            Concept::new(vec![4, 5, 6], vec![0, 1], &ctx),
            Concept::new(vec![6], vec![0, 1, 2], &ctx),
        ])
        .unwrap();
        // incomparable with the current top {4,5,6}
        assert!(partial
            .add_concept(Concept::new(vec![0, 1, 3, 6], vec![2], &ctx))
            .is_err());
    }

    #[test]
    fn test_replace_in_place() {
        let (ctx, mut lattice) = animal_lattice();
        let hunters = lattice.index_of(&[4, 5, 6]).unwrap();
        lattice.set_measure(hunters, "score", 0.5);

        // same extent, names refreshed
        let refreshed = Concept::new(vec![4, 5, 6], vec![0, 1], &ctx);
        lattice.replace_concept(hunters, refreshed).unwrap();
        assert_eq!(lattice.measure(hunters, "score"), Some(0.5));

        // {2,3,4,5,6} would sit above fly's own position
        let too_big = Concept::new(vec![2, 3, 4, 5, 6], vec![0], &ctx);
        assert!(lattice.replace_concept(hunters, too_big).is_err());
    }

    #[test]
    fn test_retag_gates_membership() {
        let (ctx, mut lattice) = animal_lattice();
        let projected = ctx.project(&[3, 2, 1, 0], crate::Axis::Attributes).unwrap();
        let eagle = lattice.index_of(&[6]).unwrap();
        lattice.remove_concept(eagle).unwrap();

        let fresh = Concept::new(vec![6], vec![0, 1, 2], &projected);
        assert!(lattice.add_concept(fresh.clone()).is_err());
        lattice.retag(projected.content_hash());
        assert!(lattice.add_concept(fresh).is_ok());
        assert!(is_covering_relation(&lattice));
    }

    #[test]
    fn test_from_parts_checks_symmetry() {
        let ctx = animal_movement();
        let concepts = vec![
            Concept::new((0..7).collect(), vec![], &ctx),
            Concept::new(vec![6], vec![0, 1, 2], &ctx),
        ];
        let ok = ConceptLattice::from_parts(
            concepts.clone(),
            vec![vec![1], vec![]],
            vec![vec![], vec![0]],
        );
        assert!(ok.is_ok());
        let bad = ConceptLattice::from_parts(concepts, vec![vec![1], vec![]], vec![vec![], vec![]]);
        assert!(bad.is_err());
        assert!(ConceptLattice::from_concepts(vec![]).is_err());
    }

    #[test]
    fn test_from_parts_rejects_non_covering_edges() {
        let ctx = animal_movement();
        let concepts = vec![
            Concept::new((0..7).collect(), vec![], &ctx),
            Concept::new(vec![4, 5, 6], vec![0, 1], &ctx),
            Concept::new(vec![6], vec![0, 1, 2], &ctx),
        ];
        let chain = ConceptLattice::from_parts(
            concepts.clone(),
            vec![vec![1], vec![2], vec![]],
            vec![vec![], vec![0], vec![1]],
        )
        .unwrap();
        assert!(is_covering_relation(&chain));

        // top -> eagle skips the middle concept
        let shortcut = ConceptLattice::from_parts(
            concepts.clone(),
            vec![vec![1, 2], vec![2], vec![]],
            vec![vec![], vec![0], vec![0, 1]],
        );
        assert!(matches!(shortcut, Err(LatticeError::OrderViolation(_))));

        // two incomparable concepts over eagle: no single top
        let forked = vec![
            Concept::new(vec![0, 1, 3, 6], ctx.attributes_shared_by(&[0, 1, 3, 6]), &ctx),
            concepts[1].clone(),
            concepts[2].clone(),
        ];
        let fork = ConceptLattice::from_parts(
            forked,
            vec![vec![2], vec![2], vec![]],
            vec![vec![], vec![], vec![0, 1]],
        );
        assert!(matches!(fork, Err(LatticeError::OrderViolation(_))));
    }
}
