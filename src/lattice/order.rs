//! Covering order between concepts.
//!
//! [`complete_comparison`] computes the Hasse diagram of a concept set by
//! pairwise comparison. It is quadratic-to-cubic in the number of concepts,
//! which is fine for the bounded sets it is called on (full lattices of
//! small relations, SOFIA lattices of at most `L_max` concepts).

use crate::error::Result;
use crate::kernel::Concept;

/// Height of a concept in its order: greater concept, greater key.
pub(crate) fn height_key(concept: &Concept) -> i64 {
    let support = concept.support() as i64;
    if concept.is_monotone() {
        -support
    } else {
        support
    }
}

/// Check that every concept is comparable with the first one.
pub(crate) fn check_all_comparable(concepts: &[Concept]) -> Result<()> {
    if let Some(first) = concepts.first() {
        for c in &concepts[1..] {
            first.check_comparable(c)?;
        }
    }
    Ok(())
}

/// Direct subconcepts of every concept, by position.
///
/// `result[i]` holds the maximal elements among the concepts strictly
/// below `concepts[i]`, sorted ascending by position.
pub fn complete_comparison(concepts: &[Concept]) -> Result<Vec<Vec<usize>>> {
    check_all_comparable(concepts)?;
    Ok(covering_unchecked(concepts))
}

/// [`complete_comparison`] without the relation check, for lattice members
/// that are compared through the lattice epoch.
pub(crate) fn covering_unchecked(concepts: &[Concept]) -> Vec<Vec<usize>> {
    let mut subconcepts = Vec::with_capacity(concepts.len());
    for parent in concepts {
        let mut below: Vec<usize> = (0..concepts.len())
            .filter(|&j| concepts[j].lt_unchecked(parent))
            .collect();
        // Highest first, so every non-direct candidate meets a kept one above it
        below.sort_by_key(|&j| std::cmp::Reverse(height_key(&concepts[j])));

        let mut direct: Vec<usize> = Vec::new();
        for j in below {
            if !direct.iter().any(|&k| concepts[j].lt_unchecked(&concepts[k])) {
                direct.push(j);
            }
        }
        direct.sort_unstable();
        subconcepts.push(direct);
    }
    subconcepts
}

/// Invert a subconcept map into a superconcept map.
pub(crate) fn invert(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut inverted = vec![Vec::new(); adjacency.len()];
    for (i, targets) in adjacency.iter().enumerate() {
        for &j in targets {
            inverted[j].push(i);
        }
    }
    for list in &mut inverted {
        list.sort_unstable();
    }
    inverted
}

/// Positions of the greatest and the least concept, by extent size.
///
/// Returns `None` for an empty slice.
pub fn top_bottom(concepts: &[Concept]) -> Option<(usize, usize)> {
    if concepts.is_empty() {
        return None;
    }
    let mut top = 0;
    let mut bottom = 0;
    for (i, c) in concepts.iter().enumerate().skip(1) {
        if height_key(c) > height_key(&concepts[top]) {
            top = i;
        }
        if height_key(c) < height_key(&concepts[bottom]) {
            bottom = i;
        }
    }
    Some((top, bottom))
}

/// Sort concepts into a linear extension of their order, greatest first.
pub fn sort_concepts(mut concepts: Vec<Concept>) -> Vec<Concept> {
    concepts.sort_by_key(|c| std::cmp::Reverse(height_key(c)));
    concepts
}
