//! Lindig's neighbour search: the lattice and its covering edges in one pass.
//!
//! Starting from the concept with the full dual set, the search repeatedly
//! computes the direct upper neighbours of a concept. For a concept with
//! iteration set `A`, every `g` outside `A` is a candidate: close `A ∪ {g}`
//! and accept it when the closure meets the remaining representatives in
//! `g` only. Rejected candidates leave the representative set for good.
//! Edges fall out of the search, so no pairwise comparison is needed.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::cbo::resolve_direction;
use crate::error::{LatticeError, Result};
use crate::kernel::{Axis, Concept, Relation, RelationKind};
use crate::lattice::ConceptLattice;

/// A concept in search orientation: `iter` on the searched axis, `side` on its dual.
struct Node {
    iter: Vec<usize>,
    side: Vec<usize>,
}

/// Direct upper neighbours of `iter` in the searched order.
fn upper_neighbours<R: Relation + ?Sized>(relation: &R, axis: Axis, iter: &[usize]) -> Vec<Node> {
    let n = relation.count(axis);
    let mut reps: Vec<bool> = vec![true; n];
    for &g in iter {
        reps[g] = false;
    }
    let candidates: Vec<usize> = (0..n).filter(|&g| reps[g]).collect();

    let mut neighbours = Vec::new();
    for g in candidates {
        let mut grown = iter.to_vec();
        let at = grown.partition_point(|&x| x < g);
        grown.insert(at, g);

        let side = relation.derive(axis, &grown);
        let closed = relation.derive(axis.dual(), &side);
        let hits = closed.iter().filter(|&&x| reps[x]).count();
        if hits == 1 {
            neighbours.push(Node { iter: closed, side });
        } else {
            reps[g] = false;
        }
    }
    neighbours
}

/// Build the complete lattice of a binary relation by neighbour search.
///
/// `iterate_extents` picks the searched side, defaulting to the smaller one.
/// General relations are not supported.
pub fn lindig<R: Relation + ?Sized>(relation: &R, iterate_extents: Option<bool>) -> Result<ConceptLattice> {
    if relation.kind() == RelationKind::General {
        return Err(LatticeError::UnsupportedOperation(
            "neighbour search is only defined for binary relations".to_string(),
        ));
    }
    let iterate_extents = resolve_direction(relation, iterate_extents)?;
    let axis = if iterate_extents {
        Axis::Objects
    } else {
        Axis::Attributes
    };

    let full_side: Vec<usize> = (0..relation.count(axis.dual())).collect();
    let start = Node {
        iter: relation.derive(axis.dual(), &full_side),
        side: full_side,
    };

    let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
    index.insert(start.iter.clone(), 0);
    let mut nodes = vec![start];
    let mut below: Vec<Vec<usize>> = vec![Vec::new()];
    let mut above: Vec<Vec<usize>> = vec![Vec::new()];
    let mut queue: VecDeque<usize> = VecDeque::from([0]);

    while let Some(c) = queue.pop_front() {
        for neighbour in upper_neighbours(relation, axis, &nodes[c].iter) {
            let x = match index.get(&neighbour.iter) {
                Some(&x) => x,
                None => {
                    let x = nodes.len();
                    index.insert(neighbour.iter.clone(), x);
                    nodes.push(neighbour);
                    below.push(Vec::new());
                    above.push(Vec::new());
                    queue.push_back(x);
                    x
                }
            };
            below[x].push(c);
            above[c].push(x);
        }
    }

    debug!(
        iterate_extents,
        concepts = nodes.len(),
        edges = above.iter().map(Vec::len).sum::<usize>(),
        "neighbour search finished"
    );

    let concepts = nodes
        .into_iter()
        .map(|node| {
            if iterate_extents {
                Concept::new(node.iter, node.side, relation)
            } else {
                Concept::new(node.side, node.iter, relation)
            }
        })
        .collect();

    // Searching intents walks the dual order
    if iterate_extents {
        ConceptLattice::from_parts_unchecked(concepts, below, above)
    } else {
        ConceptLattice::from_parts_unchecked(concepts, above, below)
    }
}
