//! Interestingness measures over lattice concepts.
//!
//! A measure maps `(concept position, lattice, relation)` to a score. SOFIA
//! ranks concepts by a measure to decide which ones to keep under its size
//! bound. Measures must be pure.
//!
//! Built-in measures, by name:
//!
//! - `LStab`: lower bound of stability, `1 - Σ 2^-(sup c - sup d)` over
//!   direct subconcepts `d`
//! - `UStab`: upper bound of stability, `1 - max 2^-(sup c - sup d)` over
//!   direct subconcepts `d`
//! - `Stab`: stability by the subset-count recurrence over all subconcepts
//!   (exact on complete lattices)
//! - `Support`: extent size over object count
//!
//! where `sup` is the extent size.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::{ConceptLattice, FormalContext, Measure};
//!
//! let ctx = FormalContext::new(vec![vec![true, false], vec![true, true]])?;
//! let mut lattice = ConceptLattice::from_relation(&ctx)?;
//!
//! let lstab: Measure = "LStab".parse()?;
//! let values = lattice.calc_measure(&lstab, &ctx);
//! assert_eq!(values.len(), lattice.len());
//! assert_eq!(lattice.measure(lattice.bottom(), "LStab"), Some(1.0));
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::concept_lattice::ConceptLattice;
use crate::error::{LatticeError, Result};
use crate::kernel::Relation;

/// Signature of a user-supplied measure.
pub type MeasureFn = dyn Fn(usize, &ConceptLattice, &dyn Relation) -> f64 + Send + Sync;

/// A named interestingness measure.
#[derive(Clone)]
pub enum Measure {
    /// Lower bound of stability
    LowerStability,
    /// Upper bound of stability
    UpperStability,
    /// Stability via the subset-count recurrence
    Stability,
    /// Relative support
    Support,
    /// User-supplied measure
    Custom { name: String, func: Arc<MeasureFn> },
}

impl Measure {
    /// Names accepted by [`Measure::from_name`].
    pub const BUILTIN_NAMES: [&'static str; 4] = ["LStab", "UStab", "Stab", "Support"];

    /// Look up a built-in measure by name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "LStab" => Ok(Measure::LowerStability),
            "UStab" => Ok(Measure::UpperStability),
            "Stab" => Ok(Measure::Stability),
            "Support" => Ok(Measure::Support),
            other => Err(LatticeError::Configuration(format!(
                "unknown measure \"{}\"; built-in measures are {:?}",
                other,
                Self::BUILTIN_NAMES
            ))),
        }
    }

    /// Wrap a closure as a named measure.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(usize, &ConceptLattice, &dyn Relation) -> f64 + Send + Sync + 'static,
    {
        Measure::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Name the values are stored under.
    pub fn name(&self) -> &str {
        match self {
            Measure::LowerStability => "LStab",
            Measure::UpperStability => "UStab",
            Measure::Stability => "Stab",
            Measure::Support => "Support",
            Measure::Custom { name, .. } => name,
        }
    }

    /// Score a single concept.
    pub fn evaluate(&self, i: usize, lattice: &ConceptLattice, relation: &dyn Relation) -> f64 {
        match self {
            Measure::LowerStability => {
                1.0 - Self::drop_terms(i, lattice).iter().sum::<f64>()
            }
            Measure::UpperStability => {
                1.0 - Self::drop_terms(i, lattice)
                    .into_iter()
                    .fold(0.0, f64::max)
            }
            Measure::Stability => Self::stability_all(lattice)[i],
            Measure::Support => {
                let n = relation.object_count();
                if n == 0 {
                    0.0
                } else {
                    lattice.concept(i).support() as f64 / n as f64
                }
            }
            Measure::Custom { func, .. } => func(i, lattice, relation),
        }
    }

    /// Score every concept, by position.
    pub fn evaluate_all(&self, lattice: &ConceptLattice, relation: &dyn Relation) -> Vec<f64> {
        match self {
            Measure::Stability => Self::stability_all(lattice),
            _ => (0..lattice.len())
                .map(|i| self.evaluate(i, lattice, relation))
                .collect(),
        }
    }

    /// `2^-(|ext c| - |ext d|)` for every direct subconcept `d` of `c`.
    fn drop_terms(i: usize, lattice: &ConceptLattice) -> Vec<f64> {
        let support = lattice.concept(i).support() as i32;
        lattice
            .subconcepts(i)
            .iter()
            .map(|&d| 2f64.powi(lattice.concept(d).support() as i32 - support))
            .collect()
    }

    /// stab(c) = 1 - Σ_{d < c} stab(d) · 2^(|ext d| - |ext c|)
    ///
    /// Evaluated bottom-up so every subconcept is scored before its parents.
    fn stability_all(lattice: &ConceptLattice) -> Vec<f64> {
        let mut order: Vec<usize> = (0..lattice.len()).collect();
        order.sort_by_key(|&i| lattice.concept(i).support());

        let mut stab = vec![0.0; lattice.len()];
        for i in order {
            let support = lattice.concept(i).support() as i32;
            let covered: f64 = lattice
                .descendants(i)
                .into_iter()
                .map(|d| stab[d] * 2f64.powi(lattice.concept(d).support() as i32 - support))
                .sum();
            stab[i] = 1.0 - covered;
        }
        stab
    }
}

impl FromStr for Measure {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Debug for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            builtin => f.write_str(builtin.name()),
        }
    }
}

/// Ordered, non-empty list of measures.
///
/// Every measure in the chain is computed and stored; only the last one
/// ranks concepts.
#[derive(Clone, Debug)]
pub struct MeasureChain {
    measures: Vec<Measure>,
}

impl MeasureChain {
    pub fn new(measures: Vec<Measure>) -> Result<Self> {
        if measures.is_empty() {
            return Err(LatticeError::Configuration(
                "the measure chain must name at least one measure".to_string(),
            ));
        }
        Ok(Self { measures })
    }

    /// Chain of built-in measures by name.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let measures = names
            .iter()
            .map(|n| Measure::from_name(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(measures)
    }

    /// Append a measure; it becomes the ranking key.
    pub fn push(&mut self, measure: Measure) {
        self.measures.push(measure);
    }

    /// The measure concepts are ranked by.
    pub fn key(&self) -> &Measure {
        // the constructor guarantees at least one element
        &self.measures[self.measures.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measure> {
        self.measures.iter()
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}
