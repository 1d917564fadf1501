//! Algorithms layer: concept enumeration and lattice builders.
//!
//! - [`cbo`]: Close-by-One, the duplicate-free enumerator every other
//!   builder leans on
//! - [`lindig`]: complete lattice plus covering edges by neighbour search
//! - [`sofia`]: incremental builder bounded to `L_max` concepts
//!
//! All builders are synchronous and never mutate the relation, so one
//! relation may feed several builds at once.

pub mod cbo;
pub mod lindig;
pub mod sofia;

pub use cbo::{close_by_one, enumerate_concepts, CbOParams, RawConcepts};
pub use lindig::lindig;
pub use sofia::{sofia_binary, sofia_general, ProjectionOrder, Sofia, SofiaConfig};
