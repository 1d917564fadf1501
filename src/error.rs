//! Error types for concept-lattice.

use thiserror::Error;

use crate::kernel::RelationHash;

/// Concept lattice error types.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// Invalid combination of flags or arguments
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Algorithm asked for a closure direction the relation cannot supply
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Algorithm cannot run on this kind of relation at all
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Concepts obtained from different relations are incomparable
    #[error("Cannot compare concepts obtained from different relations ({left} vs {right})")]
    UnmatchedRelation {
        left: RelationHash,
        right: RelationHash,
    },

    /// Monotone and antimonotone concepts are incomparable
    #[error("Cannot compare monotone and antimonotone concepts")]
    UnmatchedMonotonicity,

    /// A mutation would break the covering order
    #[error("Order violation: {0}")]
    OrderViolation(String),

    /// Rows or name lists of mismatching length
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Object, attribute or concept index past the end
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Object or attribute name not present in the relation
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Result type alias for concept-lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
