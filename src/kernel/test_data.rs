//! Shared fixtures for unit tests.
//!
//! Only compiled in test builds (`#[cfg(test)]`).

use super::context::FormalContext;
use super::relation::{Axis, Relation, RelationHash, RelationKind};
use crate::error::Result;

/// Seven animals and how they move.
///
/// ```text
///      |fly|hunt|run|swim|
/// cow  |   |    |  X|    |
/// hen  |   |    |  X|    |
/// duck |  X|    |   |   X|
/// goose|  X|    |  X|   X|
/// owl  |  X|   X|   |    |
/// hawk |  X|   X|   |    |
/// eagle|  X|   X|  X|    |
/// ```
///
/// Nine concepts, twelve covering edges.
pub(crate) fn animal_movement() -> FormalContext {
    let t = true;
    let f = false;
    FormalContext::new(vec![
        vec![f, f, t, f],
        vec![f, f, t, f],
        vec![t, f, f, t],
        vec![t, f, t, t],
        vec![t, t, f, f],
        vec![t, t, f, f],
        vec![t, t, t, f],
    ])
    .and_then(|ctx| {
        ctx.with_object_names(["cow", "hen", "duck", "goose", "owl", "hawk", "eagle"])
    })
    .and_then(|ctx| ctx.with_attribute_names(["fly", "hunt", "run", "swim"]))
    .expect("fixture is well formed")
}

/// A relation that only admits object-side enumeration.
#[derive(Clone, Debug)]
pub(crate) struct ObjectsOnly(pub FormalContext);

impl Relation for ObjectsOnly {
    fn object_count(&self) -> usize {
        self.0.object_count()
    }

    fn attribute_count(&self) -> usize {
        self.0.attribute_count()
    }

    fn object_name(&self, object: usize) -> &str {
        self.0.object_name(object)
    }

    fn attribute_name(&self, attribute: usize) -> &str {
        self.0.attribute_name(attribute)
    }

    fn objects_sharing(&self, attributes: &[usize]) -> Vec<usize> {
        self.0.objects_sharing(attributes)
    }

    fn attributes_shared_by(&self, objects: &[usize]) -> Vec<usize> {
        self.0.attributes_shared_by(objects)
    }

    fn content_hash(&self) -> RelationHash {
        self.0.content_hash()
    }

    fn kind(&self) -> RelationKind {
        RelationKind::General
    }

    fn project(&self, indices: &[usize], axis: Axis) -> Result<Self> {
        Ok(Self(self.0.project(indices, axis)?))
    }
}
