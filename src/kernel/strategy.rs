//! Property-based generators for [`FormalContext`].
//!
//! Used by the `proptest` tests across the crate (closure laws, duplicate-free
//! enumeration, agreement between builders, lattice invariants).
//!
//! ```ignore
//! use proptest::prelude::*;
//!
//! use crate::kernel::strategy::gen_context;
//!
//! proptest! {
//!     #[test]
//!     fn test_context(ctx in gen_context(6, 5)) {
//!         prop_assert!(ctx.object_count() >= 1);
//!     }
//! }
//! ```
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;

use super::context::FormalContext;
use super::relation::Relation;

/// Generates a context with `1..=max_objects` objects and
/// `1..=max_attributes` attributes, each cell true with probability ~0.4.
pub fn gen_context(max_objects: usize, max_attributes: usize) -> impl Strategy<Value = FormalContext> {
    (1..=max_objects, 1..=max_attributes).prop_flat_map(|(n, m)| {
        prop::collection::vec(prop::collection::vec(prop::bool::weighted(0.4), m), n).prop_map(
            move |rows| FormalContext::with_width(rows, m).expect("generated rows are rectangular"),
        )
    })
}

/// Generates a context together with a subset of its objects.
pub fn gen_context_and_objects(
    max_objects: usize,
    max_attributes: usize,
) -> impl Strategy<Value = (FormalContext, Vec<usize>)> {
    gen_context(max_objects, max_attributes).prop_flat_map(|ctx| {
        let n = ctx.object_count();
        (Just(ctx), prop::collection::vec(any::<bool>(), n)).prop_map(|(ctx, mask)| {
            let objects = mask
                .iter()
                .enumerate()
                .filter_map(|(g, &keep)| keep.then_some(g))
                .collect();
            (ctx, objects)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Axis, Relation};

    proptest! {
        #[test]
        fn test_generated_shape(ctx in gen_context(6, 5)) {
            prop_assert!(ctx.object_count() >= 1 && ctx.object_count() <= 6);
            prop_assert!(ctx.attribute_count() >= 1 && ctx.attribute_count() <= 5);
        }

        #[test]
        fn test_closure_is_idempotent((ctx, objects) in gen_context_and_objects(7, 6)) {
            let once = ctx.close(Axis::Objects, &objects);
            let twice = ctx.close(Axis::Objects, &once);
            prop_assert_eq!(&once, &twice);
            // extensive
            prop_assert!(objects.iter().all(|g| once.contains(g)));
        }

        #[test]
        fn test_galois_connection((ctx, objects) in gen_context_and_objects(7, 6)) {
            let intent = ctx.attributes_shared_by(&objects);
            let extent = ctx.objects_sharing(&intent);
            prop_assert_eq!(ctx.attributes_shared_by(&extent), intent);
        }
    }
}
