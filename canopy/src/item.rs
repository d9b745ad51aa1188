//! Item identity.

use core::fmt;
use core::hash::Hash;

/// A value that can be placed in a [`ForestSnapshot`](crate::ForestSnapshot).
///
/// Snapshots address items by id only. Two items with the same id are the
/// same entity even when their payload differs, which is what makes
/// reloading possible: same id, new payload, the row re-renders in place.
///
/// The id must stay stable and unique for as long as the item is in a
/// snapshot.
pub trait Item: Clone {
    /// The identifier type.
    type Id: Clone + Eq + Hash + fmt::Debug;

    /// The item's identifier.
    fn id(&self) -> Self::Id;
}

macro_rules! self_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Item for $ty {
                type Id = $ty;

                fn id(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

self_identified!(u32, u64, usize, i32, i64, String, &'static str);
