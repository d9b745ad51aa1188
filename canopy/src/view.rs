//! The boundary to the outline control being driven.

use crate::item::Item;
use crate::snapshot::ForestSnapshot;

/// An incrementally updatable outline (tree list) control.
///
/// The [`Driver`](crate::Driver) is the only caller. Parents are passed as
/// items, `None` meaning the root level, and row indices are always relative
/// to that parent.
///
/// # Batches
///
/// Incremental changes arrive between [`begin_updates`](Self::begin_updates)
/// and [`end_updates`](Self::end_updates). Inside one batch:
/// - removal indices and move sources address the tree as it was before the batch
/// - insertion indices and move destinations address the tree as it is after
///   the batch
///
/// Destinations are issued in display order of the final tree, so a view can
/// also apply them one at a time: detach every move source, drop every
/// removed row, then place each destination in the order received.
pub trait OutlineView<I: Item> {
    /// Throw away all rows and rebuild from `snapshot`.
    fn reload_data(&mut self, snapshot: &ForestSnapshot<I>);

    /// Open a batch of incremental changes.
    fn begin_updates(&mut self);

    /// Close the current batch.
    fn end_updates(&mut self);

    /// Insert `items` under `parent` at `indexes` (one index per item, ascending).
    fn insert_rows(&mut self, indexes: &[usize], parent: Option<&I>, items: &[I]);

    /// Remove the rows under `parent` at `indexes` (ascending), with their subtrees.
    fn remove_rows(&mut self, indexes: &[usize], parent: Option<&I>);

    /// Move one row, and its subtree, from `from` under `from_parent` to `to`
    /// under `to_parent`.
    fn move_row(&mut self, from: usize, from_parent: Option<&I>, to: usize, to_parent: Option<&I>);

    /// Re-render rows whose payload changed. Structure is untouched.
    fn reload_rows(&mut self, items: &[I]) {
        let _ = items;
    }
}
