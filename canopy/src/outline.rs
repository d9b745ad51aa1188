//! An in-memory outline view.
//!
//! `OutlineModel` implements [`OutlineView`] on top of its own arena, applying
//! batches with exactly the coordinate rules a real outline control uses. It
//! serves as a headless view, and as the reference the driver's output is
//! checked against: after any transition, the model must hold the same
//! forest as the live snapshot.

use crate::{debug, trace, warn};

use crate::dump::write_row;
use crate::item::Item;
use crate::snapshot::ForestSnapshot;
use crate::view::OutlineView;
use core::fmt;
use gumleaf::{Entry, Path};
use indextree::{Arena, NodeEdge, NodeId};
use rapidhash::RapidHashMap as HashMap;

/// A call received by an [`OutlineModel`], with parents rendered as ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall<K> {
    /// `reload_data`
    ReloadData,
    /// `begin_updates`
    BeginUpdates,
    /// `end_updates`
    EndUpdates,
    /// `insert_rows`
    InsertRows {
        /// Parent the rows were inserted under
        parent: Option<K>,
        /// Row indices, in post-batch coordinates
        indexes: Vec<usize>,
        /// Ids of the inserted items
        ids: Vec<K>,
    },
    /// `remove_rows`
    RemoveRows {
        /// Parent the rows were removed from
        parent: Option<K>,
        /// Row indices, in pre-batch coordinates
        indexes: Vec<usize>,
    },
    /// `move_row`
    MoveRow {
        /// Parent before the move
        from_parent: Option<K>,
        /// Row index before the batch
        from: usize,
        /// Parent after the move
        to_parent: Option<K>,
        /// Row index after the batch
        to: usize,
    },
    /// `reload_rows`
    ReloadRows {
        /// Ids of the re-rendered items
        ids: Vec<K>,
    },
}

/// Where a row lands once the batch is applied.
enum Destination<I: Item> {
    Insert {
        parent: Option<I::Id>,
        index: usize,
        item: I,
    },
    Move {
        source: usize,
        parent: Option<I::Id>,
        index: usize,
    },
}

/// Changes collected between `begin_updates` and `end_updates`.
struct Batch<I: Item> {
    /// `(parent, index)` rows to remove, pre-batch coordinates
    removals: Vec<(Option<I::Id>, usize)>,
    /// `(parent, index)` move sources, pre-batch coordinates
    sources: Vec<(Option<I::Id>, usize)>,
    /// In the order received
    destinations: Vec<Destination<I>>,
}

impl<I: Item> Default for Batch<I> {
    fn default() -> Self {
        Self {
            removals: Vec::new(),
            sources: Vec::new(),
            destinations: Vec::new(),
        }
    }
}

/// An in-memory outline view.
pub struct OutlineModel<I: Item> {
    /// Rows; the sentinel root holds `None`
    arena: Arena<Option<I>>,
    sentinel: NodeId,
    rows: HashMap<I::Id, NodeId>,

    /// Open batch, if any
    batch: Option<Batch<I>>,

    /// Every call received, in order
    calls: Vec<ViewCall<I::Id>>,
}

impl<I: Item> Default for OutlineModel<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Item> OutlineModel<I> {
    /// Create an empty model.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let sentinel = arena.new_node(None);
        Self {
            arena,
            sentinel,
            rows: HashMap::default(),
            batch: None,
            calls: Vec::new(),
        }
    }

    /// Create a model showing `snapshot`.
    pub fn from_snapshot(snapshot: &ForestSnapshot<I>) -> Self {
        let mut model = Self::new();
        model.rebuild(snapshot);
        model
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the model shows nothing.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row payload for an id.
    pub fn item(&self, id: &I::Id) -> Option<&I> {
        let node = self.rows.get(id)?;
        self.arena[*node].get().as_ref()
    }

    /// Ids of the rows under `parent`, in order.
    pub fn child_ids(&self, parent: Option<&I::Id>) -> Vec<I::Id> {
        let container = match parent {
            None => Some(self.sentinel),
            Some(id) => self.rows.get(id).copied(),
        };
        container
            .into_iter()
            .flat_map(|node| node.children(&self.arena))
            .filter_map(|node| self.arena[node].get().as_ref().map(Item::id))
            .collect()
    }

    /// The rows flattened depth-first, comparable with [`crate::flatten`].
    pub fn entries(&self) -> Vec<Entry<I::Id>> {
        let mut entries = Vec::with_capacity(self.rows.len());
        let mut path = Path::root();
        let mut levels: Vec<(u32, Option<I::Id>)> = vec![(0, None)];

        for edge in self.sentinel.traverse(&self.arena) {
            match edge {
                NodeEdge::Start(node) => {
                    let Some(item) = self.arena[node].get() else {
                        continue;
                    };
                    let (index, parent) = match levels.last() {
                        Some((index, parent)) => (*index, parent.clone()),
                        None => (0, None),
                    };
                    let id = item.id();
                    path.0.push(index);
                    entries.push(Entry::new(id.clone(), parent, path.clone()));
                    levels.push((0, Some(id)));
                }
                NodeEdge::End(node) => {
                    if self.arena[node].get().is_none() {
                        continue;
                    }
                    levels.pop();
                    path.0.pop();
                    if let Some((next, _)) = levels.last_mut() {
                        *next += 1;
                    }
                }
            }
        }
        entries
    }

    /// Every call received so far.
    pub fn calls(&self) -> &[ViewCall<I::Id>] {
        &self.calls
    }

    /// Take the call history, leaving it empty.
    pub fn take_calls(&mut self) -> Vec<ViewCall<I::Id>> {
        core::mem::take(&mut self.calls)
    }

    fn rebuild(&mut self, snapshot: &ForestSnapshot<I>) {
        let mut arena = Arena::new();
        let sentinel = arena.new_node(None);
        let mut rows: HashMap<I::Id, NodeId> = HashMap::default();

        snapshot.enumerate_items(|item, parent| {
            let container = match parent {
                None => Some(sentinel),
                Some(parent) => rows.get(&parent.id()).copied(),
            };
            let Some(container) = container else {
                warn!(id = ?item.id(), "parent row missing during rebuild");
                return;
            };
            let node = arena.new_node(Some(item.clone()));
            container.append(node, &mut arena);
            rows.insert(item.id(), node);
        });

        self.arena = arena;
        self.sentinel = sentinel;
        self.rows = rows;
    }

    fn container(&self, parent: Option<&I::Id>) -> NodeId {
        match parent {
            None => self.sentinel,
            Some(id) => match self.rows.get(id) {
                Some(node) => *node,
                None => panic!("outline model: no row for parent {id:?}"),
            },
        }
    }

    fn row_at(&self, parent: Option<&I::Id>, index: usize) -> NodeId {
        match self.container(parent).children(&self.arena).nth(index) {
            Some(node) => node,
            None => panic!("outline model: no row {index} under {parent:?}"),
        }
    }

    fn place(&mut self, parent: Option<&I::Id>, index: usize, node: NodeId) {
        let container = self.container(parent);
        let len = container.children(&self.arena).count();
        assert!(
            index <= len,
            "outline model: row {index} out of bounds under {parent:?} ({len} rows)"
        );
        let sibling = container.children(&self.arena).nth(index);
        match sibling {
            Some(sibling) => sibling.insert_before(node, &mut self.arena),
            None => container.append(node, &mut self.arena),
        }
    }

    /// Apply a batch: resolve every pre-batch coordinate first, then detach
    /// move sources, drop removed rows, and place destinations in order.
    fn commit(&mut self, batch: Batch<I>) {
        let removed: Vec<NodeId> = batch
            .removals
            .iter()
            .map(|(parent, index)| self.row_at(parent.as_ref(), *index))
            .collect();
        let sources: Vec<NodeId> = batch
            .sources
            .iter()
            .map(|(parent, index)| self.row_at(parent.as_ref(), *index))
            .collect();

        for &node in &sources {
            node.detach(&mut self.arena);
        }

        for node in removed {
            let gone: Vec<I::Id> = node
                .descendants(&self.arena)
                .filter_map(|n| self.arena[n].get().as_ref().map(Item::id))
                .collect();
            for id in &gone {
                self.rows.remove(id);
            }
            node.remove_subtree(&mut self.arena);
        }

        for destination in batch.destinations {
            match destination {
                Destination::Insert {
                    parent,
                    index,
                    item,
                } => {
                    let id = item.id();
                    let node = self.arena.new_node(Some(item));
                    self.place(parent.as_ref(), index, node);
                    self.rows.insert(id, node);
                }
                Destination::Move {
                    source,
                    parent,
                    index,
                } => {
                    self.place(parent.as_ref(), index, sources[source]);
                }
            }
        }

        debug!(rows = self.rows.len(), "outline model batch applied");
    }

    /// Run `record` against the open batch, or against a batch of its own.
    fn with_batch(&mut self, record: impl FnOnce(&mut Batch<I>)) {
        match self.batch.as_mut() {
            Some(batch) => record(batch),
            None => {
                let mut batch = Batch::default();
                record(&mut batch);
                self.commit(batch);
            }
        }
    }
}

impl<I: Item> OutlineView<I> for OutlineModel<I> {
    fn reload_data(&mut self, snapshot: &ForestSnapshot<I>) {
        self.calls.push(ViewCall::ReloadData);
        self.batch = None;
        self.rebuild(snapshot);
    }

    fn begin_updates(&mut self) {
        assert!(self.batch.is_none(), "outline model: nested begin_updates");
        self.calls.push(ViewCall::BeginUpdates);
        self.batch = Some(Batch::default());
    }

    fn end_updates(&mut self) {
        self.calls.push(ViewCall::EndUpdates);
        match self.batch.take() {
            Some(batch) => self.commit(batch),
            None => panic!("outline model: end_updates without begin_updates"),
        }
    }

    fn insert_rows(&mut self, indexes: &[usize], parent: Option<&I>, items: &[I]) {
        assert_eq!(
            indexes.len(),
            items.len(),
            "outline model: one index per inserted item"
        );
        let parent = parent.map(Item::id);
        trace!(?parent, ?indexes, "insert_rows");
        self.calls.push(ViewCall::InsertRows {
            parent: parent.clone(),
            indexes: indexes.to_vec(),
            ids: items.iter().map(Item::id).collect(),
        });
        self.with_batch(|batch| {
            for (index, item) in indexes.iter().zip(items) {
                batch.destinations.push(Destination::Insert {
                    parent: parent.clone(),
                    index: *index,
                    item: item.clone(),
                });
            }
        });
    }

    fn remove_rows(&mut self, indexes: &[usize], parent: Option<&I>) {
        let parent = parent.map(Item::id);
        trace!(?parent, ?indexes, "remove_rows");
        self.calls.push(ViewCall::RemoveRows {
            parent: parent.clone(),
            indexes: indexes.to_vec(),
        });
        self.with_batch(|batch| {
            batch
                .removals
                .extend(indexes.iter().map(|index| (parent.clone(), *index)));
        });
    }

    fn move_row(&mut self, from: usize, from_parent: Option<&I>, to: usize, to_parent: Option<&I>) {
        let from_parent = from_parent.map(Item::id);
        let to_parent = to_parent.map(Item::id);
        trace!(?from_parent, from, ?to_parent, to, "move_row");
        self.calls.push(ViewCall::MoveRow {
            from_parent: from_parent.clone(),
            from,
            to_parent: to_parent.clone(),
            to,
        });
        self.with_batch(|batch| {
            let source = batch.sources.len();
            batch.sources.push((from_parent, from));
            batch.destinations.push(Destination::Move {
                source,
                parent: to_parent,
                index: to,
            });
        });
    }

    fn reload_rows(&mut self, items: &[I]) {
        self.calls.push(ViewCall::ReloadRows {
            ids: items.iter().map(Item::id).collect(),
        });
        for item in items {
            match self.rows.get(&item.id()) {
                Some(&node) => *self.arena[node].get_mut() = Some(item.clone()),
                None => warn!(id = ?item.id(), "reload_rows: no such row"),
            }
        }
    }
}

impl<I: Item> fmt::Display for OutlineModel<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.entries() {
            write_row(f, entry.path.depth(), &entry.id, false)?;
        }
        Ok(())
    }
}

impl<I: Item> fmt::Debug for OutlineModel<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use facet_testhelpers::test;

    fn snapshot() -> ForestSnapshot<&'static str> {
        let mut snap = ForestSnapshot::new();
        snap.append_items(["a", "b"], None).unwrap();
        snap.append_items(["a1", "a2"], Some(&"a")).unwrap();
        snap
    }

    #[test]
    fn test_from_snapshot_mirrors_structure() {
        let snap = snapshot();
        let model = OutlineModel::from_snapshot(&snap);
        assert_eq!(model.entries(), flatten(&snap));
        assert_eq!(model.to_string(), "\"a\"\n  \"a1\"\n  \"a2\"\n\"b\"\n");
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn test_batch_uses_pre_and_post_coordinates() {
        let mut model = OutlineModel::from_snapshot(&snapshot());

        model.begin_updates();
        model.move_row(1, Some(&"a"), 0, None);
        // Still row 0: a2 leaving does not shift pre-batch indices
        model.remove_rows(&[0], Some(&"a"));
        model.insert_rows(&[0], Some(&"a2"), &["n"]);
        model.end_updates();

        assert_eq!(model.child_ids(None), vec!["a2", "a", "b"]);
        assert!(model.child_ids(Some(&"a")).is_empty());
        assert_eq!(model.child_ids(Some(&"a2")), vec!["n"]);
        assert!(model.item(&"a1").is_none());
    }

    #[test]
    fn test_changes_outside_a_batch_apply_immediately() {
        let mut model = OutlineModel::from_snapshot(&snapshot());
        model.insert_rows(&[2], Some(&"a"), &["a3"]);
        model.remove_rows(&[0], None);
        assert_eq!(model.child_ids(None), vec!["b"]);
        assert_eq!(model.len(), 1);
        assert_eq!(
            model.take_calls(),
            vec![
                ViewCall::InsertRows {
                    parent: Some("a"),
                    indexes: vec![2],
                    ids: vec!["a3"]
                },
                ViewCall::RemoveRows {
                    parent: None,
                    indexes: vec![0]
                },
            ]
        );
        assert!(model.calls().is_empty());
    }

    #[test]
    fn test_reload_rows_replaces_payload() {
        #[derive(Debug, Clone, PartialEq)]
        struct Row(u32, &'static str);
        impl Item for Row {
            type Id = u32;
            fn id(&self) -> u32 {
                self.0
            }
        }

        let mut snap = ForestSnapshot::new();
        snap.append_items([Row(1, "old")], None).unwrap();
        let mut model = OutlineModel::from_snapshot(&snap);

        model.reload_rows(&[Row(1, "new")]);
        assert_eq!(model.item(&1), Some(&Row(1, "new")));
    }
}
