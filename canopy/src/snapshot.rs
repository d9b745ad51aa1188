//! The forest snapshot: an ordered forest of items with validated mutations.
//!
//! Key features:
//! - **indextree Arena**: all nodes in one arena, under a sentinel node that
//!   stands for the virtual "no parent" level
//! - **Id lookups**: id-to-node and id-to-item maps, so every read the view
//!   makes per row is O(1) or O(children)
//! - **Atomic mutations**: every mutation validates first and only then
//!   touches the forest, so a rejected call changes nothing

use crate::{debug, warn};

use crate::error::SnapshotError;
use crate::item::Item;
use gumleaf::Path;
use indextree::{Arena, NodeEdge, NodeId};
use rapidhash::{RapidHashMap as HashMap, RapidHashSet as HashSet};

/// One complete state of an outline: an ordered forest of items.
///
/// Snapshots are values. Get one, mutate your copy, submit it to the
/// [`Driver`](crate::Driver); nothing else sees your edits until then.
///
/// Display order is depth-first, parents before children, children in the
/// order they were added.
#[derive(Clone)]
pub struct ForestSnapshot<I: Item> {
    /// THE forest - the sentinel root holds `None`, every other node its id
    arena: Arena<Option<I::Id>>,

    /// Virtual parent of all root-level items
    sentinel: NodeId,

    /// Id to arena node
    nodes: HashMap<I::Id, NodeId>,

    /// Id to item payload
    items: HashMap<I::Id, I>,

    /// Ids marked for reload since the last flush
    pending_reload: HashSet<I::Id>,
}

impl<I: Item> Default for ForestSnapshot<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Item> ForestSnapshot<I> {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let sentinel = arena.new_node(None);
        Self {
            arena,
            sentinel,
            nodes: HashMap::default(),
            items: HashMap::default(),
            pending_reload: HashSet::default(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Total number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with this id is in the snapshot.
    pub fn contains(&self, id: &I::Id) -> bool {
        self.nodes.contains_key(id)
    }

    /// The item with this id.
    pub fn item(&self, id: &I::Id) -> Option<&I> {
        self.items.get(id)
    }

    /// Number of children of `parent`, or of root-level items for `None`.
    ///
    /// An unknown parent is logged and counts as having no children.
    pub fn child_count(&self, parent: Option<&I::Id>) -> usize {
        match self.container(parent) {
            Some(node) => node.children(&self.arena).count(),
            None => {
                warn!(parent = ?parent, "child_count: unknown parent");
                0
            }
        }
    }

    /// Children of `parent` in display order, or root-level items for `None`.
    ///
    /// An unknown parent is logged and has no children.
    pub fn children_of(&self, parent: Option<&I::Id>) -> Vec<&I> {
        self.child_ids_iter(parent)
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// Ids of the children of `parent`, or of root-level items for `None`.
    pub fn child_ids(&self, parent: Option<&I::Id>) -> Vec<I::Id> {
        self.child_ids_iter(parent).cloned().collect()
    }

    /// Ids of the root-level items.
    pub fn roots(&self) -> Vec<I::Id> {
        self.child_ids(None)
    }

    /// Parent of an item.
    ///
    /// `None` both for root-level items and for unknown ids; call
    /// [`contains`](Self::contains) first to tell them apart.
    pub fn parent_of(&self, id: &I::Id) -> Option<I::Id> {
        let Some(&node) = self.nodes.get(id) else {
            debug!(?id, "parent_of: unknown item");
            return None;
        };
        let parent = self.arena[node].parent()?;
        self.arena[parent].get().clone()
    }

    /// Position of an item among its siblings.
    pub fn index_of(&self, id: &I::Id) -> Option<usize> {
        let Some(&node) = self.nodes.get(id) else {
            debug!(?id, "index_of: unknown item");
            return None;
        };
        // preceding_siblings starts with the node itself
        Some(node.preceding_siblings(&self.arena).count() - 1)
    }

    /// Whether `ancestor` is a proper ancestor of `of`.
    ///
    /// Walks the whole parent chain of `of`. Unknown ids are never ancestors.
    pub fn is_ancestor(&self, ancestor: &I::Id, of: &I::Id) -> bool {
        let (Some(&ancestor), Some(&of)) = (self.nodes.get(ancestor), self.nodes.get(of)) else {
            return false;
        };
        of.ancestors(&self.arena).skip(1).any(|node| node == ancestor)
    }

    /// Ids of all descendants of an item (not the item itself), in display order.
    pub fn descendants_of(&self, id: &I::Id) -> Vec<I::Id> {
        let Some(&node) = self.nodes.get(id) else {
            warn!(?id, "descendants_of: unknown item");
            return Vec::new();
        };
        node.descendants(&self.arena)
            .skip(1)
            .filter_map(|n| self.arena[n].get().clone())
            .collect()
    }

    /// All ids in display order.
    pub fn item_identifiers(&self) -> Vec<I::Id> {
        self.ids_in_display_order().cloned().collect()
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &I> + '_ {
        self.ids_in_display_order()
            .filter_map(|id| self.items.get(id))
    }

    /// Visit every item with its parent, depth-first, parents before children,
    /// children in stored order. This is the display order used everywhere.
    pub fn enumerate_items(&self, mut visit: impl FnMut(&I, Option<&I>)) {
        self.walk(|id, parent, _path| {
            let Some(item) = self.items.get(id) else {
                return;
            };
            visit(item, parent.and_then(|p| self.items.get(p)));
        });
    }

    /// Ids currently marked for reload, in display order.
    pub fn pending_reloads(&self) -> Vec<I::Id> {
        if self.pending_reload.is_empty() {
            return Vec::new();
        }
        self.ids_in_display_order()
            .filter(|id| self.pending_reload.contains(*id))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Append items as the last children of `parent` (or at root level for
    /// `None`), in the given order.
    ///
    /// Rejected if an item is listed twice, is already present, or the parent
    /// is unknown.
    pub fn append_items(
        &mut self,
        items: impl IntoIterator<Item = I>,
        parent: Option<&I::Id>,
    ) -> Result<(), SnapshotError> {
        let items: Vec<I> = items.into_iter().collect();
        let container = self
            .validate_new(&items)
            .and_then(|()| {
                self.container(parent)
                    .ok_or_else(|| SnapshotError::ParentNotFound {
                        id: parent.map(SnapshotError::render).unwrap_or_default(),
                    })
            })
            .inspect_err(|err| warn!(?err, "append_items rejected"))?;

        for item in items {
            let node = self.adopt(item);
            container.append(node, &mut self.arena);
        }
        Ok(())
    }

    /// Insert items as siblings immediately before `target`, in the given order.
    pub fn insert_items_before(
        &mut self,
        items: impl IntoIterator<Item = I>,
        target: &I::Id,
    ) -> Result<(), SnapshotError> {
        let items: Vec<I> = items.into_iter().collect();
        let target_node = self
            .validate_new(&items)
            .and_then(|()| self.target(target))
            .inspect_err(|err| warn!(?err, "insert_items_before rejected"))?;

        for item in items {
            let node = self.adopt(item);
            target_node.insert_before(node, &mut self.arena);
        }
        Ok(())
    }

    /// Insert items as siblings immediately after `target`, in the given order.
    pub fn insert_items_after(
        &mut self,
        items: impl IntoIterator<Item = I>,
        target: &I::Id,
    ) -> Result<(), SnapshotError> {
        let items: Vec<I> = items.into_iter().collect();
        let mut cursor = self
            .validate_new(&items)
            .and_then(|()| self.target(target))
            .inspect_err(|err| warn!(?err, "insert_items_after rejected"))?;

        for item in items {
            let node = self.adopt(item);
            cursor.insert_after(node, &mut self.arena);
            cursor = node;
        }
        Ok(())
    }

    /// Delete items together with all of their descendants.
    ///
    /// Rejected if any id is unknown. Listing an item and one of its
    /// descendants in the same call is fine.
    pub fn delete_items(&mut self, ids: &[I::Id]) -> Result<(), SnapshotError> {
        self.validate_existing(ids)
            .inspect_err(|err| warn!(?err, "delete_items rejected"))?;

        for id in ids {
            // Already gone if an ancestor was deleted earlier in this call
            let Some(&node) = self.nodes.get(id) else {
                continue;
            };
            let doomed: Vec<I::Id> = node
                .descendants(&self.arena)
                .filter_map(|n| self.arena[n].get().clone())
                .collect();
            for gone in &doomed {
                self.nodes.remove(gone);
                self.items.remove(gone);
                self.pending_reload.remove(gone);
            }
            node.remove_subtree(&mut self.arena);
            debug!(?id, removed = doomed.len(), "deleted subtree");
        }
        Ok(())
    }

    /// Remove everything.
    pub fn delete_all_items(&mut self) {
        *self = Self::new();
    }

    /// Mark items for reload and take their new payloads.
    ///
    /// Rejected if any id is unknown. Marking twice is the same as marking once.
    pub fn reload_items(&mut self, items: impl IntoIterator<Item = I>) -> Result<(), SnapshotError> {
        let items: Vec<I> = items.into_iter().collect();
        let ids: Vec<I::Id> = items.iter().map(Item::id).collect();
        self.validate_existing(&ids)
            .inspect_err(|err| warn!(?err, "reload_items rejected"))?;

        for (id, item) in ids.into_iter().zip(items) {
            self.items.insert(id.clone(), item);
            self.pending_reload.insert(id);
        }
        Ok(())
    }

    /// Mark items for reload by id, keeping their payloads.
    pub fn reload_item_ids(&mut self, ids: &[I::Id]) -> Result<(), SnapshotError> {
        self.validate_existing(ids)
            .inspect_err(|err| warn!(?err, "reload_item_ids rejected"))?;

        self.pending_reload.extend(ids.iter().cloned());
        Ok(())
    }

    /// Take the items marked for reload, in display order, and clear the marks.
    pub fn flush_reloaded_items(&mut self) -> Vec<I> {
        if self.pending_reload.is_empty() {
            return Vec::new();
        }
        let flushed: Vec<I> = self
            .ids_in_display_order()
            .filter(|id| self.pending_reload.contains(*id))
            .filter_map(|id| self.items.get(id).cloned())
            .collect();
        self.pending_reload.clear();
        flushed
    }

    /// Whether `id` may be moved before, after or into `target`.
    ///
    /// Both must exist, be distinct, and `id` must not be an ancestor of
    /// `target`: the same rule holds for all three placements.
    pub fn can_move_item(&self, id: &I::Id, target: &I::Id) -> bool {
        self.check_move(id, target).is_ok()
    }

    /// Move an item (with its subtree) to just before `target`.
    pub fn move_item_before(&mut self, id: &I::Id, target: &I::Id) -> Result<(), SnapshotError> {
        let (node, target_node) = self
            .check_move(id, target)
            .inspect_err(|err| warn!(?err, "move_item_before rejected"))?;
        node.detach(&mut self.arena);
        target_node.insert_before(node, &mut self.arena);
        Ok(())
    }

    /// Move an item (with its subtree) to just after `target`.
    pub fn move_item_after(&mut self, id: &I::Id, target: &I::Id) -> Result<(), SnapshotError> {
        let (node, target_node) = self
            .check_move(id, target)
            .inspect_err(|err| warn!(?err, "move_item_after rejected"))?;
        node.detach(&mut self.arena);
        target_node.insert_after(node, &mut self.arena);
        Ok(())
    }

    /// Move an item (with its subtree) to be the last child of `target`.
    pub fn move_item_into(&mut self, id: &I::Id, target: &I::Id) -> Result<(), SnapshotError> {
        let (node, target_node) = self
            .check_move(id, target)
            .inspect_err(|err| warn!(?err, "move_item_into rejected"))?;
        node.detach(&mut self.arena);
        target_node.append(node, &mut self.arena);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn is_marked_for_reload(&self, id: &I::Id) -> bool {
        self.pending_reload.contains(id)
    }

    /// Depth-first walk handing out `(id, parent id, path)`.
    ///
    /// Iterative over the arena's edge traversal, so outline depth is bounded
    /// by memory rather than by the call stack.
    pub(crate) fn walk<'s, F>(&'s self, mut visit: F)
    where
        F: FnMut(&'s I::Id, Option<&'s I::Id>, &Path),
    {
        let mut path = Path::root();
        // next sibling index and parent id, per open level
        let mut levels: Vec<(u32, Option<&'s I::Id>)> = vec![(0, None)];

        for edge in self.sentinel.traverse(&self.arena) {
            match edge {
                NodeEdge::Start(node) => {
                    let Some(id) = self.arena[node].get().as_ref() else {
                        continue;
                    };
                    let (index, parent) = levels.last().copied().unwrap_or((0, None));
                    path.0.push(index);
                    visit(id, parent, &path);
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
    }

    fn ids_in_display_order(&self) -> impl Iterator<Item = &I::Id> + '_ {
        // descendants() is a pre-order walk that starts at the sentinel itself
        self.sentinel
            .descendants(&self.arena)
            .skip(1)
            .filter_map(|node| self.arena[node].get().as_ref())
    }

    fn child_ids_iter(&self, parent: Option<&I::Id>) -> impl Iterator<Item = &I::Id> + '_ {
        let container = self.container(parent);
        if container.is_none() {
            warn!(parent = ?parent, "children_of: unknown parent");
        }
        container
            .into_iter()
            .flat_map(|node| node.children(&self.arena))
            .filter_map(|node| self.arena[node].get().as_ref())
    }

    /// The node whose children are the children of `parent`.
    fn container(&self, parent: Option<&I::Id>) -> Option<NodeId> {
        match parent {
            None => Some(self.sentinel),
            Some(id) => self.nodes.get(id).copied(),
        }
    }

    fn target(&self, target: &I::Id) -> Result<NodeId, SnapshotError> {
        self.nodes
            .get(target)
            .copied()
            .ok_or_else(|| SnapshotError::TargetNotFound {
                id: SnapshotError::render(target),
            })
    }

    fn validate_new(&self, items: &[I]) -> Result<(), SnapshotError> {
        let mut seen: HashSet<I::Id> = HashSet::default();
        for item in items {
            let id = item.id();
            if self.nodes.contains_key(&id) {
                return Err(SnapshotError::DuplicateItem {
                    id: SnapshotError::render(&id),
                });
            }
            if !seen.insert(id.clone()) {
                return Err(SnapshotError::RepeatedItem {
                    id: SnapshotError::render(&id),
                });
            }
        }
        Ok(())
    }

    fn validate_existing(&self, ids: &[I::Id]) -> Result<(), SnapshotError> {
        match ids.iter().find(|id| !self.nodes.contains_key(*id)) {
            Some(missing) => Err(SnapshotError::ItemNotFound {
                id: SnapshotError::render(missing),
            }),
            None => Ok(()),
        }
    }

    fn check_move(&self, id: &I::Id, target: &I::Id) -> Result<(NodeId, NodeId), SnapshotError> {
        let node = self
            .nodes
            .get(id)
            .copied()
            .ok_or_else(|| SnapshotError::ItemNotFound {
                id: SnapshotError::render(id),
            })?;
        let target_node = self.target(target)?;
        if node == target_node {
            return Err(SnapshotError::MoveOntoSelf {
                id: SnapshotError::render(id),
            });
        }
        if target_node.ancestors(&self.arena).any(|n| n == node) {
            return Err(SnapshotError::MoveIntoDescendant {
                id: SnapshotError::render(id),
                target: SnapshotError::render(target),
            });
        }
        Ok((node, target_node))
    }

    /// Give an item a detached node and register it.
    fn adopt(&mut self, item: I) -> NodeId {
        let id = item.id();
        let node = self.arena.new_node(Some(id.clone()));
        self.nodes.insert(id.clone(), node);
        self.items.insert(id, item);
        node
    }
}

impl<I: Item> core::fmt::Debug for ForestSnapshot<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    type Snap = ForestSnapshot<&'static str>;

    fn chain() -> Snap {
        // a -> b -> c -> d
        let mut snap = Snap::new();
        snap.append_items(["a"], None).unwrap();
        snap.append_items(["b"], Some(&"a")).unwrap();
        snap.append_items(["c"], Some(&"b")).unwrap();
        snap.append_items(["d"], Some(&"c")).unwrap();
        snap
    }

    #[test]
    fn test_append_preserves_order() {
        let mut snap = Snap::new();
        snap.append_items(["p"], None).unwrap();
        snap.append_items(["a", "b", "c"], Some(&"p")).unwrap();

        assert_eq!(snap.child_ids(Some(&"p")), vec!["a", "b", "c"]);
        assert_eq!(snap.children_of(Some(&"p")), vec![&"a", &"b", &"c"]);
        assert_eq!(snap.child_count(Some(&"p")), 3);
        assert_eq!(snap.len(), 4);
        assert_eq!(snap.parent_of(&"b"), Some("p"));
        assert_eq!(snap.index_of(&"c"), Some(2));
    }

    #[test]
    fn test_append_rejects_duplicates() {
        let mut snap = Snap::new();
        snap.append_items(["a", "b"], None).unwrap();
        let before = snap.clone();

        assert_eq!(
            snap.append_items(["c", "a"], None),
            Err(SnapshotError::DuplicateItem {
                id: "\"a\"".to_string()
            })
        );
        assert_eq!(
            snap.append_items(["x", "x"], None),
            Err(SnapshotError::RepeatedItem {
                id: "\"x\"".to_string()
            })
        );
        assert_eq!(
            snap.append_items(["y"], Some(&"nope")),
            Err(SnapshotError::ParentNotFound {
                id: "\"nope\"".to_string()
            })
        );

        assert_eq!(snap.item_identifiers(), before.item_identifiers());
        assert!(!snap.contains(&"c"));
        assert!(!snap.contains(&"x"));
        assert!(!snap.contains(&"y"));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut snap = Snap::new();
        snap.append_items(["a", "d"], None).unwrap();
        snap.insert_items_before(["b", "c"], &"d").unwrap();
        snap.insert_items_after(["e", "f"], &"d").unwrap();
        snap.insert_items_after(["a1"], &"a").unwrap();

        assert_eq!(snap.roots(), vec!["a", "a1", "b", "c", "d", "e", "f"]);
        assert!(snap.insert_items_before(["z"], &"missing").is_err());
        assert!(snap.insert_items_after(["b"], &"a").is_err());
        assert_eq!(snap.len(), 7);
    }

    #[test]
    fn test_insert_next_to_nested_item() {
        let mut snap = Snap::new();
        snap.append_items(["p"], None).unwrap();
        snap.append_items(["x"], Some(&"p")).unwrap();
        snap.insert_items_before(["w"], &"x").unwrap();

        assert_eq!(snap.child_ids(Some(&"p")), vec!["w", "x"]);
        assert_eq!(snap.parent_of(&"w"), Some("p"));
    }

    #[test]
    fn test_cascading_delete() {
        let mut snap = chain();
        snap.delete_items(&["b"]).unwrap();

        assert_eq!(snap.item_identifiers(), vec!["a"]);
        assert!(!snap.contains(&"c"));
        assert!(!snap.contains(&"d"));
        assert_eq!(snap.child_count(Some(&"a")), 0);
    }

    #[test]
    fn test_delete_ancestor_and_descendant_together() {
        let mut snap = chain();
        snap.delete_items(&["b", "d"]).unwrap();
        assert_eq!(snap.item_identifiers(), vec!["a"]);
    }

    #[test]
    fn test_delete_rejects_unknown_and_changes_nothing() {
        let mut snap = chain();
        assert_eq!(
            snap.delete_items(&["b", "zz"]),
            Err(SnapshotError::ItemNotFound {
                id: "\"zz\"".to_string()
            })
        );
        assert_eq!(snap.item_identifiers(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_delete_clears_pending_reload() {
        let mut snap = chain();
        snap.reload_item_ids(&["c"]).unwrap();
        snap.delete_items(&["b"]).unwrap();
        assert!(snap.pending_reloads().is_empty());
        assert!(snap.flush_reloaded_items().is_empty());
    }

    #[test]
    fn test_delete_all() {
        let mut snap = chain();
        snap.reload_item_ids(&["a"]).unwrap();
        snap.delete_all_items();
        assert!(snap.is_empty());
        assert!(snap.roots().is_empty());
        assert!(snap.pending_reloads().is_empty());
        snap.append_items(["a"], None).unwrap();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn test_reload_flush_is_one_shot() {
        let mut snap = chain();
        snap.reload_item_ids(&["x"]).unwrap_err();
        snap.reload_item_ids(&["c", "a"]).unwrap();
        snap.reload_item_ids(&["c"]).unwrap();

        assert_eq!(snap.flush_reloaded_items(), vec!["a", "c"]);
        assert!(snap.flush_reloaded_items().is_empty());
    }

    #[test]
    fn test_unknown_parent_reads_are_empty() {
        let snap = chain();
        assert_eq!(snap.child_count(Some(&"ghost")), 0);
        assert!(snap.children_of(Some(&"ghost")).is_empty());
        assert_eq!(snap.parent_of(&"ghost"), None);
        assert_eq!(snap.parent_of(&"a"), None);
        assert_eq!(snap.index_of(&"ghost"), None);
        assert!(snap.descendants_of(&"ghost").is_empty());
    }

    #[test]
    fn test_move_rejects_cycles() {
        let mut snap = Snap::new();
        snap.append_items(["a"], None).unwrap();
        snap.append_items(["b"], Some(&"a")).unwrap();

        assert!(!snap.can_move_item(&"a", &"b"));
        assert!(!snap.can_move_item(&"a", &"a"));
        assert!(snap.can_move_item(&"b", &"a"));

        assert_eq!(
            snap.move_item_before(&"a", &"b"),
            Err(SnapshotError::MoveIntoDescendant {
                id: "\"a\"".to_string(),
                target: "\"b\"".to_string()
            })
        );
        assert!(snap.move_item_into(&"a", &"b").is_err());
        assert!(snap.move_item_after(&"a", &"a").is_err());
        assert_eq!(snap.parent_of(&"b"), Some("a"));
        assert_eq!(snap.roots(), vec!["a"]);
    }

    #[test]
    fn test_ancestor_check_covers_every_child() {
        // The moved item's descendant is not its first child
        let mut snap = Snap::new();
        snap.append_items(["a"], None).unwrap();
        snap.append_items(["a1", "a2", "a3"], Some(&"a")).unwrap();
        snap.append_items(["deep"], Some(&"a3")).unwrap();

        assert!(snap.is_ancestor(&"a", &"deep"));
        assert!(!snap.is_ancestor(&"a1", &"deep"));
        assert!(!snap.is_ancestor(&"deep", &"deep"));
        assert!(!snap.can_move_item(&"a", &"deep"));
        assert!(snap.can_move_item(&"deep", &"a1"));
    }

    #[test]
    fn test_moves_carry_subtrees() {
        let mut snap = Snap::new();
        snap.append_items(["a", "b", "c"], None).unwrap();
        snap.append_items(["a1", "a2"], Some(&"a")).unwrap();
        snap.append_items(["x"], Some(&"a2")).unwrap();

        snap.move_item_into(&"a2", &"c").unwrap();
        assert_eq!(snap.child_ids(Some(&"c")), vec!["a2"]);
        assert_eq!(snap.child_ids(Some(&"a2")), vec!["x"]);
        assert_eq!(snap.parent_of(&"a2"), Some("c"));

        snap.move_item_before(&"c", &"a").unwrap();
        assert_eq!(snap.roots(), vec!["c", "a", "b"]);

        snap.move_item_after(&"a1", &"b").unwrap();
        assert_eq!(snap.roots(), vec!["c", "a", "b", "a1"]);
        assert_eq!(snap.parent_of(&"a1"), None);

        assert_eq!(
            snap.item_identifiers(),
            vec!["c", "a2", "x", "a", "b", "a1"]
        );
    }

    #[test]
    fn test_enumerate_items_reports_parents() {
        let snap = chain();
        let mut seen = Vec::new();
        snap.enumerate_items(|item, parent| seen.push((*item, parent.copied())));
        assert_eq!(
            seen,
            vec![
                ("a", None),
                ("b", Some("a")),
                ("c", Some("b")),
                ("d", Some("c")),
            ]
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let original = chain();
        let mut copy = original.clone();
        copy.delete_items(&["c"]).unwrap();
        copy.append_items(["z"], None).unwrap();

        assert_eq!(original.item_identifiers(), vec!["a", "b", "c", "d"]);
        assert_eq!(copy.item_identifiers(), vec!["a", "b", "z"]);
    }

    #[test]
    fn test_concrete_scenario() {
        let mut snap = Snap::new();
        snap.append_items(["a", "b", "c"], None).unwrap();
        snap.append_items(["a1"], Some(&"a")).unwrap();
        snap.append_items(["b2"], Some(&"b")).unwrap();

        snap.insert_items_after(["a2", "a3"], &"a1").unwrap();
        snap.insert_items_before(["b1"], &"b2").unwrap();
        snap.delete_items(&["a1", "b2"]).unwrap();

        assert_eq!(
            snap.item_identifiers(),
            vec!["a", "a2", "a3", "b", "b1", "c"]
        );
    }
}
