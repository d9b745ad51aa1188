//! Edit script generation with move inference.
//!
//! Generates the REMOVE and INSERT operations that turn an old flattening
//! into a new one, from a [`Matching`] and its stable run:
//! 1. REMOVE: old entries that are unmatched, or matched but displaced
//! 2. INSERT: new entries that are unmatched, or matched but displaced
//!
//! A matched entry is displaced when its parent changed, or when it falls
//! outside the longest common subsequence of the entries that kept their
//! parent.
//! Displaced entries are moves: their REMOVE carries the new flat position
//! and their INSERT carries the old one, so consumers can fold the pair into
//! a single move.

use crate::{debug, trace};
use core::fmt;
use core::hash::Hash;

use crate::entry::{Entry, Path};
use crate::matching::{Matching, longest_common_subsequence};

/// One operation of an edit script.
///
/// Removals are addressed in the old flattening, insertions in the new one.
#[derive(Clone, PartialEq, Eq)]
pub enum Edit<K> {
    /// Remove a node from its old position.
    Remove {
        /// The node's id
        id: K,
        /// Parent in the old forest
        parent: Option<K>,
        /// Flat position in the old flattening
        old_index: usize,
        /// Path in the old forest
        path: Path,
        /// Flat position in the new flattening, when this removal is half of a move
        moved_to: Option<usize>,
    },

    /// Insert a node at its new position.
    Insert {
        /// The node's id
        id: K,
        /// Parent in the new forest
        parent: Option<K>,
        /// Flat position in the new flattening
        new_index: usize,
        /// Path in the new forest
        path: Path,
        /// Flat position in the old flattening, when this insertion is half of a move
        moved_from: Option<usize>,
    },
}

impl<K> Edit<K> {
    /// The id this edit is about.
    pub fn id(&self) -> &K {
        match self {
            Edit::Remove { id, .. } | Edit::Insert { id, .. } => id,
        }
    }

    /// The parent id in the edit's own coordinate space.
    pub fn parent(&self) -> Option<&K> {
        match self {
            Edit::Remove { parent, .. } | Edit::Insert { parent, .. } => parent.as_ref(),
        }
    }

    /// The path in the edit's own coordinate space.
    pub fn path(&self) -> &Path {
        match self {
            Edit::Remove { path, .. } | Edit::Insert { path, .. } => path,
        }
    }

    /// Whether this edit is one half of a move.
    pub fn is_move(&self) -> bool {
        match self {
            Edit::Remove { moved_to, .. } => moved_to.is_some(),
            Edit::Insert { moved_from, .. } => moved_from.is_some(),
        }
    }
}

impl<K: fmt::Debug> fmt::Display for Edit<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Remove {
                id, path, moved_to, ..
            } => {
                write!(f, "Remove({:?} @{}", id, path)?;
                if let Some(to) = moved_to {
                    write!(f, " →{}", to)?;
                }
                write!(f, ")")
            }
            Edit::Insert {
                id,
                path,
                moved_from,
                ..
            } => {
                write!(f, "Insert({:?} @{}", id, path)?;
                if let Some(from) = moved_from {
                    write!(f, " ←{}", from)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Edit<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse Display implementation for Debug
        fmt::Display::fmt(self, f)
    }
}

/// A move, assembled from a correlated REMOVE/INSERT pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move<'a, K> {
    /// The moved node
    pub id: &'a K,
    /// Parent before the move
    pub from_parent: Option<&'a K>,
    /// Path before the move
    pub from: &'a Path,
    /// Parent after the move
    pub to_parent: Option<&'a K>,
    /// Path after the move
    pub to: &'a Path,
}

/// Counts of each kind of change in a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Pure insertions
    pub inserted: usize,
    /// Pure removals
    pub removed: usize,
    /// Moves (each counted once, not once per half)
    pub moved: usize,
}

impl DiffStats {
    /// Total number of view operations these changes translate to.
    pub fn total(&self) -> usize {
        self.inserted + self.removed + self.moved
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} -{} ~{}", self.inserted, self.removed, self.moved)
    }
}

/// An ordered edit script: removals in old order, then insertions in new order.
#[derive(Clone, PartialEq, Eq)]
pub struct EditScript<K> {
    edits: Vec<Edit<K>>,
}

impl<K> Default for EditScript<K> {
    fn default() -> Self {
        Self { edits: Vec::new() }
    }
}

impl<K> EditScript<K> {
    /// Wrap an already ordered list of edits.
    pub fn from_edits(edits: Vec<Edit<K>>) -> Self {
        Self { edits }
    }

    /// Number of edits (a move counts twice, once per half).
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// True when the two flattenings were structurally identical.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// All edits in script order.
    pub fn iter(&self) -> impl Iterator<Item = &Edit<K>> + '_ {
        self.edits.iter()
    }

    /// Removal edits (pure and move halves), in old order.
    pub fn removals(&self) -> impl Iterator<Item = &Edit<K>> + '_ {
        self.edits
            .iter()
            .filter(|edit| matches!(edit, Edit::Remove { .. }))
    }

    /// Insertion edits (pure and move halves), in new order.
    pub fn insertions(&self) -> impl Iterator<Item = &Edit<K>> + '_ {
        self.edits
            .iter()
            .filter(|edit| matches!(edit, Edit::Insert { .. }))
    }

    /// Correlated moves, in new order.
    pub fn moves(&self) -> Vec<Move<'_, K>> {
        let mut sources: Vec<(usize, &Edit<K>)> = self
            .removals()
            .filter_map(|edit| match edit {
                Edit::Remove {
                    old_index,
                    moved_to: Some(_),
                    ..
                } => Some((*old_index, edit)),
                _ => None,
            })
            .collect();
        sources.sort_unstable_by_key(|(old_index, _)| *old_index);

        self.insertions()
            .filter_map(|edit| {
                let Edit::Insert {
                    id,
                    parent,
                    path,
                    moved_from: Some(from),
                    ..
                } = edit
                else {
                    return None;
                };
                let slot = sources
                    .binary_search_by_key(from, |(old_index, _)| *old_index)
                    .ok()?;
                let source = sources[slot].1;
                Some(Move {
                    id,
                    from_parent: source.parent(),
                    from: source.path(),
                    to_parent: parent.as_ref(),
                    to: path,
                })
            })
            .collect()
    }

    /// Count insertions, removals and moves.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for edit in &self.edits {
            match edit {
                Edit::Remove { moved_to: None, .. } => stats.removed += 1,
                Edit::Insert {
                    moved_from: None, ..
                } => stats.inserted += 1,
                Edit::Insert {
                    moved_from: Some(_),
                    ..
                } => stats.moved += 1,
                Edit::Remove { .. } => {}
            }
        }
        stats
    }

    /// Consume the script, returning its edits.
    pub fn into_edits(self) -> Vec<Edit<K>> {
        self.edits
    }
}

impl<K> IntoIterator for EditScript<K> {
    type Item = Edit<K>;
    type IntoIter = <Vec<Edit<K>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

impl<'a, K> IntoIterator for &'a EditScript<K> {
    type Item = &'a Edit<K>;
    type IntoIter = core::slice::Iter<'a, Edit<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

impl<K: fmt::Debug> fmt::Debug for EditScript<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.edits.iter()).finish()
    }
}

/// Wrapper for collecting edits with automatic tracing.
struct Ops<K> {
    inner: Vec<Edit<K>>,
}

impl<K: fmt::Debug> Ops<K> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, op: Edit<K>) {
        trace!(%op, "emit");
        self.inner.push(op);
    }

    fn into_script(self) -> EditScript<K> {
        EditScript { edits: self.inner }
    }
}

/// Generate an edit script from a matching between two flattenings.
///
/// Entries that sit in the longest common subsequence under the same parent
/// produce no edits at all.
pub fn generate_edit_script<K>(
    old: &[Entry<K>],
    new: &[Entry<K>],
    matching: &Matching,
) -> EditScript<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    trace!(matched_pairs = matching.len(), "generate_edit_script start");

    // Re-parented entries move no matter what, so keep them out of the
    // stable run instead of letting them displace entries that stayed put.
    let same_parent = matching.pairs().filter(|&(i, j)| {
        let kept = old[i].parent == new[j].parent;
        if !kept {
            trace!(id = ?old[i].id, "parent changed");
        }
        kept
    });

    let mut stable_old = vec![false; old.len()];
    let mut stable_new = vec![false; new.len()];
    for (i, j) in longest_common_subsequence(same_parent) {
        stable_old[i] = true;
        stable_new[j] = true;
    }

    let mut ops = Ops::with_capacity(old.len() + new.len());

    // Phase 1: REMOVE, in old order
    for (i, entry) in old.iter().enumerate() {
        if stable_old[i] {
            continue;
        }
        ops.push(Edit::Remove {
            id: entry.id.clone(),
            parent: entry.parent.clone(),
            old_index: i,
            path: entry.path.clone(),
            moved_to: matching.get_new(i),
        });
    }

    // Phase 2: INSERT, in new order
    for (j, entry) in new.iter().enumerate() {
        if stable_new[j] {
            continue;
        }
        ops.push(Edit::Insert {
            id: entry.id.clone(),
            parent: entry.parent.clone(),
            new_index: j,
            path: entry.path.clone(),
            moved_from: matching.get_old(j),
        });
    }

    let script = ops.into_script();
    debug!(edits = script.len(), stats = %script.stats(), "generate_edit_script done");
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::match_entries;
    use facet_testhelpers::test;

    type Id = &'static str;

    /// Build a flattening from `(id, parent, dotted path)` triples.
    fn flat(rows: &[(Id, Option<Id>, &str)]) -> Vec<Entry<Id>> {
        rows.iter()
            .map(|(id, parent, path)| {
                let segments = path.split('.').map(|s| s.parse::<u32>().unwrap());
                Entry::new(*id, *parent, Path(segments.collect()))
            })
            .collect()
    }

    fn script(old: &[Entry<Id>], new: &[Entry<Id>]) -> EditScript<Id> {
        let matching = match_entries(old, new);
        generate_edit_script(old, new, &matching)
    }

    #[test]
    fn test_no_changes() {
        let tree = flat(&[
            ("a", None, "0"),
            ("a1", Some("a"), "0.0"),
            ("b", None, "1"),
        ]);
        let ops = script(&tree, &tree);
        assert!(ops.is_empty(), "Identical forests should have no edits");
    }

    #[test]
    fn test_pure_insert() {
        let old = flat(&[("a", None, "0")]);
        let new = flat(&[("a", None, "0"), ("a1", Some("a"), "0.0")]);

        let ops = script(&old, &new);

        assert_eq!(ops.len(), 1);
        let Some(Edit::Insert {
            id,
            parent,
            new_index,
            moved_from,
            ..
        }) = ops.iter().next()
        else {
            panic!("expected an insert, got {:?}", ops);
        };
        assert_eq!(*id, "a1");
        assert_eq!(*parent, Some("a"));
        assert_eq!(*new_index, 1);
        assert_eq!(*moved_from, None);
    }

    #[test]
    fn test_pure_remove_includes_descendants() {
        let old = flat(&[
            ("a", None, "0"),
            ("b", Some("a"), "0.0"),
            ("c", Some("b"), "0.0.0"),
        ]);
        let new = flat(&[("a", None, "0")]);

        let ops = script(&old, &new);

        let removed: Vec<Id> = ops.removals().map(|e| *e.id()).collect();
        assert_eq!(removed, vec!["b", "c"]);
        assert!(ops.iter().all(|e| !e.is_move()));
        assert_eq!(
            ops.stats(),
            DiffStats {
                inserted: 0,
                removed: 2,
                moved: 0
            }
        );
    }

    #[test]
    fn test_reparent_is_a_single_move() {
        // a2 goes from under a to under b; its flat position does not even change
        let old = flat(&[
            ("a", None, "0"),
            ("a1", Some("a"), "0.0"),
            ("a2", Some("a"), "0.1"),
            ("b", None, "1"),
        ]);
        let new = flat(&[
            ("a", None, "0"),
            ("a1", Some("a"), "0.0"),
            ("b", None, "1"),
            ("a2", Some("b"), "1.0"),
        ]);

        let ops = script(&old, &new);
        debug!(?ops, "reparent script");

        let moves = ops.moves();
        assert_eq!(moves.len(), 1, "expected one move, got {:?}", ops);
        assert_eq!(*moves[0].id, "a2");
        assert_eq!(moves[0].from_parent, Some(&"a"));
        assert_eq!(moves[0].to_parent, Some(&"b"));
        assert_eq!(moves[0].to, &Path::from([1, 0]));
        assert_eq!(ops.len(), 2, "only the two halves of the move: {:?}", ops);
        assert_eq!(ops.stats().moved, 1);
    }

    #[test]
    fn test_reparent_inside_stable_run() {
        // Flat order is unchanged, only the parent pointer of c changes
        let old = flat(&[
            ("a", None, "0"),
            ("b", Some("a"), "0.0"),
            ("c", Some("a"), "0.1"),
        ]);
        let new = flat(&[
            ("a", None, "0"),
            ("b", Some("a"), "0.0"),
            ("c", Some("b"), "0.0.0"),
        ]);

        let ops = script(&old, &new);

        let moves = ops.moves();
        assert_eq!(moves.len(), 1, "got {:?}", ops);
        assert_eq!(*moves[0].id, "c");
        assert_eq!(moves[0].from, &Path::from([0, 1]));
        assert_eq!(moves[0].to, &Path::from([0, 0, 0]));
    }

    #[test]
    fn test_swap_two_siblings() {
        let old = flat(&[("a", None, "0"), ("b", None, "1")]);
        let new = flat(&[("b", None, "0"), ("a", None, "1")]);

        let ops = script(&old, &new);

        // One of the two stays, the other moves around it
        let moves = ops.moves();
        assert_eq!(moves.len(), 1, "got {:?}", ops);
        assert_eq!(ops.stats().total(), 1);
    }

    #[test]
    fn test_script_order() {
        let old = flat(&[("x", None, "0"), ("a", None, "1"), ("y", None, "2")]);
        let new = flat(&[("p", None, "0"), ("a", None, "1"), ("q", None, "2")]);

        let ops = script(&old, &new);
        let rendered: Vec<String> = ops.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Remove(\"x\" @0)",
                "Remove(\"y\" @2)",
                "Insert(\"p\" @0)",
                "Insert(\"q\" @2)",
            ]
        );
    }

    #[test]
    fn test_move_records_both_coordinates() {
        let old = flat(&[("a", None, "0"), ("b", None, "1"), ("c", None, "2")]);
        let new = flat(&[("c", None, "0"), ("a", None, "1"), ("b", None, "2")]);

        let ops = script(&old, &new);
        let rendered: Vec<String> = ops.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["Remove(\"c\" @2 →0)", "Insert(\"c\" @0 ←2)"]);
    }

    #[test]
    fn test_owned_iteration_yields_edits_in_order() {
        let old = flat(&[("x", None, "0"), ("a", None, "1")]);
        let new = flat(&[("a", None, "0"), ("y", None, "1")]);

        let ids: Vec<Id> = script(&old, &new).into_iter().map(|e| *e.id()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }
}
