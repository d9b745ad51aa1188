//! Edit script simplification.
//!
//! Consolidates redundant removals: when a subtree is removed, its
//! descendants that are removed along with it are not reported individually.
//! Descendants that move out of a removed subtree are kept, since they
//! survive their ancestor.

use crate::script::{Edit, EditScript};
use crate::{debug, trace};
use core::fmt;
use core::hash::Hash;
use rapidhash::RapidHashSet as HashSet;

/// Simplify an edit script by collapsing cascading removals onto the
/// topmost removed ancestor.
///
/// Insertions and moves are left untouched.
pub fn simplify_edit_script<K>(script: EditScript<K>) -> EditScript<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    debug!(ops_count = script.len(), "simplify_edit_script start");

    let removed: HashSet<K> = script
        .removals()
        .filter(|edit| !edit.is_move())
        .map(|edit| edit.id().clone())
        .collect();

    let edits: Vec<Edit<K>> = script
        .into_iter()
        .filter(|edit| match edit {
            Edit::Remove {
                parent: Some(parent),
                moved_to: None,
                ..
            } if removed.contains(parent) => {
                trace!(id = ?edit.id(), ?parent, "dropping remove covered by ancestor");
                false
            }
            _ => true,
        })
        .collect();

    debug!(ops_count = edits.len(), "simplify_edit_script done");
    EditScript::from_edits(edits)
}
