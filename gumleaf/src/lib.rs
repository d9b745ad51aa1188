//! # Gumleaf
//!
//! Keyed forest diffing with move inference.
//!
//! Gumleaf compares two depth-first flattenings of a forest whose nodes carry
//! stable, unique ids, and produces the removals, insertions and moves that
//! turn the first into the second.
//!
//! ## Algorithm Overview
//!
//! 1. **Matching**: pair old and new entries by id, ignoring where they sit
//! 2. **Stable run**: among pairs that kept their parent, find the longest
//!    common subsequence (a longest increasing subsequence, since ids are unique)
//! 3. **Edit script generation**: everything outside the stable run becomes a
//!    REMOVE (old order) and/or an INSERT (new order); matched pairs outside the
//!    run are correlated into moves
//! 4. **Simplification** (optional): removals covered by a removed ancestor are
//!    dropped
//!
//! ## Usage
//!
//! ```
//! use gumleaf::{Entry, Path, diff};
//!
//! let old = vec![
//!     Entry::new("a", None, Path::from([0])),
//!     Entry::new("b", None, Path::from([1])),
//! ];
//! let new = vec![
//!     Entry::new("b", None, Path::from([0])),
//!     Entry::new("a", None, Path::from([1])),
//!     Entry::new("c", Some("a"), Path::from([1, 0])),
//! ];
//!
//! let script = diff(&old, &new);
//! assert_eq!(script.moves().len(), 1);
//! assert_eq!(script.stats().inserted, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

mod tracing_macros;

/// Flattened entries and paths
pub mod entry;
/// Identity matching and the stable run
pub mod matching;
mod script;
mod simplify;

pub use entry::{Entry, Path};
pub use matching::{Matching, longest_common_subsequence, match_entries};
pub use script::{DiffStats, Edit, EditScript, Move, generate_edit_script};
pub use simplify::simplify_edit_script;

use core::fmt;
use core::hash::Hash;

/// Compute the edit script between two flattenings.
///
/// This is the main entry point. It:
/// 1. Pairs entries by id
/// 2. Generates the edit script with move inference
pub fn diff<K>(old: &[Entry<K>], new: &[Entry<K>]) -> EditScript<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    let (script, _matching) = diff_with_matching(old, new);
    script
}

/// Like [`diff`], but also returns the id matching.
///
/// Useful when a consumer needs to go from an old flat position to the new
/// one for entries that produced no edit.
pub fn diff_with_matching<K>(old: &[Entry<K>], new: &[Entry<K>]) -> (EditScript<K>, Matching)
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    let matching = match_entries(old, new);
    let script = generate_edit_script(old, new, &matching);
    (script, matching)
}
