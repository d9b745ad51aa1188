//! Indented text rendering of outlines, for logs and test failures.

use core::fmt;

use crate::item::Item;
use crate::snapshot::ForestSnapshot;

/// Displays a snapshot as an indented outline, one `Debug`-rendered id per
/// line, two spaces per level. Items marked for reload end with ` *`.
///
/// ```text
/// "a"
///   "a1" *
/// "b"
/// ```
pub struct SnapshotDump<'a, I: Item> {
    snapshot: &'a ForestSnapshot<I>,
}

impl<I: Item> ForestSnapshot<I> {
    /// Render this snapshot as an indented outline.
    pub fn dump(&self) -> SnapshotDump<'_, I> {
        SnapshotDump { snapshot: self }
    }
}

impl<I: Item> fmt::Display for SnapshotDump<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.snapshot.walk(|id, _parent, path| {
            if result.is_err() {
                return;
            }
            let marked = self.snapshot.is_marked_for_reload(id);
            result = write_row(f, path.depth(), id, marked);
        });
        result
    }
}

/// One outline row: indentation for `depth` (roots are depth 1), the id, and
/// the reload marker.
pub(crate) fn write_row(
    f: &mut impl fmt::Write,
    depth: usize,
    id: &impl fmt::Debug,
    marked: bool,
) -> fmt::Result {
    for _ in 1..depth {
        f.write_str("  ")?;
    }
    write!(f, "{id:?}")?;
    if marked {
        f.write_str(" *")?;
    }
    f.write_str("\n")
}
