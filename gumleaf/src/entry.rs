//! Flattened forest entries, the input of the diff engine.

use core::fmt;
use smallvec::SmallVec;

/// Sibling indices from the root level down to a node.
///
/// `[2, 1]` is the second child of the third root. Paths compare
/// lexicographically, which is the same order as a depth-first walk.
///
/// Uses `SmallVec<[u32; 16]>` so typical outline depths never allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(pub SmallVec<[u32; 16]>);

impl Path {
    /// The empty path, which addresses the virtual root.
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// The path of the `index`-th child of the node at this path.
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index as u32);
        Self(segments)
    }

    /// Number of segments. Roots have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Position among siblings (the last segment).
    pub fn index(&self) -> Option<usize> {
        self.0.last().map(|&i| i as usize)
    }

    /// Path of the containing node, `None` for the virtual root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(SmallVec::from_slice(rest)))
    }
}

impl<const N: usize> From<[u32; N]> for Path {
    fn from(segments: [u32; N]) -> Self {
        Self(SmallVec::from_slice(&segments))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", idx)?;
        }
        Ok(())
    }
}

/// One node of a flattened forest.
///
/// Identity is carried by `id` alone; `parent` and `path` describe where the
/// node sits and are exactly what the diff compares across two flattenings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K> {
    /// Caller-supplied identifier, unique within one flattening
    pub id: K,
    /// Identifier of the containing node, `None` at root level
    pub parent: Option<K>,
    /// Sibling indices from the root down to this node
    pub path: Path,
}

impl<K> Entry<K> {
    /// Create a new entry.
    pub fn new(id: K, parent: Option<K>, path: Path) -> Self {
        Self { id, parent, path }
    }

    /// Position among siblings.
    pub fn index(&self) -> usize {
        self.path.index().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_path_display_and_navigation() {
        let path = Path::from([2, 1]);
        assert_eq!(path.to_string(), "2.1");
        assert_eq!(path.index(), Some(1));
        assert_eq!(path.depth(), 2);
        assert_eq!(path.parent(), Some(Path::from([2])));
        assert_eq!(Path::from([2]).parent(), Some(Path::root()));
        assert_eq!(Path::root().parent(), None);
        assert_eq!(Path::from([2]).child(0), Path::from([2, 0]));
    }

    #[test]
    fn test_path_order_is_depth_first() {
        let mut paths = vec![
            Path::from([1]),
            Path::from([0, 1]),
            Path::from([0]),
            Path::from([1, 0, 0]),
            Path::from([0, 0]),
        ];
        paths.sort();
        let rendered: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["0", "0.0", "0.1", "1", "1.0.0"]);
    }
}
