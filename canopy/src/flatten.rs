//! Flattening a snapshot into the diff engine's input.

use crate::item::Item;
use crate::snapshot::ForestSnapshot;
use gumleaf::Entry;

/// Flatten a snapshot depth-first, in display order.
///
/// Every item appears exactly once, with its parent id and its path of
/// sibling indices from the root level.
pub fn flatten<I: Item>(snapshot: &ForestSnapshot<I>) -> Vec<Entry<I::Id>> {
    let mut entries = Vec::with_capacity(snapshot.len());
    snapshot.walk(|id, parent, path| {
        entries.push(Entry::new(id.clone(), parent.cloned(), path.clone()));
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use gumleaf::Path;

    #[test]
    fn test_flatten_display_order_and_paths() {
        let mut snap = ForestSnapshot::<u32>::new();
        snap.append_items([1, 2], None).unwrap();
        snap.append_items([10, 11], Some(&1)).unwrap();
        snap.append_items([110], Some(&11)).unwrap();
        snap.append_items([20], Some(&2)).unwrap();

        let rendered: Vec<String> = flatten(&snap)
            .iter()
            .map(|e| format!("{}:{:?}@{}", e.id, e.parent, e.path))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "1:None@0",
                "10:Some(1)@0.0",
                "11:Some(1)@0.1",
                "110:Some(11)@0.1.0",
                "2:None@1",
                "20:Some(2)@1.0",
            ]
        );
    }

    #[test]
    fn test_flatten_matches_item_identifiers() {
        let mut snap = ForestSnapshot::<&'static str>::new();
        snap.append_items(["x", "y"], None).unwrap();
        snap.append_items(["y1"], Some(&"y")).unwrap();
        snap.move_item_before(&"y", &"x").unwrap();

        let ids: Vec<&str> = flatten(&snap).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, snap.item_identifiers());
        assert_eq!(flatten(&snap)[2].path, Path::from([1]));
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&ForestSnapshot::<u32>::new()).is_empty());
    }
}
