//! Change-set computation
//!
//! Pure comparison of a current document against a baseline. The result is an
//! identity-keyed set, never a sequence; iteration order of the inputs is
//! irrelevant. Complexity is O(n + m) via hash indexes over both sides.

use crate::types::{Document, ItemId};
use std::collections::{BTreeSet, HashMap};

/// Ids of items that differ between `current` and `baseline`.
///
/// An item counts as changed when:
/// - it exists in `current` but not in `baseline` (addition),
/// - it exists in both but `text` or `completed` differs (modification),
/// - it exists in `baseline` but not in `current` (deletion).
///
/// An item added and then deleted within the same session is absent from both
/// sides and contributes nothing: there is nothing to revert.
pub fn changed_ids(current: &Document, baseline: &Document) -> BTreeSet<ItemId> {
    let baseline_index: HashMap<ItemId, &crate::types::Item> =
        baseline.iter().map(|item| (item.id, item)).collect();
    let current_index: HashMap<ItemId, ()> = current.iter().map(|item| (item.id, ())).collect();

    let mut changed = BTreeSet::new();

    for item in current.iter() {
        match baseline_index.get(&item.id) {
            None => {
                changed.insert(item.id);
            }
            Some(original) => {
                if item.text != original.text || item.completed != original.completed {
                    changed.insert(item.id);
                }
            }
        }
    }

    for item in baseline.iter() {
        if !current_index.contains_key(&item.id) {
            changed.insert(item.id);
        }
    }

    changed
}

/// Cardinality of [`changed_ids`] — the published uncommitted-change count.
pub fn changed_count(current: &Document, baseline: &Document) -> usize {
    changed_ids(current, baseline).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    fn doc(items: Vec<Item>) -> Document {
        Document { items }
    }

    #[test]
    fn identical_documents_have_no_changes() {
        let a = Item::new("a");
        let current = doc(vec![a.clone()]);
        let baseline = doc(vec![a]);
        assert!(changed_ids(&current, &baseline).is_empty());
    }

    #[test]
    fn addition_is_one_change() {
        let a = Item::new("a");
        let b = Item::new("b");
        let baseline = doc(vec![a.clone()]);
        let current = doc(vec![a, b.clone()]);
        let changed = changed_ids(&current, &baseline);
        assert_eq!(changed.len(), 1);
        assert!(changed.contains(&b.id));
    }

    #[test]
    fn text_and_completed_modifications_count_once_per_item() {
        let a = Item::new("a");
        let mut a_edited = a.clone();
        a_edited.text = "a2".to_string();
        a_edited.completed = true;
        let baseline = doc(vec![a]);
        let current = doc(vec![a_edited.clone()]);
        let changed = changed_ids(&current, &baseline);
        assert_eq!(changed.len(), 1);
        assert!(changed.contains(&a_edited.id));
    }

    #[test]
    fn deletion_is_one_change() {
        let a = Item::new("a");
        let b = Item::new("b");
        let baseline = doc(vec![a.clone(), b.clone()]);
        let current = doc(vec![a]);
        let changed = changed_ids(&current, &baseline);
        assert_eq!(changed.len(), 1);
        assert!(changed.contains(&b.id));
    }

    #[test]
    fn add_then_delete_contributes_nothing() {
        let a = Item::new("a");
        let baseline = doc(vec![a.clone()]);
        // b was added and deleted again before comparison; it is on neither side.
        let current = doc(vec![a]);
        assert_eq!(changed_count(&current, &baseline), 0);
    }

    #[test]
    fn mixed_changes_union_across_both_passes() {
        let keep = Item::new("keep");
        let edit = Item::new("edit");
        let gone = Item::new("gone");
        let mut edited = edit.clone();
        edited.completed = true;
        let added = Item::new("added");

        let baseline = doc(vec![keep.clone(), edit, gone.clone()]);
        let current = doc(vec![keep, edited.clone(), added.clone()]);

        let changed = changed_ids(&current, &baseline);
        assert_eq!(changed.len(), 3);
        assert!(changed.contains(&edited.id));
        assert!(changed.contains(&gone.id));
        assert!(changed.contains(&added.id));
    }

    #[test]
    fn order_of_items_is_irrelevant() {
        let a = Item::new("a");
        let b = Item::new("b");
        let forward = doc(vec![a.clone(), b.clone()]);
        let reversed = doc(vec![b, a]);
        assert_eq!(changed_count(&forward, &reversed), 0);
    }
}
