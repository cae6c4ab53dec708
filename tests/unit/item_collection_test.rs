use std::collections::HashSet;

use rstest::rstest;
use tabbed_gallery::managers::item_collection::{CollectionChange, ItemCollection};
use tabbed_gallery::types::item::{FileId, Item, ReactionState};
use tabbed_gallery::types::reaction::RemovedItem;

fn item(id: u64) -> Item {
    Item::new(id, format!("/media/{}.jpg", id))
}

fn collection(ids: &[u64]) -> ItemCollection {
    let mut items = ItemCollection::new();
    items.replace_all(ids.iter().map(|id| item(*id)).collect());
    items
}

fn ids(items: &ItemCollection) -> Vec<u64> {
    items.ids().into_iter().map(|id| id.0).collect()
}

#[test]
fn test_append_adds_to_end() {
    let mut items = collection(&[1, 2]);
    items.append(vec![item(3), item(4)]);
    assert_eq!(ids(&items), vec![1, 2, 3, 4]);
}

#[test]
fn test_append_skips_duplicate_ids() {
    let mut items = collection(&[1, 2]);
    let mut replacement = item(2);
    replacement.previewed_count = 9;
    items.append(vec![replacement, item(3), item(3)]);
    assert_eq!(ids(&items), vec![1, 2, 3]);
    assert_eq!(items.get_by_id(FileId(2)).unwrap().previewed_count, 0);
}

#[test]
fn test_replace_all_keeps_given_order() {
    let mut items = collection(&[1, 2, 3]);
    items.replace_all(vec![item(9), item(7), item(8)]);
    assert_eq!(ids(&items), vec![9, 7, 8]);
}

#[test]
fn test_remove_by_id_reports_index() {
    let mut items = collection(&[1, 2, 3]);
    let removed = items.remove_by_id(FileId(2)).unwrap();
    assert_eq!(removed.index, 1);
    assert_eq!(removed.item.id, FileId(2));
    assert_eq!(ids(&items), vec![1, 3]);
}

#[test]
fn test_remove_missing_id_is_noop() {
    let mut items = collection(&[1, 2, 3]);
    let revision = items.revision();
    assert!(items.remove_by_id(FileId(42)).is_none());
    assert_eq!(ids(&items), vec![1, 2, 3]);
    assert_eq!(items.revision(), revision);
}

#[test]
fn test_remove_many_reports_pre_removal_indices() {
    let mut items = collection(&[1, 2, 3, 4, 5]);
    let wanted: HashSet<FileId> = [FileId(2), FileId(4), FileId(99)].into_iter().collect();
    let removed = items.remove_many_by_id(&wanted);
    let indices: Vec<usize> = removed.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 3]);
    assert_eq!(ids(&items), vec![1, 3, 5]);
}

#[rstest]
#[case(0, vec![2, 1, 3])]
#[case(1, vec![1, 2, 3])]
#[case(2, vec![1, 3, 2])]
#[case(10, vec![1, 3, 2])]
fn test_restore_clamps_index(#[case] index: usize, #[case] expected: Vec<u64>) {
    let mut items = collection(&[1, 3]);
    items.restore(item(2), index);
    assert_eq!(ids(&items), expected);
}

#[test]
fn test_restore_of_present_id_is_noop() {
    let mut items = collection(&[1, 2, 3]);
    assert_eq!(items.restore(item(2), 0), None);
    assert_eq!(ids(&items), vec![1, 2, 3]);
}

#[test]
fn test_restore_many_merges_at_recorded_indices() {
    let mut items = collection(&[1, 2, 3]);
    let placed = items.restore_many(vec![
        RemovedItem {
            item: item(20),
            index: 3,
        },
        RemovedItem {
            item: item(10),
            index: 1,
        },
    ]);
    // [A, X, B, Y, C]
    assert_eq!(ids(&items), vec![1, 10, 2, 20, 3]);
    assert_eq!(placed, vec![1, 3]);
}

#[test]
fn test_restore_many_appends_beyond_end() {
    let mut items = collection(&[1]);
    items.restore_many(vec![
        RemovedItem {
            item: item(5),
            index: 7,
        },
        RemovedItem {
            item: item(4),
            index: 4,
        },
    ]);
    assert_eq!(ids(&items), vec![1, 4, 5]);
}

#[test]
fn test_restore_many_skips_present_ids() {
    let mut items = collection(&[1, 2]);
    items.restore_many(vec![
        RemovedItem {
            item: item(2),
            index: 0,
        },
        RemovedItem {
            item: item(3),
            index: 0,
        },
    ]);
    assert_eq!(ids(&items), vec![3, 1, 2]);
}

#[test]
fn test_restore_many_with_duplicate_indices_keeps_everything() {
    let mut items = collection(&[1, 2]);
    items.restore_many(vec![
        RemovedItem {
            item: item(8),
            index: 1,
        },
        RemovedItem {
            item: item(9),
            index: 1,
        },
    ]);
    assert_eq!(ids(&items), vec![1, 8, 9, 2]);
}

#[test]
fn test_batch_round_trip_restores_original_order() {
    let mut items = collection(&[1, 2, 3, 4, 5, 6]);
    let wanted: HashSet<FileId> = [FileId(1), FileId(4), FileId(6)].into_iter().collect();
    let removed = items.remove_many_by_id(&wanted);
    items.restore_many(removed);
    assert_eq!(ids(&items), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_update_by_id_patches_in_place() {
    let mut items = collection(&[1, 2]);
    assert!(items.update_by_id(FileId(2), |it| {
        it.previewed_count = 3;
        it.reaction_state = ReactionState::AutoDisliked;
    }));
    let patched = items.get_by_id(FileId(2)).unwrap();
    assert_eq!(patched.previewed_count, 3);
    assert_eq!(patched.reaction_state, ReactionState::AutoDisliked);
    assert!(!items.update_by_id(FileId(7), |it| it.previewed_count = 1));
}

#[test]
fn test_subscribers_see_every_change() {
    let mut items = collection(&[1, 2, 3]);
    let mut rx = items.subscribe();
    assert!(!rx.has_changed().unwrap());

    items.remove_by_id(FileId(2));
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.change, CollectionChange::Removed { indices: vec![1] });
    assert_eq!(seen.revision, items.revision());

    items.restore(item(2), 1);
    assert_eq!(
        rx.borrow_and_update().change,
        CollectionChange::Restored { indices: vec![1] }
    );
}
