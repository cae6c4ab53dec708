use std::collections::HashSet;
use std::time::{Duration, Instant};

use tabbed_gallery::managers::item_collection::ItemCollection;
use tabbed_gallery::managers::reaction_queue::ReactionUndoQueue;
use tabbed_gallery::services::in_memory::RecordingReactionService;
use tabbed_gallery::types::errors::ServiceError;
use tabbed_gallery::types::item::{FileId, Item, ReactionKind};
use tabbed_gallery::types::reaction::{ReactionEvent, RemovedItem};
use tabbed_gallery::types::tab::TabId;

const COUNTDOWN: Duration = Duration::from_secs(5);

fn collection(ids: &[u64]) -> ItemCollection {
    let mut items = ItemCollection::new();
    items.replace_all(
        ids.iter()
            .map(|id| Item::new(*id, format!("/media/{}.jpg", id)))
            .collect(),
    );
    items
}

fn ids(items: &ItemCollection) -> Vec<u64> {
    items.ids().into_iter().map(|id| id.0).collect()
}

fn tab() -> TabId {
    TabId::from("tab-1")
}

#[test]
fn test_queue_removes_item_immediately() {
    let t0 = Instant::now();
    let mut items = collection(&[1, 2, 3]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);

    let events = queue.queue(&tab(), FileId(2), ReactionKind::Love, t0, &mut items);

    assert_eq!(ids(&items), vec![1, 3]);
    assert_eq!(
        events,
        vec![ReactionEvent::Removed {
            tab_id: tab(),
            file_id: FileId(2),
            index: 1
        }]
    );
    let entry = queue.get(FileId(2)).unwrap();
    assert_eq!(entry.removed_index(), Some(1));
    assert_eq!(queue.pending_tab(FileId(2)), Some(&tab()));
}

#[test]
fn test_cancel_restores_at_recorded_index() {
    let t0 = Instant::now();
    let mut items = collection(&[1, 2, 3]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(2), ReactionKind::Like, t0, &mut items);

    let event = queue.cancel(FileId(2), &mut items).unwrap();

    assert_eq!(ids(&items), vec![1, 2, 3]);
    assert_eq!(
        event,
        ReactionEvent::Restored {
            tab_id: tab(),
            file_id: FileId(2),
            index: 1
        }
    );
    assert!(queue.is_empty());
}

#[test]
fn test_cancel_unknown_id_is_silent() {
    let mut items = collection(&[1]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    assert!(queue.cancel(FileId(8), &mut items).is_none());
    assert_eq!(ids(&items), vec![1]);
}

#[test]
fn test_commit_after_countdown() {
    let t0 = Instant::now();
    let service = RecordingReactionService::new();
    let mut items = collection(&[1, 2]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(1), ReactionKind::Dislike, t0, &mut items);

    assert!(queue
        .commit_due(t0 + Duration::from_secs(4), &service)
        .is_empty());
    let events = queue.commit_due(t0 + COUNTDOWN, &service);

    assert_eq!(
        events,
        vec![ReactionEvent::Committed {
            tab_id: tab(),
            file_id: FileId(1),
            kind: ReactionKind::Dislike
        }]
    );
    assert_eq!(service.submitted(), vec![(FileId(1), ReactionKind::Dislike)]);
    assert!(queue.is_empty());
    assert!(queue.cancel(FileId(1), &mut items).is_none());
    assert_eq!(ids(&items), vec![2]);
}

#[test]
fn test_requeue_replaces_entry_and_resets_countdown() {
    let t0 = Instant::now();
    let service = RecordingReactionService::new();
    let mut items = collection(&[1, 2, 3]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(2), ReactionKind::Like, t0, &mut items);

    let later = t0 + Duration::from_secs(3);
    let events = queue.queue(&tab(), FileId(2), ReactionKind::Love, later, &mut items);
    assert!(events.is_empty());
    assert_eq!(queue.len(), 1);

    assert!(queue.commit_due(t0 + COUNTDOWN, &service).is_empty());
    queue.commit_due(later + COUNTDOWN, &service);
    assert_eq!(service.submitted(), vec![(FileId(2), ReactionKind::Love)]);
}

#[test]
fn test_requeue_keeps_original_removal_for_cancel() {
    let t0 = Instant::now();
    let mut items = collection(&[1, 2, 3]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(2), ReactionKind::Like, t0, &mut items);
    queue.queue(&tab(), FileId(2), ReactionKind::Dislike, t0, &mut items);

    queue.cancel(FileId(2), &mut items);
    assert_eq!(ids(&items), vec![1, 2, 3]);
}

#[test]
fn test_failed_commit_reports_and_keeps_item_removed() {
    let t0 = Instant::now();
    let service = RecordingReactionService::new();
    service.fail_next(ServiceError::Network("offline".to_string()));
    let mut items = collection(&[1, 2]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(1), ReactionKind::Like, t0, &mut items);

    let events = queue.commit_due(t0 + COUNTDOWN, &service);

    assert!(matches!(
        events.as_slice(),
        [ReactionEvent::CommitFailed { file_id: FileId(1), error: ServiceError::Network(_), .. }]
    ));
    assert_eq!(ids(&items), vec![2]);
    assert!(queue.is_empty());
}

#[test]
fn test_discard_tab_drops_only_that_tab() {
    let t0 = Instant::now();
    let service = RecordingReactionService::new();
    let mut first = collection(&[1, 2]);
    let mut second = collection(&[3]);
    let other = TabId::from("tab-2");
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(1), ReactionKind::Like, t0, &mut first);
    queue.queue(&other, FileId(3), ReactionKind::Like, t0, &mut second);

    let discarded = queue.discard_tab(&tab());
    assert_eq!(discarded.len(), 1);
    assert_eq!(discarded[0].file_id, FileId(1));

    queue.commit_due(t0 + COUNTDOWN, &service);
    assert_eq!(service.submitted(), vec![(FileId(3), ReactionKind::Like)]);
}

#[test]
fn test_rehydrated_items_restore_at_recorded_removals() {
    let t0 = Instant::now();
    let mut items = collection(&[1, 2, 3, 4]);
    let mut elsewhere = collection(&[9]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(2), ReactionKind::Like, t0, &mut items);
    queue.queue(&tab(), FileId(3), ReactionKind::Dislike, t0, &mut items);
    queue.queue(&TabId::from("tab-2"), FileId(9), ReactionKind::Like, t0, &mut elsewhere);

    let pending = queue.pending_ids(&tab());
    assert_eq!(pending, HashSet::from([FileId(2), FileId(3)]));

    // The tab comes back from persistence with every item present.
    let mut fresh = collection(&[1, 2, 3, 4, 5]);
    let mut removed = fresh.remove_many_by_id(&pending);
    removed.push(RemovedItem {
        item: Item::new(5u64, "/media/5.jpg"),
        index: 4,
    });
    queue.record_removals(removed);
    assert_eq!(ids(&fresh), vec![1, 4, 5]);
    assert!(queue.get(FileId(5)).is_none());

    queue.cancel(FileId(2), &mut fresh).unwrap();
    queue.cancel(FileId(3), &mut fresh).unwrap();
    assert_eq!(ids(&fresh), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_remaining_is_display_only() {
    let t0 = Instant::now();
    let mut items = collection(&[1]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);
    queue.queue(&tab(), FileId(1), ReactionKind::Like, t0, &mut items);

    assert_eq!(
        queue.remaining(FileId(1), t0 + Duration::from_secs(2)),
        Some(Duration::from_secs(3))
    );
    assert_eq!(
        queue.remaining(FileId(1), t0 + Duration::from_secs(9)),
        Some(Duration::ZERO)
    );
    assert_eq!(queue.next_deadline(), Some(t0 + COUNTDOWN));
}

#[test]
fn test_queue_for_absent_item_still_commits() {
    let t0 = Instant::now();
    let service = RecordingReactionService::new();
    let mut items = collection(&[1]);
    let mut queue = ReactionUndoQueue::new(COUNTDOWN);

    let events = queue.queue(&tab(), FileId(9), ReactionKind::Love, t0, &mut items);
    assert!(events.is_empty());
    assert!(queue.cancel(FileId(9), &mut items).is_none());
    assert_eq!(ids(&items), vec![1]);
    assert_eq!(queue.commit_due(t0 + COUNTDOWN, &service).len(), 1);
    assert_eq!(service.submitted(), vec![(FileId(9), ReactionKind::Love)]);
}
