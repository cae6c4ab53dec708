use std::time::{Duration, Instant};

use tabbed_gallery::managers::preview_batcher::PreviewBatcher;
use tabbed_gallery::services::in_memory::InMemoryCounters;
use tabbed_gallery::types::errors::ServiceError;
use tabbed_gallery::types::item::FileId;

const WINDOW: Duration = Duration::from_millis(250);

#[test]
fn test_not_due_before_window_elapses() {
    let t0 = Instant::now();
    let mut batcher = PreviewBatcher::new(WINDOW, 10);
    let _rx = batcher.queue_increment(FileId(1), t0);
    assert!(!batcher.is_due(t0 + Duration::from_millis(100)));
    assert!(batcher.is_due(t0 + WINDOW));
    assert_eq!(batcher.next_flush_at(), Some(t0 + WINDOW));
}

#[test]
fn test_empty_batcher_is_never_due() {
    let batcher = PreviewBatcher::new(WINDOW, 10);
    assert!(!batcher.is_due(Instant::now() + Duration::from_secs(60)));
    assert_eq!(batcher.next_flush_at(), None);
}

#[test]
fn test_same_id_coalesces_into_one_entry() {
    let t0 = Instant::now();
    let counters = InMemoryCounters::new();
    let mut batcher = PreviewBatcher::new(WINDOW, 10);
    let mut first = batcher.queue_increment(FileId(1), t0);
    let mut second = batcher.queue_increment(FileId(1), t0 + Duration::from_millis(10));
    let mut other = batcher.queue_increment(FileId(2), t0 + Duration::from_millis(20));
    assert_eq!(batcher.pending_len(), 2);

    let results = batcher.flush_if_due(t0 + WINDOW, &counters).unwrap().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(counters.preview_batches(), vec![vec![FileId(1), FileId(2)]]);

    let a = first.try_recv().unwrap().unwrap();
    let b = second.try_recv().unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.previewed_count, 1);
    assert_eq!(other.try_recv().unwrap().unwrap().file_id, FileId(2));
    assert_eq!(batcher.pending_len(), 0);
}

#[test]
fn test_full_batch_is_due_immediately_and_rest_waits() {
    let t0 = Instant::now();
    let counters = InMemoryCounters::new();
    let mut batcher = PreviewBatcher::new(WINDOW, 2);
    let _a = batcher.queue_increment(FileId(1), t0);
    let _b = batcher.queue_increment(FileId(2), t0);
    let mut c = batcher.queue_increment(FileId(3), t0);
    assert!(batcher.is_due(t0));

    let flushed_at = t0 + Duration::from_millis(5);
    batcher.flush(flushed_at, &counters).unwrap();
    assert_eq!(counters.preview_batches(), vec![vec![FileId(1), FileId(2)]]);
    assert_eq!(batcher.pending_len(), 1);
    assert!(c.try_recv().is_err());
    assert_eq!(batcher.next_flush_at(), Some(flushed_at + WINDOW));
}

#[test]
fn test_auto_dislike_flag_is_relayed() {
    let t0 = Instant::now();
    let counters = InMemoryCounters::new();
    let mut batcher = PreviewBatcher::new(WINDOW, 10);
    let mut last = None;
    for round in 0..3u32 {
        let now = t0 + WINDOW * (round * 2);
        let rx = batcher.queue_increment(FileId(5), now);
        batcher.flush(now, &counters).unwrap();
        last = Some(rx);
    }
    let result = last.unwrap().try_recv().unwrap().unwrap();
    assert_eq!(result.previewed_count, 3);
    assert!(result.auto_disliked);
}

#[test]
fn test_failed_flush_rejects_every_waiter() {
    let t0 = Instant::now();
    let counters = InMemoryCounters::new();
    counters.fail_next(ServiceError::Timeout);
    let mut batcher = PreviewBatcher::new(WINDOW, 10);
    let mut a = batcher.queue_increment(FileId(1), t0);
    let mut b = batcher.queue_increment(FileId(2), t0);

    let err = batcher.flush(t0, &counters).unwrap_err();
    assert_eq!(err, ServiceError::Timeout);
    assert_eq!(a.try_recv().unwrap(), Err(ServiceError::Timeout));
    assert_eq!(b.try_recv().unwrap(), Err(ServiceError::Timeout));
    assert_eq!(batcher.pending_len(), 0);
}

#[tokio::test]
async fn test_receiver_resolves_as_future() {
    let t0 = Instant::now();
    let counters = InMemoryCounters::new();
    let mut batcher = PreviewBatcher::new(WINDOW, 10);
    let rx = batcher.queue_increment(FileId(9), t0);
    batcher.flush(t0 + WINDOW, &counters).unwrap();
    let result = rx.await.unwrap().unwrap();
    assert_eq!(result.file_id, FileId(9));
    assert!(!result.auto_disliked);
}
