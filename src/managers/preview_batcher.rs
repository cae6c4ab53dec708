//! Debounced batching of "item previewed" increments.
//!
//! Increments queued inside one flush window are sent as a single call, each
//! id once. Callers get a oneshot receiver per increment and apply the
//! authoritative counters themselves; the batcher knows nothing about
//! collections.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::services::collaborators::PreviewService;
use crate::types::errors::ServiceError;
use crate::types::item::FileId;
use crate::types::reaction::PreviewCount;

/// Resolves once the batch holding the increment is flushed.
pub type PreviewReceiver = oneshot::Receiver<Result<PreviewCount, ServiceError>>;

type Waiter = oneshot::Sender<Result<PreviewCount, ServiceError>>;

#[derive(Debug)]
pub struct PreviewBatcher {
    flush_window: Duration,
    max_batch: usize,
    order: Vec<FileId>,
    waiters: HashMap<FileId, Vec<Waiter>>,
    window_opened_at: Option<Instant>,
}

impl PreviewBatcher {
    pub fn new(flush_window: Duration, max_batch: usize) -> Self {
        Self {
            flush_window,
            max_batch: max_batch.max(1),
            order: Vec::new(),
            waiters: HashMap::new(),
            window_opened_at: None,
        }
    }

    /// Records a preview of `file_id`. The first increment of an empty
    /// batcher opens the flush window.
    pub fn queue_increment(&mut self, file_id: FileId, now: Instant) -> PreviewReceiver {
        let (tx, rx) = oneshot::channel();
        let waiters = self.waiters.entry(file_id).or_default();
        if waiters.is_empty() {
            self.order.push(file_id);
        }
        waiters.push(tx);
        self.window_opened_at.get_or_insert(now);
        rx
    }

    pub fn pending_len(&self) -> usize {
        self.order.len()
    }

    pub fn next_flush_at(&self) -> Option<Instant> {
        self.window_opened_at.map(|opened| opened + self.flush_window)
    }

    /// True when the window elapsed or a full batch is waiting.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.order.is_empty() {
            return false;
        }
        self.order.len() >= self.max_batch || self.next_flush_at().is_some_and(|at| now >= at)
    }

    /// Flushes only when [`is_due`](Self::is_due).
    pub fn flush_if_due(
        &mut self,
        now: Instant,
        service: &dyn PreviewService,
    ) -> Option<Result<Vec<PreviewCount>, ServiceError>> {
        self.is_due(now).then(|| self.flush(now, service))
    }

    /// Sends up to one batch and resolves its waiters.
    ///
    /// Ids beyond the batch size stay queued under a window opened at `now`.
    /// On failure every waiter of the batch receives the same error.
    pub fn flush(
        &mut self,
        now: Instant,
        service: &dyn PreviewService,
    ) -> Result<Vec<PreviewCount>, ServiceError> {
        if self.order.is_empty() {
            return Ok(Vec::new());
        }
        let take = self.order.len().min(self.max_batch);
        let batch: Vec<FileId> = self.order.drain(..take).collect();
        let mut waiters: Vec<(FileId, Vec<Waiter>)> = batch
            .iter()
            .map(|id| (*id, self.waiters.remove(id).unwrap_or_default()))
            .collect();
        self.window_opened_at = (!self.order.is_empty()).then_some(now);

        debug!(count = batch.len(), "flushing preview increments");
        match service.increment_preview(&batch) {
            Ok(results) => {
                let by_id: HashMap<FileId, PreviewCount> =
                    results.iter().map(|r| (r.file_id, *r)).collect();
                for (id, senders) in waiters.drain(..) {
                    let outcome = by_id
                        .get(&id)
                        .copied()
                        .ok_or(ServiceError::MissingResult(id));
                    for sender in senders {
                        let _ = sender.send(outcome.clone());
                    }
                }
                Ok(results)
            }
            Err(error) => {
                warn!(%error, count = batch.len(), "preview batch failed");
                for (_, senders) in waiters.drain(..) {
                    for sender in senders {
                        let _ = sender.send(Err(error.clone()));
                    }
                }
                Err(error)
            }
        }
    }
}
