//! Timed, cancellable commit queue for user reactions.
//!
//! Reacting removes the item from view at once; the reaction is only sent
//! when its countdown elapses without a cancel. Each file id has at most one
//! entry, and with it one deadline, so an id is committed at most once.
//!
//! The queue does not know about the overlay. Removals and restores are
//! returned as [`ReactionEvent`]s for the caller to route.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::managers::item_collection::ItemCollection;
use crate::services::collaborators::ReactionService;
use crate::types::item::{FileId, ReactionKind};
use crate::types::reaction::{QueuedReaction, ReactionEvent, RemovedItem};
use crate::types::tab::TabId;

#[derive(Debug)]
pub struct ReactionUndoQueue {
    countdown: Duration,
    entries: HashMap<FileId, QueuedReaction>,
}

impl ReactionUndoQueue {
    pub fn new(countdown: Duration) -> Self {
        Self {
            countdown,
            entries: HashMap::new(),
        }
    }

    /// Queues `kind` for `file_id` and removes the item from `items`.
    ///
    /// Re-queuing an id replaces its entry and restarts the countdown. The
    /// removal recorded by the first queue is kept so a cancel still puts the
    /// item back where it was.
    pub fn queue(
        &mut self,
        tab_id: &TabId,
        file_id: FileId,
        kind: ReactionKind,
        now: Instant,
        items: &mut ItemCollection,
    ) -> Vec<ReactionEvent> {
        let previous = self.entries.remove(&file_id);
        if let Some(prev) = &previous {
            debug!(%file_id, old = %prev.kind, new = %kind, "replacing queued reaction");
        }

        let mut events = Vec::new();
        let removed = match items.remove_by_id(file_id) {
            Some(removed) => {
                events.push(ReactionEvent::Removed {
                    tab_id: tab_id.clone(),
                    file_id,
                    index: removed.index,
                });
                Some(removed)
            }
            None => previous.and_then(|p| p.removed),
        };

        info!(%file_id, %kind, tab = %tab_id, "reaction queued");
        self.entries.insert(
            file_id,
            QueuedReaction {
                file_id,
                tab_id: tab_id.clone(),
                kind,
                queued_at: now,
                countdown: self.countdown,
                removed,
            },
        );
        events
    }

    /// Cancels a pending reaction and restores its item.
    ///
    /// Unknown ids are ignored. Committed entries have already left the
    /// queue, so they fall under the same rule.
    pub fn cancel(&mut self, file_id: FileId, items: &mut ItemCollection) -> Option<ReactionEvent> {
        let entry = self.entries.remove(&file_id)?;
        info!(%file_id, kind = %entry.kind, "reaction cancelled");

        let removed = entry.removed?;
        items.restore(removed.item, removed.index)?;
        let index = items.index_of(file_id)?;
        Some(ReactionEvent::Restored {
            tab_id: entry.tab_id,
            file_id,
            index,
        })
    }

    /// Drops a pending reaction without touching any collection.
    pub fn withdraw(&mut self, file_id: FileId) -> Option<QueuedReaction> {
        let entry = self.entries.remove(&file_id)?;
        info!(%file_id, kind = %entry.kind, "reaction withdrawn");
        Some(entry)
    }

    /// Commits every entry whose countdown elapsed at `now`.
    ///
    /// Committed entries are discarded whatever the outcome. A failed commit
    /// is reported but the item stays removed.
    pub fn commit_due(&mut self, now: Instant, service: &dyn ReactionService) -> Vec<ReactionEvent> {
        let mut due: Vec<FileId> = self
            .entries
            .values()
            .filter(|e| now >= e.deadline())
            .map(|e| e.file_id)
            .collect();
        due.sort_by_key(|id| self.entries.get(id).map(QueuedReaction::deadline));

        let mut events = Vec::with_capacity(due.len());
        for file_id in due {
            let Some(entry) = self.entries.remove(&file_id) else {
                continue;
            };
            let event = match service.submit_reaction(file_id, entry.kind) {
                Ok(_) => {
                    info!(%file_id, kind = %entry.kind, "reaction committed");
                    ReactionEvent::Committed {
                        tab_id: entry.tab_id,
                        file_id,
                        kind: entry.kind,
                    }
                }
                Err(error) => {
                    warn!(%file_id, kind = %entry.kind, %error, "reaction commit failed");
                    ReactionEvent::CommitFailed {
                        tab_id: entry.tab_id,
                        file_id,
                        kind: entry.kind,
                        error,
                    }
                }
            };
            events.push(event);
        }
        events
    }

    /// Drops the pending reactions of a closed tab without committing them.
    pub fn discard_tab(&mut self, tab_id: &TabId) -> Vec<QueuedReaction> {
        let ids: Vec<FileId> = self
            .entries
            .values()
            .filter(|e| &e.tab_id == tab_id)
            .map(|e| e.file_id)
            .collect();
        let discarded: Vec<QueuedReaction> = ids
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect();
        if !discarded.is_empty() {
            info!(tab = %tab_id, count = discarded.len(), "discarded pending reactions");
        }
        discarded
    }

    /// Ids with a pending reaction queued from `tab_id`.
    pub fn pending_ids(&self, tab_id: &TabId) -> HashSet<FileId> {
        self.entries
            .values()
            .filter(|e| &e.tab_id == tab_id)
            .map(|e| e.file_id)
            .collect()
    }

    /// Replaces the recorded removals of pending entries with `removed`.
    ///
    /// Used when a tab is hydrated again and its pending items are taken out
    /// of the fresh collection; a later cancel restores them at these indices.
    /// Items without a pending entry are ignored.
    pub fn record_removals(&mut self, removed: Vec<RemovedItem>) {
        for removal in removed {
            let file_id = removal.item.id;
            if let Some(entry) = self.entries.get_mut(&file_id) {
                debug!(%file_id, index = removal.index, "pending item removed again");
                entry.removed = Some(removal);
            }
        }
    }

    pub fn get(&self, file_id: FileId) -> Option<&QueuedReaction> {
        self.entries.get(&file_id)
    }

    /// Tab whose collection the pending reaction removed the item from.
    pub fn pending_tab(&self, file_id: FileId) -> Option<&TabId> {
        self.entries.get(&file_id).map(|e| &e.tab_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(QueuedReaction::deadline).min()
    }

    /// Time left for a progress indicator. Cosmetic only; commits are driven
    /// by [`commit_due`](Self::commit_due).
    pub fn remaining(&self, file_id: FileId, now: Instant) -> Option<Duration> {
        self.entries
            .get(&file_id)
            .map(|e| e.deadline().saturating_duration_since(now))
    }
}
