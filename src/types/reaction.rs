use std::time::{Duration, Instant};

use super::errors::ServiceError;
use super::item::{FileId, Item, ReactionKind};
use super::tab::TabId;

/// An item taken out of a collection together with where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedItem {
    pub item: Item,
    pub index: usize,
}

/// A reaction waiting for its countdown to elapse.
#[derive(Debug, Clone)]
pub struct QueuedReaction {
    pub file_id: FileId,
    pub tab_id: TabId,
    pub kind: ReactionKind,
    pub queued_at: Instant,
    pub countdown: Duration,
    /// `None` when the item was not in the collection at queue time.
    pub removed: Option<RemovedItem>,
}

impl QueuedReaction {
    pub fn deadline(&self) -> Instant {
        self.queued_at + self.countdown
    }

    pub fn removed_index(&self) -> Option<usize> {
        self.removed.as_ref().map(|r| r.index)
    }
}

/// Server acknowledgement of a committed reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionReceipt {
    pub file_id: FileId,
    pub kind: ReactionKind,
}

/// What happened inside the reaction queue; routed to the overlay and the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionEvent {
    Removed {
        tab_id: TabId,
        file_id: FileId,
        index: usize,
    },
    Restored {
        tab_id: TabId,
        file_id: FileId,
        index: usize,
    },
    Committed {
        tab_id: TabId,
        file_id: FileId,
        kind: ReactionKind,
    },
    CommitFailed {
        tab_id: TabId,
        file_id: FileId,
        kind: ReactionKind,
        error: ServiceError,
    },
}

/// Authoritative preview counter for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewCount {
    pub file_id: FileId,
    pub previewed_count: u32,
    pub auto_disliked: bool,
}

/// Authoritative seen counter for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenCount {
    pub file_id: FileId,
    pub seen_count: u32,
}
