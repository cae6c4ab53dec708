//! Ordered, id-keyed item list backing one tab's visible content.
//!
//! Every operation degrades to a no-op when the caller's view of the list is
//! stale, so a flow racing another one (a reaction removing an item a preview
//! result wants to patch) never fails. Changes are published on a watch
//! channel for the rendering adapter.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::types::item::{FileId, Item};
use crate::types::reaction::RemovedItem;

/// Kind of mutation that produced a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    Initial,
    Appended { count: usize },
    Replaced { count: usize },
    Removed { indices: Vec<usize> },
    Restored { indices: Vec<usize> },
    Updated { id: FileId },
}

/// Notification published after every effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsChanged {
    pub revision: u64,
    pub change: CollectionChange,
}

#[derive(Debug)]
pub struct ItemCollection {
    items: Vec<Item>,
    revision: u64,
    changes: watch::Sender<ItemsChanged>,
}

impl ItemCollection {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(ItemsChanged {
            revision: 0,
            change: CollectionChange::Initial,
        });
        Self {
            items: Vec::new(),
            revision: 0,
            changes,
        }
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<ItemsChanged> {
        self.changes.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, change: CollectionChange) {
        self.revision += 1;
        let revision = self.revision;
        self.changes.send_replace(ItemsChanged { revision, change });
    }

    /// Adds items at the end. Ids already present are skipped.
    pub fn append(&mut self, items: Vec<Item>) {
        let mut known: HashSet<FileId> = self.items.iter().map(|i| i.id).collect();
        let mut added = 0;
        for item in items {
            if !known.insert(item.id) {
                warn!(file_id = %item.id, "duplicate item id on append, keeping first occurrence");
                continue;
            }
            self.items.push(item);
            added += 1;
        }
        if added > 0 {
            self.emit(CollectionChange::Appended { count: added });
        }
    }

    /// Replaces the whole contents, keeping the given order.
    pub fn replace_all(&mut self, items: Vec<Item>) {
        let mut known = HashSet::new();
        self.items = items
            .into_iter()
            .filter(|item| {
                let fresh = known.insert(item.id);
                if !fresh {
                    warn!(file_id = %item.id, "duplicate item id on replace, dropping");
                }
                fresh
            })
            .collect();
        let count = self.items.len();
        self.emit(CollectionChange::Replaced { count });
    }

    /// Drops everything, e.g. when a tab releases its view resources.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.emit(CollectionChange::Replaced { count: 0 });
    }

    /// Removes one item and reports where it was. `None` when absent.
    pub fn remove_by_id(&mut self, id: FileId) -> Option<RemovedItem> {
        let index = self.index_of(id)?;
        let item = self.items.remove(index);
        self.emit(CollectionChange::Removed {
            indices: vec![index],
        });
        Some(RemovedItem { item, index })
    }

    /// Batch removal. Each entry carries its index in the list as it was
    /// before the batch, in ascending order.
    pub fn remove_many_by_id(&mut self, ids: &HashSet<FileId>) -> Vec<RemovedItem> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for (index, item) in std::mem::take(&mut self.items).into_iter().enumerate() {
            if ids.contains(&item.id) {
                removed.push(RemovedItem { item, index });
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        if !removed.is_empty() {
            let indices = removed.iter().map(|r| r.index).collect();
            self.emit(CollectionChange::Removed { indices });
        }
        removed
    }

    /// Puts an item back at `index` (clamped to the end).
    ///
    /// Returns the index used, or `None` when the id is already present,
    /// which happens when two flows race to restore the same item.
    pub fn restore(&mut self, item: Item, index: usize) -> Option<usize> {
        if self.contains(item.id) {
            debug!(file_id = %item.id, "restore skipped, item already present");
            return None;
        }
        let at = index.min(self.items.len());
        self.items.insert(at, item);
        self.emit(CollectionChange::Restored { indices: vec![at] });
        Some(at)
    }

    /// Restores a batch at their recorded indices with a stable merge.
    ///
    /// Positions are walked from the front: a restored entry is placed as
    /// soon as its recorded index is reached, every other slot takes the next
    /// untouched item in its existing order. Restored entries left over once
    /// the untouched items run out are appended in index order.
    pub fn restore_many(&mut self, restored: Vec<RemovedItem>) -> Vec<usize> {
        let mut seen: HashSet<FileId> = self.items.iter().map(|i| i.id).collect();
        let mut pending: Vec<RemovedItem> = restored
            .into_iter()
            .filter(|r| {
                let fresh = seen.insert(r.item.id);
                if !fresh {
                    debug!(file_id = %r.item.id, "batch restore skipped present item");
                }
                fresh
            })
            .collect();
        if pending.is_empty() {
            return Vec::new();
        }
        pending.sort_by_key(|r| r.index);
        if pending.windows(2).any(|w| w[0].index == w[1].index) {
            warn!("inconsistent indices on batch restore, merging in recorded order");
        }

        let total = self.items.len() + pending.len();
        let mut untouched = std::mem::take(&mut self.items).into_iter();
        let mut pending = pending.into_iter().peekable();
        let mut merged = Vec::with_capacity(total);
        let mut placed = Vec::new();

        for position in 0..total {
            let take_restored = pending.peek().is_some_and(|r| r.index <= position);
            if !take_restored {
                if let Some(item) = untouched.next() {
                    merged.push(item);
                    continue;
                }
            }
            if let Some(r) = pending.next() {
                placed.push(position);
                merged.push(r.item);
            }
        }

        self.items = merged;
        self.emit(CollectionChange::Restored {
            indices: placed.clone(),
        });
        placed
    }

    /// Mutates one item in place. Returns false when the id is absent.
    pub fn update_by_id<F>(&mut self, id: FileId, patcher: F) -> bool
    where
        F: FnOnce(&mut Item),
    {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        patcher(item);
        self.emit(CollectionChange::Updated { id });
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn get_by_id(&self, id: FileId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn index_of(&self, id: FileId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn ids(&self) -> Vec<FileId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

impl Default for ItemCollection {
    fn default() -> Self {
        Self::new()
    }
}
