//! Gallery core facade.
//!
//! Holds the tab store, reaction queue, overlay and preview batcher, and
//! routes what one of them produces into the others. Time is passed in by the
//! caller; the facade never reads the clock.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::managers::input_bindings::{
    classify_item_click, InputCommand, InputDecision, ItemClick, KeyBindings, PointerInput,
    PointerTarget,
};
use crate::managers::overlay_navigator::{OverlayEffect, OverlayNavigator};
use crate::managers::preview_batcher::{PreviewBatcher, PreviewReceiver};
use crate::managers::reaction_queue::ReactionUndoQueue;
use crate::managers::tab_store::{
    LoadOutcome, PageRequest, SwitchOutcome, TabSessionStore, TabStoreTrait,
};
use crate::services::collaborators::{
    ContentPageService, PreviewService, ReactionService, SeenService, TabPersistence,
    ViewLifecycle,
};
use crate::types::config::GalleryConfig;
use crate::types::errors::{ServiceError, TabError};
use crate::types::item::{FileId, ReactionKind, ReactionState};
use crate::types::overlay::{Direction, Rect};
use crate::types::reaction::{PreviewCount, ReactionEvent, SeenCount};
use crate::types::tab::{Page, QueryParams, TabId};

/// External services the core talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub persistence: Arc<dyn TabPersistence>,
    pub pages: Arc<dyn ContentPageService>,
    pub reactions: Arc<dyn ReactionService>,
    pub previews: Arc<dyn PreviewService>,
    pub seen: Arc<dyn SeenService>,
    pub view: Arc<dyn ViewLifecycle>,
}

/// Something the UI layer may want to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserNotice {
    Overlay(OverlayEffect),
    ReactionCommitted {
        file_id: FileId,
        kind: ReactionKind,
    },
    /// The item stays removed; the error is for display.
    ReactionFailed {
        file_id: FileId,
        kind: ReactionKind,
        error: ServiceError,
    },
    PreviewFailed {
        error: ServiceError,
    },
    LoadFailed {
        error: TabError,
    },
}

pub struct MediaBrowser {
    config: GalleryConfig,
    tabs: TabSessionStore,
    reactions: ReactionUndoQueue,
    overlay: OverlayNavigator,
    previews: PreviewBatcher,
    page_service: Arc<dyn ContentPageService>,
    reaction_service: Arc<dyn ReactionService>,
    preview_service: Arc<dyn PreviewService>,
    seen_service: Arc<dyn SeenService>,
}

impl MediaBrowser {
    pub fn new(config: GalleryConfig, services: Collaborators) -> Self {
        let bindings = KeyBindings::from_map(&config.key_bindings).unwrap_or_else(|error| {
            warn!(%error, "invalid key bindings in config, using defaults");
            KeyBindings::defaults()
        });
        let page_service = Arc::clone(&services.pages);
        Self {
            tabs: TabSessionStore::new(
                services.persistence,
                services.pages,
                services.view,
                config.first_page.clone(),
            ),
            reactions: ReactionUndoQueue::new(config.reaction_countdown()),
            overlay: OverlayNavigator::new(config.overlay_timings(), bindings),
            previews: PreviewBatcher::new(config.preview_flush_window(), config.preview_max_batch),
            page_service,
            reaction_service: services.reactions,
            preview_service: services.previews,
            seen_service: services.seen,
            config,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn tabs(&self) -> &TabSessionStore {
        &self.tabs
    }

    pub fn overlay(&self) -> &OverlayNavigator {
        &self.overlay
    }

    pub fn reactions(&self) -> &ReactionUndoQueue {
        &self.reactions
    }

    pub fn previews(&self) -> &PreviewBatcher {
        &self.previews
    }

    // === Tabs ===

    /// Cold start. Goes through the same switch path as a manual switch.
    pub fn restore_session(&mut self) -> Result<Option<TabId>, TabError> {
        self.overlay.dismiss();
        let restored = self.tabs.restore_tabs();
        self.hide_pending_items();
        restored
    }

    pub fn create_tab(&mut self, label: &str) -> Result<TabId, TabError> {
        self.overlay.dismiss();
        self.tabs.create_tab(label)
    }

    /// Points a tab at a source. Pending reactions queued under a different
    /// source are dropped uncommitted, since their items do not belong to
    /// the new listing.
    pub fn apply_service(
        &mut self,
        tab_id: &TabId,
        params: QueryParams,
    ) -> Result<LoadOutcome, TabError> {
        let previous = self.tabs.tab(tab_id).map(|tab| tab.params.clone());
        if self.tabs.active_id() == Some(tab_id) {
            self.overlay.dismiss();
        }
        let result = self.tabs.apply_service(tab_id, params);

        let source_changed = match (previous, self.tabs.tab(tab_id)) {
            (Some(before), Some(tab)) => before != tab.params,
            _ => false,
        };
        if source_changed {
            self.reactions.discard_tab(tab_id);
        }
        self.hide_pending_items();
        result
    }

    /// Activates `tab_id`. The overlay is global and its index refers to the
    /// outgoing tab, so it is dismissed before the new tab hydrates.
    pub fn switch_tab(&mut self, tab_id: &TabId) -> Result<SwitchOutcome, TabError> {
        if self.tabs.active_id() == Some(tab_id) {
            return Ok(SwitchOutcome::AlreadyActive);
        }
        self.overlay.dismiss();
        let outcome = self.tabs.switch_tab(tab_id);
        self.hide_pending_items();
        outcome
    }

    /// Closes a tab, discarding its pending reactions uncommitted.
    ///
    /// Nothing is discarded unless the tab is actually gone; a failed delete
    /// leaves the tab, its reactions and the overlay as they were.
    pub fn close_tab(&mut self, tab_id: &TabId) -> Result<Option<TabId>, TabError> {
        let was_active = self.tabs.active_id() == Some(tab_id);
        let result = self.tabs.close_tab(tab_id);
        if self.tabs.tab(tab_id).is_some() {
            return result;
        }
        self.reactions.discard_tab(tab_id);
        if was_active {
            self.overlay.dismiss();
            self.hide_pending_items();
        }
        result
    }

    pub fn load_more(&mut self) -> Result<LoadOutcome, TabError> {
        let outcome = self.tabs.load_next_page();
        self.hide_pending_items();
        outcome
    }

    /// Starts a page load of the active tab for a caller that fetches on its
    /// own. Pair with [`finish_page_load`](Self::finish_page_load).
    pub fn begin_page_load(&mut self) -> Option<PageRequest> {
        self.tabs.begin_page_load()
    }

    pub fn finish_page_load(
        &mut self,
        request: PageRequest,
        result: Result<Page, ServiceError>,
    ) -> Result<LoadOutcome, TabError> {
        let outcome = self.tabs.finish_page_load(request, result);
        self.hide_pending_items();
        outcome
    }

    pub fn page_service(&self) -> Arc<dyn ContentPageService> {
        Arc::clone(&self.page_service)
    }

    /// Takes items with a pending reaction back out of the active collection
    /// after it was rehydrated or extended, and records where they were so a
    /// cancel can still restore them.
    fn hide_pending_items(&mut self) {
        let Some(active) = self.tabs.active_id().cloned() else {
            return;
        };
        let pending = self.reactions.pending_ids(&active);
        if pending.is_empty() {
            return;
        }
        let Some(tab) = self.tabs.tab_mut(&active) else {
            return;
        };
        let removed = tab.items.remove_many_by_id(&pending);
        if !removed.is_empty() {
            debug!(tab = %active, count = removed.len(), "kept pending items out of view");
            self.reactions.record_removals(removed);
        }
    }

    // === Overlay ===

    pub fn open_item(&mut self, index: usize, origin: Rect, now: Instant) -> Vec<OverlayEffect> {
        let Some(tab) = self.tabs.active_tab() else {
            return Vec::new();
        };
        self.overlay.open(index, origin, &tab.items, now)
    }

    pub fn close_overlay(&mut self, now: Instant) -> bool {
        self.overlay.close(now)
    }

    pub fn navigate(&mut self, direction: Direction, now: Instant) -> Option<OverlayEffect> {
        let tab = self.tabs.active_tab()?;
        self.overlay.navigate(direction, &tab.items, now)
    }

    pub fn jump_to(&mut self, index: usize, now: Instant) -> Option<OverlayEffect> {
        let tab = self.tabs.active_tab()?;
        self.overlay.jump_to(index, &tab.items, now)
    }

    pub fn toggle_drawer(&mut self) -> bool {
        self.overlay.toggle_bottom_panel()
    }

    /// The full-resolution asset of `file_id` finished loading in the
    /// overlay. The seen counter is incremented once per item.
    pub fn asset_loaded(&mut self, file_id: FileId) -> Result<Option<SeenCount>, ServiceError> {
        if !self.overlay.asset_loaded(file_id) {
            return Ok(None);
        }
        let seen = self.seen_service.increment_seen(file_id)?;
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.items
                .update_by_id(file_id, |item| item.seen_count = seen.seen_count);
        }
        Ok(Some(seen))
    }

    // === Input ===

    pub fn handle_key(&mut self, key: &str, now: Instant) -> Vec<OverlayEffect> {
        match self.overlay.input().handle_key(key) {
            Some(command) => self.run_command(command, now),
            None => Vec::new(),
        }
    }

    pub fn handle_pointer(
        &mut self,
        pointer: PointerInput,
        target: PointerTarget,
        now: Instant,
    ) -> (InputDecision, Vec<OverlayEffect>) {
        let decision = self.overlay.input().handle_pointer(pointer, target);
        let effects = match decision.command {
            Some(command) => self.run_command(command, now),
            None => Vec::new(),
        };
        (decision, effects)
    }

    /// A click on a grid item: opens it, or reacts when alt is held.
    pub fn handle_item_click(
        &mut self,
        index: usize,
        pointer: PointerInput,
        origin: Rect,
        now: Instant,
    ) -> Vec<OverlayEffect> {
        match classify_item_click(pointer) {
            ItemClick::Open => self.open_item(index, origin, now),
            ItemClick::React(kind) => {
                let Some(file_id) = self
                    .tabs
                    .active_tab()
                    .and_then(|tab| tab.items.get(index))
                    .map(|item| item.id)
                else {
                    return Vec::new();
                };
                self.react(file_id, kind, now)
            }
            ItemClick::Ignore => Vec::new(),
        }
    }

    fn run_command(&mut self, command: InputCommand, now: Instant) -> Vec<OverlayEffect> {
        match command {
            InputCommand::Close => {
                if self.close_overlay(now) {
                    vec![OverlayEffect::PhaseChanged(self.overlay.phase())]
                } else {
                    Vec::new()
                }
            }
            InputCommand::Navigate(direction) => self.navigate(direction, now).into_iter().collect(),
            InputCommand::React(kind) => {
                let current = self.overlay.current_index();
                let file_id = current.and_then(|index| {
                    self.tabs
                        .active_tab()
                        .and_then(|tab| tab.items.get(index))
                        .map(|item| item.id)
                });
                match file_id {
                    Some(file_id) => self.react(file_id, kind, now),
                    None => Vec::new(),
                }
            }
            InputCommand::ToggleDrawer => {
                self.toggle_drawer();
                Vec::new()
            }
        }
    }

    // === Reactions ===

    /// Queues a reaction on an item of the active tab. The item leaves the
    /// collection at once and the overlay is kept pointing at a valid item.
    pub fn react(&mut self, file_id: FileId, kind: ReactionKind, now: Instant) -> Vec<OverlayEffect> {
        let Some(active) = self.tabs.active_id().cloned() else {
            return Vec::new();
        };
        let Some(tab) = self.tabs.tab_mut(&active) else {
            return Vec::new();
        };
        let events = self
            .reactions
            .queue(&active, file_id, kind, now, &mut tab.items);

        let mut effects = Vec::new();
        for event in events {
            if let ReactionEvent::Removed { index, .. } = event {
                effects.extend(self.overlay.item_removed_at(index, &tab.items, now));
            }
        }
        effects
    }

    /// Cancels a pending reaction and restores its item.
    pub fn cancel_reaction(&mut self, file_id: FileId) -> Option<ReactionEvent> {
        let tab_id = self.reactions.pending_tab(file_id)?.clone();
        let is_active = self.tabs.active_id() == Some(&tab_id);
        let tab = self.tabs.tab_mut(&tab_id)?;
        if !is_active {
            // Items of inactive tabs are released and come back on hydration.
            self.reactions.withdraw(file_id);
            return None;
        }
        let event = self.reactions.cancel(file_id, &mut tab.items)?;
        if let ReactionEvent::Restored { index, .. } = &event {
            self.overlay.item_restored_at(*index);
        }
        Some(event)
    }

    // === Previews ===

    /// Counts a preview locally at once and queues the server increment.
    pub fn preview(&mut self, file_id: FileId, now: Instant) -> PreviewReceiver {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.items
                .update_by_id(file_id, |item| item.previewed_count += 1);
        }
        self.previews.queue_increment(file_id, now)
    }

    /// Applies authoritative preview counters to every tab holding the item.
    /// Items removed meanwhile are skipped.
    fn apply_preview_results(&mut self, results: &[PreviewCount]) {
        let tab_ids: Vec<TabId> = self.tabs.tabs().iter().map(|t| t.id.clone()).collect();
        for result in results {
            for tab_id in &tab_ids {
                let Some(tab) = self.tabs.tab_mut(tab_id) else {
                    continue;
                };
                let applied = tab.items.update_by_id(result.file_id, |item| {
                    item.previewed_count = result.previewed_count;
                    if result.auto_disliked {
                        item.reaction_state = ReactionState::AutoDisliked;
                    }
                });
                if !applied {
                    debug!(file_id = %result.file_id, tab = %tab_id, "preview result for absent item");
                }
            }
        }
    }

    // === Time ===

    /// Runs everything due at `now`: overlay animations, reaction commits and
    /// preview flushes.
    pub fn tick(&mut self, now: Instant) -> Vec<BrowserNotice> {
        let mut notices = Vec::new();

        match self.tabs.active_tab() {
            Some(tab) => notices.extend(
                self.overlay
                    .tick(now, &tab.items)
                    .into_iter()
                    .map(BrowserNotice::Overlay),
            ),
            None => {
                self.overlay.dismiss();
            }
        }

        for event in self.reactions.commit_due(now, self.reaction_service.as_ref()) {
            match event {
                ReactionEvent::Committed { file_id, kind, .. } => {
                    notices.push(BrowserNotice::ReactionCommitted { file_id, kind })
                }
                ReactionEvent::CommitFailed {
                    file_id,
                    kind,
                    error,
                    ..
                } => notices.push(BrowserNotice::ReactionFailed {
                    file_id,
                    kind,
                    error,
                }),
                ReactionEvent::Removed { .. } | ReactionEvent::Restored { .. } => {}
            }
        }

        match self.previews.flush_if_due(now, self.preview_service.as_ref()) {
            Some(Ok(results)) => self.apply_preview_results(&results),
            Some(Err(error)) => notices.push(BrowserNotice::PreviewFailed { error }),
            None => {}
        }
        notices
    }
}
