//! Tab sessions and the active-tab switch protocol.
//!
//! Every tab owns its cursor and item collection. Switching, cold-start
//! restoration and closing all activate a tab through [`TabStoreTrait::switch_tab`],
//! so restored and manually selected tabs hydrate the same way.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::managers::item_collection::ItemCollection;
use crate::managers::pagination_cursor::PaginationCursor;
use crate::services::collaborators::{ContentPageService, TabPersistence, ViewLifecycle};
use crate::types::errors::{ServiceError, TabError};
use crate::types::tab::{Page, QueryParams, TabId, TabRecord};
use crate::types::token::PageToken;

/// One browsing tab.
#[derive(Debug)]
pub struct TabSession {
    pub id: TabId,
    pub label: String,
    pub params: QueryParams,
    pub cursor: PaginationCursor,
    pub items: ItemCollection,
    /// Hydrated from persisted items rather than fetched.
    pub is_restored: bool,
    pub position: usize,
    pub is_active: bool,
    load_generation: u64,
    in_flight: Option<u64>,
}

impl TabSession {
    fn from_record(record: &TabRecord, first: PageToken) -> Self {
        Self {
            id: record.id.clone(),
            label: record.label.clone(),
            params: record.params.clone(),
            cursor: PaginationCursor::fresh(first),
            items: ItemCollection::new(),
            is_restored: false,
            position: record.position,
            is_active: false,
            load_generation: 0,
            in_flight: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Invalidates any in-flight page request of this tab.
    fn cancel_loads(&mut self) {
        self.load_generation += 1;
        if self.in_flight.take().is_some() {
            debug!(tab = %self.id, "cancelled in-flight page load");
        }
    }
}

/// A page fetch handed out by [`TabStoreTrait::begin_page_load`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub tab_id: TabId,
    pub token: PageToken,
    pub params: QueryParams,
    generation: u64,
}

/// Result of a page load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded {
        count: usize,
        next_token: Option<PageToken>,
    },
    /// Nothing to fetch: no source, exhausted cursor, or a load in flight.
    Skipped,
    /// The response arrived for a request that was cancelled meanwhile.
    Discarded,
}

/// Result of activating a tab.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    AlreadyActive,
    /// Items and cursor came from persisted state; nothing was fetched.
    Hydrated { count: usize },
    /// No persisted items; the first page was requested.
    Fetched(LoadOutcome),
    /// No source applied yet.
    Idle,
}

/// Trait defining the tab session interface.
pub trait TabStoreTrait {
    fn restore_tabs(&mut self) -> Result<Option<TabId>, TabError>;
    fn create_tab(&mut self, label: &str) -> Result<TabId, TabError>;
    fn apply_service(&mut self, tab_id: &TabId, params: QueryParams)
        -> Result<LoadOutcome, TabError>;
    fn switch_tab(&mut self, tab_id: &TabId) -> Result<SwitchOutcome, TabError>;
    fn close_tab(&mut self, tab_id: &TabId) -> Result<Option<TabId>, TabError>;
    fn begin_page_load(&mut self) -> Option<PageRequest>;
    fn finish_page_load(
        &mut self,
        request: PageRequest,
        result: Result<Page, ServiceError>,
    ) -> Result<LoadOutcome, TabError>;
    fn load_next_page(&mut self) -> Result<LoadOutcome, TabError>;
    fn tab(&self, tab_id: &TabId) -> Option<&TabSession>;
    fn tab_mut(&mut self, tab_id: &TabId) -> Option<&mut TabSession>;
    fn tabs(&self) -> Vec<&TabSession>;
    fn active_id(&self) -> Option<&TabId>;
    fn active_tab(&self) -> Option<&TabSession>;
    fn active_tab_mut(&mut self) -> Option<&mut TabSession>;
    fn tab_count(&self) -> usize;
}

pub struct TabSessionStore {
    tabs: Vec<TabSession>,
    active: Option<TabId>,
    first_page: PageToken,
    persistence: Arc<dyn TabPersistence>,
    pages: Arc<dyn ContentPageService>,
    view: Arc<dyn ViewLifecycle>,
}

impl TabSessionStore {
    pub fn new(
        persistence: Arc<dyn TabPersistence>,
        pages: Arc<dyn ContentPageService>,
        view: Arc<dyn ViewLifecycle>,
        first_page: PageToken,
    ) -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            first_page,
            persistence,
            pages,
            view,
        }
    }

    fn find_index(&self, tab_id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| &t.id == tab_id)
    }

    fn require_index(&self, tab_id: &TabId) -> Result<usize, TabError> {
        self.find_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.clone()))
    }

    /// Cancels the active tab's loads and releases its view resources.
    /// Completes before any other tab is hydrated.
    fn deactivate_current(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let Some(idx) = self.find_index(&active) else {
            return;
        };
        let tab = &mut self.tabs[idx];
        tab.cancel_loads();
        tab.is_active = false;
        self.view.on_deactivate(tab);
        tab.items.clear();
        debug!(tab = %active, "tab deactivated");
    }

    /// Loads the persisted state of the now-active tab at `idx`.
    fn hydrate(&mut self, idx: usize, record: TabRecord) -> Result<SwitchOutcome, TabError> {
        let first = self.first_page.clone();
        let tab = &mut self.tabs[idx];
        tab.label = record.label;
        tab.params = record.params;
        tab.position = record.position;

        let outcome = if !record.items.is_empty() {
            let count = record.items.len();
            tab.items.replace_all(record.items);
            tab.cursor = PaginationCursor::resume(record.page_token, record.next_token, first);
            tab.is_restored = true;
            info!(tab = %tab.id, count, token = ?tab.cursor.current_token(), "tab hydrated");
            SwitchOutcome::Hydrated { count }
        } else {
            tab.items.clear();
            tab.cursor = PaginationCursor::resume_unloaded(record.page_token, first);
            tab.is_restored = false;
            if tab.params.has_source() {
                SwitchOutcome::Fetched(LoadOutcome::Skipped)
            } else {
                SwitchOutcome::Idle
            }
        };
        self.view.on_activate(&self.tabs[idx]);

        match outcome {
            SwitchOutcome::Fetched(_) => Ok(SwitchOutcome::Fetched(self.load_next_page()?)),
            other => Ok(other),
        }
    }

    /// Neighbour to activate when the tab at `position` goes away.
    fn adjacent_to(&self, position: usize) -> Option<TabId> {
        let after = self
            .tabs
            .iter()
            .filter(|t| t.position > position)
            .min_by_key(|t| t.position);
        let before = || {
            self.tabs
                .iter()
                .filter(|t| t.position < position)
                .max_by_key(|t| t.position)
        };
        after.or_else(before).map(|t| t.id.clone())
    }
}

impl TabStoreTrait for TabSessionStore {
    /// Cold start: lists the persisted tabs once and activates the one marked
    /// active, or the first one.
    fn restore_tabs(&mut self) -> Result<Option<TabId>, TabError> {
        let mut records = self.persistence.list_tabs()?;
        records.sort_by_key(|r| r.position);
        let first = self.first_page.clone();
        self.tabs = records
            .iter()
            .map(|r| TabSession::from_record(r, first.clone()))
            .collect();
        self.active = None;

        let chosen = records
            .iter()
            .find(|r| r.is_active)
            .or_else(|| records.first())
            .map(|r| r.id.clone());
        info!(count = self.tabs.len(), active = ?chosen, "tabs restored");

        if let Some(id) = &chosen {
            self.switch_tab(id)?;
        }
        Ok(chosen)
    }

    /// Creates an empty tab and activates it. Nothing is fetched until a
    /// source is applied.
    fn create_tab(&mut self, label: &str) -> Result<TabId, TabError> {
        let record = self.persistence.create_tab(label, &QueryParams::default())?;
        let id = record.id.clone();
        self.tabs
            .push(TabSession::from_record(&record, self.first_page.clone()));
        self.tabs.sort_by_key(|t| t.position);
        info!(tab = %id, "tab created");
        self.switch_tab(&id)?;
        Ok(id)
    }

    /// Points a tab at a new source and starts over from the first page.
    fn apply_service(
        &mut self,
        tab_id: &TabId,
        params: QueryParams,
    ) -> Result<LoadOutcome, TabError> {
        let idx = self.require_index(tab_id)?;
        self.persistence.update_tab_params(tab_id, &params)?;

        let first = self.first_page.clone();
        let tab = &mut self.tabs[idx];
        tab.cancel_loads();
        tab.params = params;
        tab.cursor.reset(first);
        tab.items.clear();
        tab.is_restored = false;
        info!(tab = %tab_id, params = ?tab.params, "service applied");

        if tab.is_active {
            self.load_next_page()
        } else {
            Ok(LoadOutcome::Skipped)
        }
    }

    fn switch_tab(&mut self, tab_id: &TabId) -> Result<SwitchOutcome, TabError> {
        if self.active.as_ref() == Some(tab_id) {
            debug!(tab = %tab_id, "switch to active tab ignored");
            return Ok(SwitchOutcome::AlreadyActive);
        }
        let idx = self.require_index(tab_id)?;
        let record = self.persistence.get_tab(tab_id)?;

        self.deactivate_current();

        self.tabs[idx].is_active = true;
        self.active = Some(tab_id.clone());
        if let Err(error) = self.persistence.update_tab_active(tab_id) {
            warn!(tab = %tab_id, %error, "failed to persist active tab");
        }
        info!(tab = %tab_id, "tab activated");

        self.hydrate(idx, record)
    }

    /// Removes a tab. When it was active the adjacent tab by position takes
    /// over. Returns the tab active afterwards.
    fn close_tab(&mut self, tab_id: &TabId) -> Result<Option<TabId>, TabError> {
        let idx = self.require_index(tab_id)?;
        self.persistence.delete_tab(tab_id)?;

        let was_active = self.active.as_ref() == Some(tab_id);
        if was_active {
            self.deactivate_current();
        }
        let closed = self.tabs.remove(idx);
        info!(tab = %tab_id, "tab closed");

        if !was_active {
            return Ok(self.active.clone());
        }
        let next = self.adjacent_to(closed.position);
        if let Some(id) = &next {
            self.switch_tab(id)?;
        }
        Ok(next)
    }

    /// Hands out the next page request of the active tab, marking it in flight.
    fn begin_page_load(&mut self) -> Option<PageRequest> {
        let active = self.active.clone()?;
        let idx = self.find_index(&active)?;
        let tab = &mut self.tabs[idx];
        if !tab.params.has_source() {
            debug!(tab = %tab.id, "no source applied, not fetching");
            return None;
        }
        if tab.in_flight.is_some() {
            return None;
        }
        let token = tab.cursor.request_next()?;
        tab.in_flight = Some(tab.load_generation);
        debug!(tab = %tab.id, %token, "page load started");
        Some(PageRequest {
            tab_id: tab.id.clone(),
            token,
            params: tab.params.clone(),
            generation: tab.load_generation,
        })
    }

    /// Applies a page response. Responses for cancelled requests are dropped;
    /// failures leave the cursor where it was.
    fn finish_page_load(
        &mut self,
        request: PageRequest,
        result: Result<Page, ServiceError>,
    ) -> Result<LoadOutcome, TabError> {
        let Some(idx) = self.find_index(&request.tab_id) else {
            debug!(tab = %request.tab_id, "page response for closed tab dropped");
            return Ok(LoadOutcome::Discarded);
        };
        let tab = &mut self.tabs[idx];
        if tab.load_generation != request.generation {
            debug!(tab = %tab.id, token = %request.token, "stale page response dropped");
            return Ok(LoadOutcome::Discarded);
        }
        tab.in_flight = None;

        match result {
            Ok(page) => {
                let count = page.items.len();
                let next_token = page.next_token;
                tab.items.append(page.items);
                tab.cursor.advance(request.token, next_token.clone());
                debug!(tab = %tab.id, count, next = ?next_token, "page loaded");
                Ok(LoadOutcome::Loaded { count, next_token })
            }
            Err(error) => {
                warn!(tab = %tab.id, token = %request.token, %error, "page load failed");
                Err(error.into())
            }
        }
    }

    fn load_next_page(&mut self) -> Result<LoadOutcome, TabError> {
        let Some(request) = self.begin_page_load() else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = self
            .pages
            .fetch_page(&request.token, &request.params, &request.tab_id);
        self.finish_page_load(request, result)
    }

    fn tab(&self, tab_id: &TabId) -> Option<&TabSession> {
        self.tabs.iter().find(|t| &t.id == tab_id)
    }

    fn tab_mut(&mut self, tab_id: &TabId) -> Option<&mut TabSession> {
        self.tabs.iter_mut().find(|t| &t.id == tab_id)
    }

    fn tabs(&self) -> Vec<&TabSession> {
        self.tabs.iter().collect()
    }

    fn active_id(&self) -> Option<&TabId> {
        self.active.as_ref()
    }

    fn active_tab(&self) -> Option<&TabSession> {
        let id = self.active.as_ref()?;
        self.tab(id)
    }

    fn active_tab_mut(&mut self) -> Option<&mut TabSession> {
        let id = self.active.clone()?;
        self.tab_mut(&id)
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
