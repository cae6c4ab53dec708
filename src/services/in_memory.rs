//! In-memory collaborators.
//!
//! Used by the demo binary and the test suites. Each one records the calls
//! it received and can be told to fail its next call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::managers::tab_store::TabSession;
use crate::services::collaborators::{
    ContentPageService, PreviewService, ReactionService, SeenService, TabPersistence,
    ViewLifecycle,
};
use crate::types::errors::ServiceError;
use crate::types::item::{FileId, Item, ReactionKind};
use crate::types::reaction::{PreviewCount, ReactionReceipt, SeenCount};
use crate::types::tab::{Page, QueryParams, TabId, TabRecord};
use crate::types::token::PageToken;

/// Previews without any other interaction after which the server
/// auto-dislikes an item.
pub const AUTO_DISLIKE_PREVIEWS: u32 = 3;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared "fail the next call" switch.
#[derive(Debug, Default)]
struct FailSwitch(Mutex<Option<ServiceError>>);

impl FailSwitch {
    fn arm(&self, error: ServiceError) {
        *lock(&self.0) = Some(error);
    }

    fn check(&self) -> Result<(), ServiceError> {
        match lock(&self.0).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// === Tabs ===

/// Tab persistence kept in a vector.
#[derive(Debug, Default)]
pub struct InMemoryTabStore {
    tabs: Mutex<Vec<TabRecord>>,
    fail: FailSwitch,
}

impl InMemoryTabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with already persisted tabs.
    pub fn with_tabs(tabs: Vec<TabRecord>) -> Self {
        Self {
            tabs: Mutex::new(tabs),
            fail: FailSwitch::default(),
        }
    }

    pub fn fail_next(&self, error: ServiceError) {
        self.fail.arm(error);
    }

    /// Overwrites the persisted items and tokens of a tab, standing in for
    /// the server recording progress as pages are fetched.
    pub fn save_progress(
        &self,
        id: &TabId,
        items: Vec<Item>,
        page_token: Option<PageToken>,
        next_token: Option<PageToken>,
    ) {
        if let Some(tab) = lock(&self.tabs).iter_mut().find(|t| &t.id == id) {
            tab.items = items;
            tab.page_token = page_token;
            tab.next_token = next_token;
        }
    }

    pub fn snapshot(&self) -> Vec<TabRecord> {
        lock(&self.tabs).clone()
    }
}

impl TabPersistence for InMemoryTabStore {
    fn list_tabs(&self) -> Result<Vec<TabRecord>, ServiceError> {
        self.fail.check()?;
        let mut tabs = lock(&self.tabs).clone();
        tabs.sort_by_key(|t| t.position);
        Ok(tabs)
    }

    fn create_tab(&self, label: &str, params: &QueryParams) -> Result<TabRecord, ServiceError> {
        self.fail.check()?;
        let mut tabs = lock(&self.tabs);
        let position = tabs.iter().map(|t| t.position + 1).max().unwrap_or(0);
        let record = TabRecord {
            id: TabId(Uuid::new_v4().to_string()),
            label: label.to_string(),
            position,
            is_active: false,
            params: params.clone(),
            items: Vec::new(),
            page_token: None,
            next_token: None,
        };
        tabs.push(record.clone());
        Ok(record)
    }

    fn get_tab(&self, id: &TabId) -> Result<TabRecord, ServiceError> {
        self.fail.check()?;
        lock(&self.tabs)
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    fn update_tab_active(&self, id: &TabId) -> Result<(), ServiceError> {
        self.fail.check()?;
        let mut tabs = lock(&self.tabs);
        if !tabs.iter().any(|t| &t.id == id) {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        for tab in tabs.iter_mut() {
            tab.is_active = &tab.id == id;
        }
        Ok(())
    }

    fn update_tab_params(&self, id: &TabId, params: &QueryParams) -> Result<(), ServiceError> {
        self.fail.check()?;
        let mut tabs = lock(&self.tabs);
        let tab = tabs
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        tab.params = params.clone();
        tab.items.clear();
        tab.page_token = None;
        tab.next_token = None;
        Ok(())
    }

    fn delete_tab(&self, id: &TabId) -> Result<(), ServiceError> {
        self.fail.check()?;
        lock(&self.tabs).retain(|t| &t.id != id);
        Ok(())
    }
}

// === Pages ===

/// One recorded `fetch_page` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequestLog {
    pub token: PageToken,
    pub params: QueryParams,
    pub tab_id: TabId,
}

/// Page source serving a fixed set of pages keyed by token.
#[derive(Debug, Default)]
pub struct InMemoryPageSource {
    pages: Mutex<HashMap<PageToken, Page>>,
    calls: Mutex<Vec<PageRequestLog>>,
    fail: FailSwitch,
}

impl InMemoryPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbered pages `1..=page_count`, each holding `page_size` items with
    /// consecutive ids starting at 1.
    pub fn numbered(page_size: u64, page_count: u64) -> Self {
        let source = Self::new();
        for page in 1..=page_count {
            let items = (0..page_size)
                .map(|offset| {
                    let id = (page - 1) * page_size + offset + 1;
                    Item::new(id, format!("/media/{}.jpg", id))
                        .on_page(PageToken::Number(page), offset as usize)
                })
                .collect();
            let next_token = (page < page_count).then(|| PageToken::Number(page + 1));
            source.insert_page(PageToken::Number(page), Page { items, next_token });
        }
        source
    }

    pub fn insert_page(&self, token: PageToken, page: Page) {
        lock(&self.pages).insert(token, page);
    }

    pub fn fail_next(&self, error: ServiceError) {
        self.fail.arm(error);
    }

    pub fn calls(&self) -> Vec<PageRequestLog> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl ContentPageService for InMemoryPageSource {
    fn fetch_page(
        &self,
        token: &PageToken,
        params: &QueryParams,
        tab_id: &TabId,
    ) -> Result<Page, ServiceError> {
        lock(&self.calls).push(PageRequestLog {
            token: token.clone(),
            params: params.clone(),
            tab_id: tab_id.clone(),
        });
        self.fail.check()?;
        lock(&self.pages)
            .get(token)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("page {}", token)))
    }
}

// === Reactions ===

/// Reaction service that records submissions.
#[derive(Debug, Default)]
pub struct RecordingReactionService {
    submitted: Mutex<Vec<(FileId, ReactionKind)>>,
    fail: FailSwitch,
}

impl RecordingReactionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: ServiceError) {
        self.fail.arm(error);
    }

    pub fn submitted(&self) -> Vec<(FileId, ReactionKind)> {
        lock(&self.submitted).clone()
    }
}

impl ReactionService for RecordingReactionService {
    fn submit_reaction(
        &self,
        file_id: FileId,
        kind: ReactionKind,
    ) -> Result<ReactionReceipt, ServiceError> {
        lock(&self.submitted).push((file_id, kind));
        self.fail.check()?;
        Ok(ReactionReceipt { file_id, kind })
    }
}

// === Counters ===

/// Preview and seen counters kept per file id.
#[derive(Debug, Default)]
pub struct InMemoryCounters {
    previews: Mutex<HashMap<FileId, u32>>,
    seen: Mutex<HashMap<FileId, u32>>,
    preview_batches: Mutex<Vec<Vec<FileId>>>,
    fail: FailSwitch,
}

impl InMemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: ServiceError) {
        self.fail.arm(error);
    }

    /// Every `increment_preview` call, in order.
    pub fn preview_batches(&self) -> Vec<Vec<FileId>> {
        lock(&self.preview_batches).clone()
    }

    pub fn seen_count(&self, file_id: FileId) -> u32 {
        lock(&self.seen).get(&file_id).copied().unwrap_or(0)
    }
}

impl PreviewService for InMemoryCounters {
    fn increment_preview(&self, file_ids: &[FileId]) -> Result<Vec<PreviewCount>, ServiceError> {
        lock(&self.preview_batches).push(file_ids.to_vec());
        self.fail.check()?;
        let mut previews = lock(&self.previews);
        Ok(file_ids
            .iter()
            .map(|id| {
                let count = previews.entry(*id).or_insert(0);
                *count += 1;
                PreviewCount {
                    file_id: *id,
                    previewed_count: *count,
                    auto_disliked: *count >= AUTO_DISLIKE_PREVIEWS,
                }
            })
            .collect())
    }
}

impl SeenService for InMemoryCounters {
    fn increment_seen(&self, file_id: FileId) -> Result<SeenCount, ServiceError> {
        self.fail.check()?;
        let mut seen = lock(&self.seen);
        let count = seen.entry(file_id).or_insert(0);
        *count += 1;
        Ok(SeenCount {
            file_id,
            seen_count: *count,
        })
    }
}

// === View ===

/// View adapter that records lifecycle calls by tab id.
#[derive(Debug, Default)]
pub struct RecordingView {
    deactivated: Mutex<Vec<TabId>>,
    activated: Mutex<Vec<TabId>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deactivated(&self) -> Vec<TabId> {
        lock(&self.deactivated).clone()
    }

    pub fn activated(&self) -> Vec<TabId> {
        lock(&self.activated).clone()
    }
}

impl ViewLifecycle for RecordingView {
    fn on_deactivate(&self, tab: &TabSession) {
        lock(&self.deactivated).push(tab.id.clone());
    }

    fn on_activate(&self, tab: &TabSession) {
        lock(&self.activated).push(tab.id.clone());
    }
}
