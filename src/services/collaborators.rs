//! Contracts of the external collaborators the state layer talks to.
//!
//! Implementations own the transport (HTTP, IPC, ...). The core only sees
//! these traits, which keeps every manager testable with in-memory doubles.

use crate::managers::tab_store::TabSession;
use crate::types::errors::ServiceError;
use crate::types::item::{FileId, ReactionKind};
use crate::types::reaction::{PreviewCount, ReactionReceipt, SeenCount};
use crate::types::tab::{Page, QueryParams, TabId, TabRecord};
use crate::types::token::PageToken;

/// Server-side storage of tabs.
pub trait TabPersistence: Send + Sync {
    fn list_tabs(&self) -> Result<Vec<TabRecord>, ServiceError>;
    /// Creates a tab and assigns its id.
    fn create_tab(&self, label: &str, params: &QueryParams) -> Result<TabRecord, ServiceError>;
    fn get_tab(&self, id: &TabId) -> Result<TabRecord, ServiceError>;
    fn update_tab_active(&self, id: &TabId) -> Result<(), ServiceError>;
    fn update_tab_params(&self, id: &TabId, params: &QueryParams) -> Result<(), ServiceError>;
    fn delete_tab(&self, id: &TabId) -> Result<(), ServiceError>;
}

/// Source of result pages. Tokens are passed through uninterpreted.
pub trait ContentPageService: Send + Sync {
    fn fetch_page(
        &self,
        token: &PageToken,
        params: &QueryParams,
        tab_id: &TabId,
    ) -> Result<Page, ServiceError>;
}

pub trait ReactionService: Send + Sync {
    fn submit_reaction(
        &self,
        file_id: FileId,
        kind: ReactionKind,
    ) -> Result<ReactionReceipt, ServiceError>;
}

pub trait PreviewService: Send + Sync {
    /// Increments the preview counter of every id once.
    fn increment_preview(&self, file_ids: &[FileId]) -> Result<Vec<PreviewCount>, ServiceError>;
}

pub trait SeenService: Send + Sync {
    fn increment_seen(&self, file_id: FileId) -> Result<SeenCount, ServiceError>;
}

/// Hooks into the rendering adapter of a tab's content view.
pub trait ViewLifecycle: Send + Sync {
    /// The tab stops being shown: cancel in-flight work and release resources.
    fn on_deactivate(&self, tab: &TabSession);
    /// The tab became active and its collection is hydrated.
    fn on_activate(&self, _tab: &TabSession) {}
}

/// View adapter that does nothing, for headless use.
#[derive(Debug, Default)]
pub struct NoopView;

impl ViewLifecycle for NoopView {
    fn on_deactivate(&self, _tab: &TabSession) {}
}
