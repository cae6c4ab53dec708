//! Page-token bookkeeping for one tab.
//!
//! The cursor only records which token was consumed last and which one comes
//! next. It never retries and never interprets tokens.

use serde::{Deserialize, Serialize};

use crate::types::token::PageToken;

/// Snapshot of a cursor, in the shape tabs persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub current_token: Option<PageToken>,
    pub next_token: Option<PageToken>,
    pub exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    current: Option<PageToken>,
    next: Option<PageToken>,
    history: Vec<PageToken>,
}

impl PaginationCursor {
    /// A cursor that has fetched nothing yet and starts at `first`.
    pub fn fresh(first: PageToken) -> Self {
        Self {
            current: None,
            next: Some(first),
            history: Vec::new(),
        }
    }

    /// Rebuilds the cursor of a tab restored with its items.
    ///
    /// A saved token is kept exactly as persisted. A missing `saved_next`
    /// means the listing was already exhausted. Only a tab that never saved a
    /// token starts over at `first`.
    pub fn resume(
        saved: Option<PageToken>,
        saved_next: Option<PageToken>,
        first: PageToken,
    ) -> Self {
        match saved {
            Some(token) => Self {
                current: Some(token.clone()),
                next: saved_next,
                history: vec![token],
            },
            None => Self::fresh(saved_next.unwrap_or(first)),
        }
    }

    /// Rebuilds the cursor of a tab that saved a starting token but no items,
    /// e.g. one that had its source applied and was never scrolled.
    pub fn resume_unloaded(saved: Option<PageToken>, first: PageToken) -> Self {
        Self::fresh(saved.unwrap_or(first))
    }

    /// Records a successful fetch of `response_token`.
    pub fn advance(&mut self, response_token: PageToken, response_next: Option<PageToken>) {
        self.history.push(response_token.clone());
        self.current = Some(response_token);
        self.next = response_next;
    }

    /// Token to fetch next, or `None` once the listing is exhausted.
    pub fn request_next(&self) -> Option<PageToken> {
        self.next.clone()
    }

    /// Starts over at `first`, dropping all progress.
    pub fn reset(&mut self, first: PageToken) {
        *self = Self::fresh(first);
    }

    pub fn current_token(&self) -> Option<&PageToken> {
        self.current.as_ref()
    }

    pub fn next_token(&self) -> Option<&PageToken> {
        self.next.as_ref()
    }

    /// Tokens consumed so far. Display only.
    pub fn history(&self) -> &[PageToken] {
        &self.history
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            current_token: self.current.clone(),
            next_token: self.next.clone(),
            exhausted: self.is_exhausted(),
        }
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::fresh(PageToken::first())
    }
}
