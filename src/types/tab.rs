use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::item::Item;
use super::token::PageToken;

/// Identifier the persistence service assigns to a tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(id: &str) -> Self {
        TabId(id.to_string())
    }
}

/// What a tab is browsing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub service: Option<String>,
    pub feed: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn for_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, key: &str, value: &str) -> Self {
        self.filters.insert(key.to_string(), value.to_string());
        self
    }

    /// True once a service, feed or source has been chosen. Tabs without one
    /// never fetch.
    pub fn has_source(&self) -> bool {
        self.service.is_some() || self.feed.is_some() || self.source.is_some()
    }
}

/// A tab as stored by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    pub label: String,
    pub position: usize,
    pub is_active: bool,
    pub params: QueryParams,
    #[serde(default)]
    pub items: Vec<Item>,
    pub page_token: Option<PageToken>,
    pub next_token: Option<PageToken>,
}

/// One page returned by the content service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Item>,
    pub next_token: Option<PageToken>,
}
