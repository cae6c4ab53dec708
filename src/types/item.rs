use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::PageToken;

/// Server-side identifier of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FileId {
    fn from(id: u64) -> Self {
        FileId(id)
    }
}

/// A user judgment on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
    Love,
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
            ReactionKind::Love => "love",
        };
        f.write_str(name)
    }
}

/// Reaction status shown for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionState {
    #[default]
    Unreacted,
    Reacted(ReactionKind),
    /// Set by the server after repeated previews without any other interaction.
    AutoDisliked,
}

/// Media description of an item; opaque to the state layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaFields {
    pub url: String,
    pub preview_url: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One entry of a tab's visible content.
///
/// Identity is the `id`; two items with the same id are the same entity even
/// when their counters differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: FileId,
    /// Page the item was delivered on.
    pub page: Option<PageToken>,
    /// Position inside that page.
    pub index: usize,
    pub media: MediaFields,
    #[serde(default)]
    pub previewed_count: u32,
    #[serde(default)]
    pub seen_count: u32,
    #[serde(default)]
    pub reaction_state: ReactionState,
}

impl Item {
    /// Bare item with only an id and a media url.
    pub fn new(id: impl Into<FileId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page: None,
            index: 0,
            media: MediaFields {
                url: url.into(),
                ..MediaFields::default()
            },
            previewed_count: 0,
            seen_count: 0,
            reaction_state: ReactionState::Unreacted,
        }
    }

    pub fn on_page(mut self, page: PageToken, index: usize) -> Self {
        self.page = Some(page);
        self.index = index;
        self
    }
}
