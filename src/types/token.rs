use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one page of results.
///
/// Servers hand out either a page number or an opaque cursor string. Tokens
/// compare by value; cursors have no ordering and are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageToken {
    Number(u64),
    Cursor(String),
}

impl PageToken {
    /// The token a brand new listing starts from.
    pub fn first() -> Self {
        PageToken::Number(1)
    }
}

impl Default for PageToken {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Number(n) => write!(f, "{}", n),
            PageToken::Cursor(c) => write!(f, "{}", c),
        }
    }
}

impl From<u64> for PageToken {
    fn from(n: u64) -> Self {
        PageToken::Number(n)
    }
}

impl From<&str> for PageToken {
    fn from(cursor: &str) -> Self {
        PageToken::Cursor(cursor.to_string())
    }
}

impl From<String> for PageToken {
    fn from(cursor: String) -> Self {
        PageToken::Cursor(cursor)
    }
}
