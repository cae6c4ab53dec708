use thiserror::Error;

use super::item::FileId;
use super::tab::TabId;

// === ServiceError ===

/// Failures reported by the external collaborators.
///
/// Transient by nature: the core never retries, callers decide whether the
/// user re-triggers the action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Transport failure before a response arrived.
    #[error("Network error: {0}")]
    Network(String),
    /// The request did not complete in time.
    #[error("Request timed out")]
    Timeout,
    /// The server answered with an error status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// A batched response did not contain an entry for this id.
    #[error("No result returned for file {0}")]
    MissingResult(FileId),
    /// The server does not know the requested resource.
    #[error("Resource not found: {0}")]
    NotFound(String),
}

// === TabError ===

/// Errors related to tab session operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(TabId),
    /// A collaborator call failed; state was left unchanged.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

// === ConfigError ===

/// Errors related to loading and updating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system operation failed.
    #[error("Config IO error: {0}")]
    Io(String),
    /// JSON could not be read or written.
    #[error("Config serialization error: {0}")]
    Serialization(String),
    /// The dot-path does not name a config field.
    #[error("Invalid config key: {0}")]
    InvalidKey(String),
    /// The value does not fit the field it was assigned to.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// === BindingError ===

/// Errors related to overlay key bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// No binding exists for the given action.
    #[error("Binding not found for action: {0}")]
    NotFound(String),
    /// The action name is not an overlay action.
    #[error("Unknown overlay action: {0}")]
    UnknownAction(String),
    /// The key is already bound to another action.
    #[error("Binding conflict: {0}")]
    Conflict(String),
    /// The key name is empty.
    #[error("Invalid binding key: {0}")]
    InvalidKey(String),
}
