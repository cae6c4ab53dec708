//! tabbed-gallery: session, pagination and undo state for a tabbed,
//! infinite-scrolling media browser.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod managers;
pub mod runtime;
pub mod services;
pub mod types;
