// Gallery state managers
// Managers hold the mutable browsing state: tabs, cursors, items, reactions, previews and the overlay.

pub mod input_bindings;
pub mod item_collection;
pub mod overlay_navigator;
pub mod pagination_cursor;
pub mod preview_batcher;
pub mod reaction_queue;
pub mod tab_store;
