use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::token::PageToken;

/// Top-level configuration for the gallery state layer.
///
/// Durations are stored as milliseconds so the JSON file stays readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Grace window before a queued reaction is committed.
    pub reaction_countdown_ms: u64,
    /// How long preview increments are collected before a flush.
    pub preview_flush_window_ms: u64,
    /// Maximum ids per preview flush.
    pub preview_max_batch: usize,
    pub overlay_center_ms: u64,
    pub overlay_fill_ms: u64,
    pub overlay_close_ms: u64,
    pub overlay_slide_ms: u64,
    /// Token a tab without saved progress starts from.
    pub first_page: PageToken,
    /// Overlay keyboard bindings, action name to key name.
    pub key_bindings: HashMap<String, String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            reaction_countdown_ms: 5_000,
            preview_flush_window_ms: 250,
            preview_max_batch: 50,
            overlay_center_ms: 250,
            overlay_fill_ms: 250,
            overlay_close_ms: 200,
            overlay_slide_ms: 300,
            first_page: PageToken::first(),
            key_bindings: Self::default_key_bindings(),
        }
    }
}

impl GalleryConfig {
    /// Returns the default overlay key bindings.
    pub fn default_key_bindings() -> HashMap<String, String> {
        let mut bindings = HashMap::new();
        bindings.insert("close_overlay".to_string(), "Escape".to_string());
        bindings.insert("previous_item".to_string(), "ArrowLeft".to_string());
        bindings.insert("next_item".to_string(), "ArrowRight".to_string());
        bindings
    }

    pub fn reaction_countdown(&self) -> Duration {
        Duration::from_millis(self.reaction_countdown_ms)
    }

    pub fn preview_flush_window(&self) -> Duration {
        Duration::from_millis(self.preview_flush_window_ms)
    }

    pub fn overlay_timings(&self) -> OverlayTimings {
        OverlayTimings {
            center: Duration::from_millis(self.overlay_center_ms),
            fill: Duration::from_millis(self.overlay_fill_ms),
            close: Duration::from_millis(self.overlay_close_ms),
            slide: Duration::from_millis(self.overlay_slide_ms),
        }
    }
}

/// Animation durations driving the overlay phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub center: Duration,
    pub fill: Duration,
    pub close: Duration,
    pub slide: Duration,
}

impl Default for OverlayTimings {
    fn default() -> Self {
        GalleryConfig::default().overlay_timings()
    }
}
