//! Full-screen viewer state machine.
//!
//! `Closed -> OpeningCenter -> Filling -> Filled -> Closing -> Closed`.
//! Phases advance on [`OverlayNavigator::tick`] as their animation durations
//! elapse. The navigator holds an index into the active tab's collection and
//! takes the collection as an argument on every call instead of keeping it.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::managers::input_bindings::{InputPort, KeyBindings};
use crate::managers::item_collection::ItemCollection;
use crate::types::config::OverlayTimings;
use crate::types::item::FileId;
use crate::types::overlay::{Direction, OverlayPhase, OverlayState, Rect, SlideDirection};

/// Side effects the rendering layer acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEffect {
    PhaseChanged(OverlayPhase),
    /// Start loading the full-resolution asset of this item.
    Preload { index: usize, file_id: FileId },
    NavigationCompleted { index: usize },
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    target: usize,
    started_at: Instant,
}

#[derive(Debug)]
pub struct OverlayNavigator {
    state: OverlayState,
    timings: OverlayTimings,
    phase_started_at: Option<Instant>,
    slide: Option<Slide>,
    input: InputPort,
    seen: HashSet<FileId>,
}

impl OverlayNavigator {
    pub fn new(timings: OverlayTimings, bindings: KeyBindings) -> Self {
        Self {
            state: OverlayState::default(),
            timings,
            phase_started_at: None,
            slide: None,
            input: InputPort::new(bindings),
            seen: HashSet::new(),
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn phase(&self) -> OverlayPhase {
        self.state.phase
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_item_index
    }

    pub fn input(&self) -> &InputPort {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputPort {
        &mut self.input
    }

    /// Close control and drawer toggle only respond once fully open.
    pub fn is_interactive(&self) -> bool {
        self.state.phase == OverlayPhase::Filled
    }

    fn accepts_navigation(&self) -> bool {
        matches!(
            self.state.phase,
            OverlayPhase::OpeningCenter | OverlayPhase::Filling | OverlayPhase::Filled
        )
    }

    /// Opens the viewer on `index`, animating out of `origin`.
    pub fn open(
        &mut self,
        index: usize,
        origin: Rect,
        items: &ItemCollection,
        now: Instant,
    ) -> Vec<OverlayEffect> {
        if self.state.phase != OverlayPhase::Closed {
            debug!(phase = ?self.state.phase, "open ignored, overlay busy");
            return Vec::new();
        }
        let Some(item) = items.get(index) else {
            return Vec::new();
        };
        let file_id = item.id;

        self.state = OverlayState {
            is_open: true,
            rect: Some(origin),
            phase: OverlayPhase::OpeningCenter,
            current_item_index: Some(index),
            ..OverlayState::default()
        };
        self.phase_started_at = Some(now);
        self.input.attach();
        debug!(index, %file_id, "overlay opening");
        vec![
            OverlayEffect::PhaseChanged(OverlayPhase::OpeningCenter),
            OverlayEffect::Preload { index, file_id },
        ]
    }

    /// Advances animations that finished by `now`.
    pub fn tick(&mut self, now: Instant, items: &ItemCollection) -> Vec<OverlayEffect> {
        let mut effects = Vec::new();

        if let Some(slide) = self.slide {
            if now >= slide.started_at + self.timings.slide {
                effects.extend(self.finish_slide(slide.target, items));
            }
        }

        while let Some(started) = self.phase_started_at {
            let (duration, next) = match self.state.phase {
                OverlayPhase::OpeningCenter => (self.timings.center, OverlayPhase::Filling),
                OverlayPhase::Filling => (self.timings.fill, OverlayPhase::Filled),
                OverlayPhase::Closing => (self.timings.close, OverlayPhase::Closed),
                OverlayPhase::Filled | OverlayPhase::Closed => break,
            };
            let ends_at = started + duration;
            if now < ends_at {
                break;
            }
            if next == OverlayPhase::Closed {
                self.reset();
                effects.push(OverlayEffect::Closed);
                break;
            }
            self.state.phase = next;
            self.phase_started_at = Some(ends_at);
            effects.push(OverlayEffect::PhaseChanged(next));
        }
        effects
    }

    fn finish_slide(&mut self, target: usize, items: &ItemCollection) -> Option<OverlayEffect> {
        self.clear_slide();
        if items.is_empty() {
            return None;
        }
        let index = target.min(items.len() - 1);
        self.state.current_item_index = Some(index);
        debug!(index, "navigation completed");
        Some(OverlayEffect::NavigationCompleted { index })
    }

    fn clear_slide(&mut self) {
        self.slide = None;
        self.state.is_navigating = false;
        self.state.navigation_direction = SlideDirection::None;
    }

    /// Starts the closing animation. No-op while closing or closed.
    pub fn close(&mut self, now: Instant) -> bool {
        if !self.accepts_navigation() {
            return false;
        }
        self.clear_slide();
        self.state.phase = OverlayPhase::Closing;
        self.state.is_bottom_panel_open = false;
        self.phase_started_at = Some(now);
        debug!("overlay closing");
        true
    }

    /// Closes at once, without animation. Used when the active tab changes
    /// and the current index no longer refers to anything.
    pub fn dismiss(&mut self) -> bool {
        if !self.state.is_open {
            return false;
        }
        self.reset();
        debug!("overlay dismissed");
        true
    }

    fn reset(&mut self) {
        self.state = OverlayState::default();
        self.phase_started_at = None;
        self.slide = None;
        self.input.detach();
    }

    /// Slides to the neighbouring item. Ignored while a slide runs, while
    /// closed or closing, and at either end of the collection.
    pub fn navigate(
        &mut self,
        direction: Direction,
        items: &ItemCollection,
        now: Instant,
    ) -> Option<OverlayEffect> {
        if !self.accepts_navigation() || self.state.is_navigating {
            return None;
        }
        let current = self.state.current_item_index?;
        let target = match direction {
            Direction::Prev => current.checked_sub(1)?,
            Direction::Next if current + 1 < items.len() => current + 1,
            Direction::Next => return None,
        };
        self.start_slide(target, direction, items, now)
    }

    /// Drawer click: one slide straight to `index`.
    pub fn jump_to(
        &mut self,
        index: usize,
        items: &ItemCollection,
        now: Instant,
    ) -> Option<OverlayEffect> {
        if !self.accepts_navigation() || self.state.is_navigating {
            return None;
        }
        let current = self.state.current_item_index?;
        if index == current || index >= items.len() {
            return None;
        }
        let direction = if index < current {
            Direction::Prev
        } else {
            Direction::Next
        };
        self.start_slide(index, direction, items, now)
    }

    fn start_slide(
        &mut self,
        target: usize,
        direction: Direction,
        items: &ItemCollection,
        now: Instant,
    ) -> Option<OverlayEffect> {
        let file_id = items.get(target)?.id;
        self.state.is_navigating = true;
        self.state.navigation_direction = direction.into();
        self.slide = Some(Slide {
            target,
            started_at: now,
        });
        debug!(target, ?direction, "navigation started");
        Some(OverlayEffect::Preload {
            index: target,
            file_id,
        })
    }

    /// Toggles the bottom drawer. Only while fully open.
    pub fn toggle_bottom_panel(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.state.is_bottom_panel_open = !self.state.is_bottom_panel_open;
        true
    }

    /// Records that an item's full asset finished loading in the viewer.
    /// True only the first time per item.
    pub fn asset_loaded(&mut self, file_id: FileId) -> bool {
        self.state.is_open && self.seen.insert(file_id)
    }

    /// Keeps the index valid after the item at `index` left `items`.
    ///
    /// The displayed item being removed lets the next one shift in; at the
    /// end of the list the previous one is shown; an emptied list closes the
    /// viewer.
    pub fn item_removed_at(
        &mut self,
        index: usize,
        items: &ItemCollection,
        now: Instant,
    ) -> Vec<OverlayEffect> {
        if !self.accepts_navigation() {
            return Vec::new();
        }
        let Some(current) = self.state.current_item_index else {
            return Vec::new();
        };
        self.clear_slide();

        if items.is_empty() {
            self.state.current_item_index = None;
            return if self.close(now) {
                vec![OverlayEffect::PhaseChanged(OverlayPhase::Closing)]
            } else {
                Vec::new()
            };
        }

        let next = match index {
            i if i < current => current - 1,
            i if i == current => current.min(items.len() - 1),
            _ => return Vec::new(),
        };
        self.state.current_item_index = Some(next);
        if index != current {
            return Vec::new();
        }
        items
            .get(next)
            .map(|item| {
                vec![OverlayEffect::Preload {
                    index: next,
                    file_id: item.id,
                }]
            })
            .unwrap_or_default()
    }

    /// Re-points the index at a restored item when it pointed at or past
    /// the restored slot.
    ///
    /// This also applies when a later item was on screen: an undo brings the
    /// viewer back to the item it restored rather than keeping the later one.
    /// A restore after the current index leaves the overlay alone.
    pub fn item_restored_at(&mut self, index: usize) -> bool {
        if !self.accepts_navigation() {
            return false;
        }
        match self.state.current_item_index {
            Some(current) if current >= index => {
                self.clear_slide();
                self.state.current_item_index = Some(index);
                true
            }
            _ => false,
        }
    }
}
