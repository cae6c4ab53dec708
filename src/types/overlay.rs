use serde::{Deserialize, Serialize};

/// Bounding box of the element the overlay animates out of.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Visual phase of the overlay viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlayPhase {
    #[default]
    Closed,
    OpeningCenter,
    Filling,
    Filled,
    Closing,
}

impl OverlayPhase {
    pub fn is_open(self) -> bool {
        !matches!(self, OverlayPhase::Closed)
    }
}

/// Requested navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Prev,
    Next,
}

/// Direction of the slide animation currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlideDirection {
    #[default]
    None,
    Left,
    Right,
}

impl From<Direction> for SlideDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Prev => SlideDirection::Left,
            Direction::Next => SlideDirection::Right,
        }
    }
}

/// Observable overlay state for the rendering layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayState {
    pub is_open: bool,
    pub rect: Option<Rect>,
    pub phase: OverlayPhase,
    pub current_item_index: Option<usize>,
    pub is_navigating: bool,
    pub navigation_direction: SlideDirection,
    pub is_bottom_panel_open: bool,
}
