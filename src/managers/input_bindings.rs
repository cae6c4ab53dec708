//! Input port of the overlay viewer.
//!
//! Keyboard and pointer events are translated into overlay commands only
//! while the port is attached, which the overlay does for exactly the time it
//! is open. Key bindings are configurable with conflict detection.

use std::collections::HashMap;

use tracing::debug;

use crate::types::errors::BindingError;
use crate::types::item::ReactionKind;
use crate::types::overlay::Direction;

/// Overlay action a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    Close,
    Previous,
    Next,
}

impl OverlayAction {
    pub const ALL: [OverlayAction; 3] = [
        OverlayAction::Close,
        OverlayAction::Previous,
        OverlayAction::Next,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OverlayAction::Close => "close_overlay",
            OverlayAction::Previous => "previous_item",
            OverlayAction::Next => "next_item",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    fn command(self) -> InputCommand {
        match self {
            OverlayAction::Close => InputCommand::Close,
            OverlayAction::Previous => InputCommand::Navigate(Direction::Prev),
            OverlayAction::Next => InputCommand::Navigate(Direction::Next),
        }
    }
}

/// Pointer buttons as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Back,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerInput {
    pub button: PointerButton,
    pub alt: bool,
}

impl PointerInput {
    pub fn new(button: PointerButton) -> Self {
        Self { button, alt: false }
    }

    pub fn with_alt(button: PointerButton) -> Self {
        Self { button, alt: true }
    }

    /// Alt+primary/secondary/auxiliary map to like/dislike/love.
    pub fn reaction(self) -> Option<ReactionKind> {
        if !self.alt {
            return None;
        }
        match self.button {
            PointerButton::Primary => Some(ReactionKind::Like),
            PointerButton::Secondary => Some(ReactionKind::Dislike),
            PointerButton::Auxiliary => Some(ReactionKind::Love),
            PointerButton::Back | PointerButton::Forward => None,
        }
    }
}

/// Where inside the overlay a pointer event landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    FullImage,
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Close,
    Navigate(Direction),
    React(ReactionKind),
    ToggleDrawer,
}

/// Outcome of a pointer event, including what to do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputDecision {
    pub command: Option<InputCommand>,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl InputDecision {
    fn ignored() -> Self {
        Self::default()
    }

    fn consumed(command: InputCommand) -> Self {
        Self {
            command: Some(command),
            prevent_default: true,
            stop_propagation: true,
        }
    }
}

/// What a click on a grid item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClick {
    Open,
    React(ReactionKind),
    Ignore,
}

/// Classifies a click on an item in the grid. Works without an attached port.
pub fn classify_item_click(pointer: PointerInput) -> ItemClick {
    if let Some(kind) = pointer.reaction() {
        return ItemClick::React(kind);
    }
    match (pointer.button, pointer.alt) {
        (PointerButton::Primary, false) => ItemClick::Open,
        _ => ItemClick::Ignore,
    }
}

/// Key bindings, action name to key name.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    bindings: HashMap<String, String>,
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let bindings = [
            (OverlayAction::Close, "Escape"),
            (OverlayAction::Previous, "ArrowLeft"),
            (OverlayAction::Next, "ArrowRight"),
        ]
        .into_iter()
        .map(|(a, k)| (a.name().to_string(), k.to_string()))
        .collect();
        Self { bindings }
    }

    /// Builds bindings from a configured map layered over the defaults.
    /// Conflicts are checked on the merged result, so keys can be swapped.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, BindingError> {
        let mut merged = Self::defaults().bindings;
        for (action, key) in map {
            if OverlayAction::from_name(action).is_none() {
                return Err(BindingError::UnknownAction(action.clone()));
            }
            if key.is_empty() {
                return Err(BindingError::InvalidKey(format!("empty key for '{}'", action)));
            }
            merged.insert(action.clone(), key.clone());
        }
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (action, key) in &merged {
            if let Some(other) = seen.insert(key.as_str(), action.as_str()) {
                return Err(BindingError::Conflict(format!(
                    "'{}' is bound to both '{}' and '{}'",
                    key, other, action
                )));
            }
        }
        Ok(Self { bindings: merged })
    }

    pub fn register(&mut self, action: &str, key: &str) -> Result<(), BindingError> {
        if OverlayAction::from_name(action).is_none() {
            return Err(BindingError::UnknownAction(action.to_string()));
        }
        if key.is_empty() {
            return Err(BindingError::InvalidKey("Key cannot be empty".to_string()));
        }
        if let Some(other) = self.has_conflict(key, Some(action)) {
            return Err(BindingError::Conflict(format!(
                "'{}' is already bound to '{}'",
                key, other
            )));
        }
        self.bindings.insert(action.to_string(), key.to_string());
        Ok(())
    }

    pub fn unregister(&mut self, action: &str) -> Result<(), BindingError> {
        self.bindings
            .remove(action)
            .map(|_| ())
            .ok_or_else(|| BindingError::NotFound(action.to_string()))
    }

    pub fn key_for(&self, action: OverlayAction) -> Option<&str> {
        self.bindings.get(action.name()).map(String::as_str)
    }

    pub fn action_for_key(&self, key: &str) -> Option<OverlayAction> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == key)
            .and_then(|(action, _)| OverlayAction::from_name(action))
    }

    pub fn has_conflict(&self, key: &str, exclude_action: Option<&str>) -> Option<String> {
        self.bindings
            .iter()
            .find(|(action, bound)| bound.as_str() == key && Some(action.as_str()) != exclude_action)
            .map(|(action, _)| action.clone())
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Self::defaults();
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults()
    }
}

/// The single listener set of the overlay.
#[derive(Debug, Clone, Default)]
pub struct InputPort {
    attached: bool,
    bindings: KeyBindings,
}

impl InputPort {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            attached: false,
            bindings,
        }
    }

    /// Starts listening. Returns false when already attached.
    pub fn attach(&mut self) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        debug!("overlay input attached");
        true
    }

    /// Stops listening. Returns false when not attached.
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        debug!("overlay input detached");
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn handle_key(&self, key: &str) -> Option<InputCommand> {
        if !self.attached {
            return None;
        }
        self.bindings.action_for_key(key).map(OverlayAction::command)
    }

    /// Back/forward buttons navigate and suppress native history navigation;
    /// alt-clicks react; a plain click on the full image toggles the drawer.
    pub fn handle_pointer(&self, pointer: PointerInput, target: PointerTarget) -> InputDecision {
        if !self.attached {
            return InputDecision::ignored();
        }
        if let Some(kind) = pointer.reaction() {
            return InputDecision::consumed(InputCommand::React(kind));
        }
        match (pointer.button, target) {
            (PointerButton::Back, _) => {
                InputDecision::consumed(InputCommand::Navigate(Direction::Prev))
            }
            (PointerButton::Forward, _) => {
                InputDecision::consumed(InputCommand::Navigate(Direction::Next))
            }
            (PointerButton::Primary, PointerTarget::FullImage) => InputDecision {
                command: Some(InputCommand::ToggleDrawer),
                prevent_default: false,
                stop_propagation: false,
            },
            _ => InputDecision::ignored(),
        }
    }
}
