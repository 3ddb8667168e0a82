/// Platform-agnostic input handling system
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown { key: String, repeat: bool },
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    PointerLockChanged { locked: bool },
}

/// Keyboard and pointer state shared between event callbacks and the frame loop.
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    /// Interaction key presses since the last frame, each applied in turn.
    pub pending_interactions: u32,
    pub show_debug_boxes: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent, processor: &InputProcessor) {
        match event {
            InputEvent::KeyDown { key, repeat } => {
                if !*repeat && processor.is_interact(key) {
                    self.pending_interactions += 1;
                }
                if !*repeat && processor.wants_to_toggle_debug_boxes(key) {
                    self.toggle_debug_boxes();
                }
                self.pressed_keys.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    pub fn consume_interactions(&mut self) -> u32 {
        std::mem::take(&mut self.pending_interactions)
    }

    pub fn toggle_debug_boxes(&mut self) {
        self.show_debug_boxes = !self.show_debug_boxes;
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub interact: String,
    pub toggle_debug_boxes: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            interact: "e".to_string(),
            toggle_debug_boxes: "b".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

/// Which movement keys are held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// High-level input processor
#[derive(Debug, Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Movement keys match exactly as the host reports them.
    pub fn movement_keys(&self, input: &InputState) -> MovementKeys {
        MovementKeys {
            forward: input.is_key_pressed(&self.bindings.forward),
            backward: input.is_key_pressed(&self.bindings.backward),
            left: input.is_key_pressed(&self.bindings.left),
            right: input.is_key_pressed(&self.bindings.right),
        }
    }

    pub fn is_interact(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.interact)
    }

    pub fn wants_to_toggle_debug_boxes(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.toggle_debug_boxes)
    }

    pub fn is_escape(&self, key: &str) -> bool {
        key == self.bindings.escape
    }

    pub fn is_movement(&self, key: &str) -> bool {
        [&self.bindings.forward, &self.bindings.backward, &self.bindings.left, &self.bindings.right]
            .iter()
            .any(|k| k.as_str() == key)
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown { key, repeat: e.repeat() }
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove { dx: e.movement_x() as f32, dy: e.movement_y() as f32 }
    }
}
