//! Input system with action-based mapping
//!
//! Raw keyboard events become held/just-pressed action sets, and once per
//! frame tick those sets are sampled into a [`FrameInput`].

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Magnitude below which a movement axis counts as released
pub const AXIS_DEADZONE: f32 = 0.1;

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move forward (W / Up by default)
    MoveForward,
    /// Move backward (S / Down by default)
    MoveBackward,
    /// Turn left (A / Left by default)
    TurnLeft,
    /// Turn right (D / Right by default)
    TurnRight,
    /// Jump (Space by default)
    Jump,
    /// Return to the spawn point (H by default)
    Respawn,
    /// Raise music volume (= / numpad + by default)
    VolumeUp,
    /// Lower music volume (- / numpad - by default)
    VolumeDown,
    /// Quit (Escape by default)
    Quit,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Press an action, recording the edge if it was not already held
    pub fn press(&mut self, action: InputAction) {
        if !self.held.contains(&action) {
            self.just_pressed.insert(action);
        }
        self.held.insert(action);
    }

    /// Release an action
    pub fn release(&mut self, action: InputAction) {
        self.held.remove(&action);
        self.just_released.insert(action);
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Input sampled once per frame tick, in the form gameplay consumes it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// x = turn (right positive), y = forward (forward positive); length <= 1
    pub movement: Vec2,
    /// Jump was pressed this frame
    pub jump_pressed: bool,
    /// Jump is currently held
    pub jump_held: bool,
    /// Respawn was pressed this frame
    pub respawn_pressed: bool,
}

impl FrameInput {
    /// Build the frame's movement vector and action edges
    pub fn sample(state: &InputState) -> Self {
        let mut movement = Vec2::ZERO;
        if state.is_held(InputAction::MoveForward) {
            movement.y += 1.0;
        }
        if state.is_held(InputAction::MoveBackward) {
            movement.y -= 1.0;
        }
        if state.is_held(InputAction::TurnLeft) {
            movement.x -= 1.0;
        }
        if state.is_held(InputAction::TurnRight) {
            movement.x += 1.0;
        }

        // Diagonal input is normalized so it is never faster than straight input
        if movement.length() > 1.0 {
            movement = movement.normalize();
        }

        Self {
            movement,
            jump_pressed: state.is_just_pressed(InputAction::Jump),
            jump_held: state.is_held(InputAction::Jump),
            respawn_pressed: state.is_just_pressed(InputAction::Respawn),
        }
    }

    /// Whether the movement vector is outside the deadzone
    pub fn is_moving(&self) -> bool {
        self.movement.length() > AXIS_DEADZONE
    }
}

/// Maps physical keys to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Key to action mappings
    bindings: HashMap<KeyCode, InputAction>,
    /// Reverse lookup: action to all keys
    reverse: HashMap<InputAction, Vec<KeyCode>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        // Default WASD bindings
        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::TurnLeft);
        bindings.bind(KeyCode::KeyD, InputAction::TurnRight);

        // Arrow keys as alternative
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::TurnLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::TurnRight);

        // Actions
        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::KeyH, InputAction::Respawn);
        bindings.bind(KeyCode::Equal, InputAction::VolumeUp);
        bindings.bind(KeyCode::NumpadAdd, InputAction::VolumeUp);
        bindings.bind(KeyCode::Minus, InputAction::VolumeDown);
        bindings.bind(KeyCode::NumpadSubtract, InputAction::VolumeDown);
        bindings.bind(KeyCode::Escape, InputAction::Quit);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        if let Some(previous) = self.bindings.insert(key, action) {
            if let Some(keys) = self.reverse.get_mut(&previous) {
                keys.retain(|k| *k != key);
            }
        }
        self.reverse.entry(action).or_default().push(key);
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings.get(&key).copied()
    }

    /// All keys bound to an action
    pub fn keys_for(&self, action: InputAction) -> &[KeyCode] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Physical keys currently down
    held_keys: HashSet<KeyCode>,
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        let PhysicalKey::Code(key_code) = physical_key else {
            return;
        };
        let Some(action) = self.bindings.get_key_action(key_code) else {
            return;
        };

        match element_state {
            ElementState::Pressed => {
                self.held_keys.insert(key_code);
                self.state.press(action);
            }
            ElementState::Released => {
                self.held_keys.remove(&key_code);
                // The action stays held while another of its keys is down
                let still_held = self
                    .bindings
                    .keys_for(action)
                    .iter()
                    .any(|key| self.held_keys.contains(key));
                if !still_held {
                    self.state.release(action);
                }
            }
        }
    }

    /// Forget every held key, e.g. when the window loses focus
    pub fn clear_all(&mut self) {
        self.held_keys.clear();
        self.state.clear_all();
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.get_key_action(KeyCode::KeyW),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.get_key_action(KeyCode::Space),
            Some(InputAction::Jump)
        );
        assert_eq!(bindings.keys_for(InputAction::TurnLeft).len(), 2);
    }

    #[test]
    fn test_rebinding_moves_key() {
        let mut bindings = InputBindings::default();
        bindings.bind(KeyCode::KeyH, InputAction::Jump);
        assert_eq!(bindings.get_key_action(KeyCode::KeyH), Some(InputAction::Jump));
        assert!(bindings.keys_for(InputAction::Respawn).is_empty());
    }

    #[test]
    fn test_press_edge_only_once() {
        let mut handler = InputHandler::new();
        let space = PhysicalKey::Code(KeyCode::Space);

        handler.handle_keyboard(space, ElementState::Pressed);
        assert!(handler.state.is_just_pressed(InputAction::Jump));
        handler.end_frame();

        // Key repeat while held does not produce a second edge
        handler.handle_keyboard(space, ElementState::Pressed);
        assert!(!handler.state.is_just_pressed(InputAction::Jump));
        assert!(handler.state.is_held(InputAction::Jump));

        handler.handle_keyboard(space, ElementState::Released);
        assert!(handler.state.is_just_released(InputAction::Jump));
        assert!(!handler.state.is_held(InputAction::Jump));
    }

    #[test]
    fn test_action_held_while_any_bound_key_is_down() {
        let mut handler = InputHandler::new();
        let w = PhysicalKey::Code(KeyCode::KeyW);
        let up = PhysicalKey::Code(KeyCode::ArrowUp);

        handler.handle_keyboard(w, ElementState::Pressed);
        handler.handle_keyboard(up, ElementState::Pressed);
        handler.handle_keyboard(up, ElementState::Released);

        let frame = FrameInput::sample(&handler.state);
        assert_eq!(frame.movement, Vec2::new(0.0, 1.0));
        assert!(!handler.state.is_just_released(InputAction::MoveForward));

        handler.handle_keyboard(w, ElementState::Released);
        assert!(!handler.state.is_held(InputAction::MoveForward));
        assert!(handler.state.is_just_released(InputAction::MoveForward));
    }

    #[test]
    fn test_clear_all_forgets_held_keys() {
        let mut handler = InputHandler::new();
        let a = PhysicalKey::Code(KeyCode::KeyA);
        let left = PhysicalKey::Code(KeyCode::ArrowLeft);

        handler.handle_keyboard(a, ElementState::Pressed);
        handler.clear_all();
        assert!(!handler.state.is_held(InputAction::TurnLeft));

        // A stale key from before the clear must not keep the action alive
        handler.handle_keyboard(left, ElementState::Pressed);
        handler.handle_keyboard(left, ElementState::Released);
        assert!(!handler.state.is_held(InputAction::TurnLeft));
    }

    #[test]
    fn test_sample_normalizes_diagonal() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::TurnRight);

        let frame = FrameInput::sample(&state);
        assert!((frame.movement.length() - 1.0).abs() < 1e-5);
        assert!(frame.movement.x > 0.0 && frame.movement.y > 0.0);
        assert!(frame.is_moving());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::MoveBackward);

        let frame = FrameInput::sample(&state);
        assert_eq!(frame.movement, Vec2::ZERO);
        assert!(!frame.is_moving());
    }

    #[test]
    fn test_sample_edges() {
        let mut state = InputState::new();
        state.press(InputAction::Jump);
        state.press(InputAction::Respawn);

        let frame = FrameInput::sample(&state);
        assert!(frame.jump_pressed && frame.jump_held && frame.respawn_pressed);

        state.clear_frame();
        let frame = FrameInput::sample(&state);
        assert!(!frame.jump_pressed && frame.jump_held && !frame.respawn_pressed);
    }
}
