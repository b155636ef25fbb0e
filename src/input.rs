//! Per-frame input snapshot consumed by the editor.
//!
//! Feed winit window events through [`InputState::process_window_event`] (or
//! drive it directly from tests), let the editor read it during its update,
//! then call [`InputState::end_frame`] to clear the pressed/released edges.

use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Default, Clone)]
pub struct InputState {
    mouse_position: (f32, f32),
    buttons_held: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the snapshot from a winit window event.
    ///
    /// # Returns
    /// `true` if the event was relevant to the editor
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.set_mouse_position(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.press_button(*button),
                    ElementState::Released => self.release_button(*button),
                }
                true
            }
            WindowEvent::KeyboardInput { event, .. } => self.process_key_event(event),
            WindowEvent::Focused(false) => {
                // Releases are never delivered to an unfocused window
                self.buttons_held.clear();
                self.keys_held.clear();
                false
            }
            _ => false,
        }
    }

    fn process_key_event(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        match event.state {
            ElementState::Pressed if !event.repeat => self.press_key(code),
            ElementState::Pressed => {}
            ElementState::Released => self.release_key(code),
        }
        true
    }

    pub fn set_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse_position = (x, y);
    }

    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    pub fn press_button(&mut self, button: MouseButton) {
        if self.buttons_held.insert(button) {
            self.buttons_pressed.insert(button);
        }
    }

    pub fn release_button(&mut self, button: MouseButton) {
        if self.buttons_held.remove(&button) {
            self.buttons_released.insert(button);
        }
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    /// True only during the frame in which the button went down.
    pub fn was_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn was_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// True only during the frame in which the key went down.
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Locked means the cursor drives the camera, so picking is suppressed.
    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    pub fn toggle_cursor_lock(&mut self) {
        self.cursor_locked = !self.cursor_locked;
    }

    /// Clears the edge sets. Call once per frame after the editor update.
    pub fn end_frame(&mut self) {
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.keys_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_an_edge() {
        let mut input = InputState::new();
        input.press_button(MouseButton::Left);
        assert!(input.was_button_pressed(MouseButton::Left));
        assert!(input.is_button_held(MouseButton::Left));

        input.end_frame();
        assert!(!input.was_button_pressed(MouseButton::Left));
        assert!(input.is_button_held(MouseButton::Left));

        // Holding does not re-trigger the edge
        input.press_button(MouseButton::Left);
        assert!(!input.was_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_release_edge() {
        let mut input = InputState::new();
        input.press_button(MouseButton::Left);
        input.end_frame();
        input.release_button(MouseButton::Left);
        assert!(input.was_button_released(MouseButton::Left));
        assert!(!input.is_button_held(MouseButton::Left));
        input.end_frame();
        assert!(!input.was_button_released(MouseButton::Left));
    }

    #[test]
    fn test_keys_and_cursor_lock() {
        let mut input = InputState::new();
        input.press_key(KeyCode::Escape);
        assert!(input.was_key_pressed(KeyCode::Escape));
        input.end_frame();
        assert!(input.is_key_held(KeyCode::Escape));
        input.release_key(KeyCode::Escape);
        assert!(!input.is_key_held(KeyCode::Escape));

        assert!(!input.is_cursor_locked());
        input.toggle_cursor_lock();
        assert!(input.is_cursor_locked());
    }
}
