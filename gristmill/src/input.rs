use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use silica::Keyboard;

pub use miniquad::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl TryFrom<miniquad::MouseButton> for MouseButton {
    type Error = ();
    fn try_from(value: miniquad::MouseButton) -> Result<Self, Self::Error> {
        match value {
            miniquad::MouseButton::Left => Ok(MouseButton::Left),
            miniquad::MouseButton::Middle => Ok(MouseButton::Middle),
            miniquad::MouseButton::Right => Ok(MouseButton::Right),
            miniquad::MouseButton::Unknown => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: KeyCode, pressed: bool },
    MouseMotion { position: Vec2 },
    MouseButton { button: MouseButton, pressed: bool },
    /// The window lost focus; nothing is held anymore.
    FocusLost,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub primary: bool,
    pub secondary: bool,
}

/// Current keyboard and pointer state, fed from window events.
#[derive(Default)]
pub struct InputSystem {
    keyboard: Keyboard,
    pointer: PointerState,
}

impl InputSystem {
    pub fn new() -> Self {
        InputSystem::default()
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keyboard.is_pressed(key)
    }
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed } => self.keyboard.handle_key(key, pressed),
            InputEvent::MouseMotion { position } => self.pointer.position = position,
            InputEvent::MouseButton { button, pressed } => match button {
                MouseButton::Left => self.pointer.primary = pressed,
                MouseButton::Right => self.pointer.secondary = pressed,
                MouseButton::Middle => {}
            },
            InputEvent::FocusLost => {
                self.keyboard.release_all();
                self.pointer.primary = false;
                self.pointer.secondary = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_keys_and_pointer() {
        let mut input = InputSystem::new();
        input.handle_event(InputEvent::Key {
            key: KeyCode::Enter,
            pressed: true,
        });
        input.handle_event(InputEvent::MouseMotion {
            position: Vec2::new(12.0, 34.0),
        });
        input.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });

        assert!(input.key_pressed(KeyCode::Enter));
        assert_eq!(input.pointer().position, Vec2::new(12.0, 34.0));
        assert!(input.pointer().primary);
        assert!(!input.pointer().secondary);

        input.handle_event(InputEvent::FocusLost);
        assert!(!input.key_pressed(KeyCode::Enter));
        assert!(!input.pointer().primary);
    }
}
