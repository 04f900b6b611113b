use serde::Deserialize;

pub use miniquad::KeyCode;

/// Keys currently held down, fed by the host's input system.
#[derive(Default, Clone, Debug)]
pub struct Keyboard {
    pressed: Vec<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let held = self.pressed.contains(&key);
        if pressed && !held {
            self.pressed.push(key);
        } else if !pressed && held {
            self.pressed.retain(|k| *k != key);
        }
    }
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

/// Parses a key name such as `Enter`, `Escape` or `F1`.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    serde_yml::from_str::<KeyName>(name.trim())
        .ok()
        .map(|key| key.0)
}

#[derive(Deserialize)]
struct KeyName(#[serde(with = "KeyCodeRemote")] KeyCode);

#[derive(Deserialize)]
#[serde(remote = "KeyCode")]
enum KeyCodeRemote {
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Semicolon,
    Equal,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpEnter,
    LeftShift,
    LeftControl,
    LeftAlt,
    RightShift,
    RightControl,
    RightAlt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_tracks_held_keys() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_key(KeyCode::Enter, true);
        keyboard.handle_key(KeyCode::Enter, true);
        assert!(keyboard.is_pressed(KeyCode::Enter));
        keyboard.handle_key(KeyCode::Enter, false);
        assert!(!keyboard.is_pressed(KeyCode::Enter));
    }

    #[test]
    fn parses_key_names() {
        assert_eq!(parse_key("Enter"), Some(KeyCode::Enter));
        assert_eq!(parse_key(" F5 "), Some(KeyCode::F5));
        assert_eq!(parse_key("NotAKey"), None);
    }
}
