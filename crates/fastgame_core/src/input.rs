use std::collections::HashSet;

use crate::event::{Event, Modifiers, Point};

/// Re-exported key and mouse enums from `winit` for convenience.
// winit 0.30 moved `KeyCode` under `winit::keyboard`; the alias keeps
// callers away from the upstream layout.
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Engine button numbers used in normalized mouse events.
pub const LEFT_BUTTON: u8 = 1;
pub const MIDDLE_BUTTON: u8 = 2;
pub const RIGHT_BUTTON: u8 = 3;
pub const ROLLING_UP: u8 = 4;
pub const ROLLING_DOWN: u8 = 5;

/// Maps a winit mouse button onto the engine's numbering.
pub fn button_number(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => LEFT_BUTTON,
        MouseButton::Middle => MIDDLE_BUTTON,
        MouseButton::Right => RIGHT_BUTTON,
        MouseButton::Back => 6,
        MouseButton::Forward => 7,
        MouseButton::Other(n) => n.saturating_add(8).min(u8::MAX as u16) as u8,
    }
}

/// State of the keyboard and mouse as seen by the main loop.
///
/// The session feeds every normalized event through [`apply`](Self::apply)
/// before dispatching it, so callbacks can query held keys and the cursor
/// position at any time.
#[derive(Default, Debug)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    mouse_buttons: HashSet<u8>,
    mouse_pos: Point,
    modifiers: Modifiers,
}

impl InputState {
    /// Creates a fresh, empty input state.
    pub fn new() -> Self {
        Default::default()
    }

    /// Folds one normalized event into the state.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::KeyDown { key, modifiers, .. } => {
                if let Some(key) = key {
                    self.update_key(*key, true);
                }
                if let Some(m) = modifiers {
                    self.modifiers = *m;
                }
            }
            Event::KeyUp { key, modifiers } => {
                if let Some(key) = key {
                    self.update_key(*key, false);
                }
                if let Some(m) = modifiers {
                    self.modifiers = *m;
                }
            }
            Event::MouseDown { pos, button } | Event::MouseUp { pos, button } => {
                if let Some((x, y)) = pos {
                    self.set_mouse_position(*x, *y);
                }
                if let Some(b) = button {
                    self.update_mouse_button(*b, matches!(event, Event::MouseDown { .. }));
                }
            }
            Event::MouseMove { pos: Some((x, y)), .. } => self.set_mouse_position(*x, *y),
            _ => {}
        }
    }

    /// Called by the event loop when a keyboard event arrives.
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Returns true if the given key is currently pressed down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn update_mouse_button(&mut self, button: u8, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    /// Returns true if the given engine button number is currently held.
    pub fn is_button_down(&self, button: u8) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Update the current mouse cursor position (window coordinates).
    pub fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.mouse_pos = (x, y);
    }

    /// Retrieve the last recorded mouse position.
    pub fn mouse_position(&self) -> Point {
        self.mouse_pos
    }
}
