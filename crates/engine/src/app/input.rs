use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    RotateLeft,
    RotateRight,
    Digit(char),
    ClearCode,
    SubmitCode,
    /// Closes the open panel, or quits when nothing is open.
    Cancel,
    ToggleDebug,
}

pub fn action_for_key(key: KeyCode) -> Option<InputAction> {
    let action = match key {
        KeyCode::ArrowLeft | KeyCode::KeyA => InputAction::RotateLeft,
        KeyCode::ArrowRight | KeyCode::KeyD => InputAction::RotateRight,
        KeyCode::Backspace | KeyCode::Delete => InputAction::ClearCode,
        KeyCode::Enter | KeyCode::NumpadEnter => InputAction::SubmitCode,
        KeyCode::Escape => InputAction::Cancel,
        KeyCode::F3 => InputAction::ToggleDebug,
        other => InputAction::Digit(digit_for_key(other)?),
    };
    Some(action)
}

fn digit_for_key(key: KeyCode) -> Option<char> {
    let digit = match key {
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        _ => return None,
    };
    Some(digit)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InputEvent {
    Action(InputAction),
    Click { x: f32, y: f32 },
}

/// Turns raw window events into press edges, queued until the next frame.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    keys_down: HashSet<KeyCode>,
    cursor_position_px: Option<(f32, f32)>,
    left_mouse_is_down: bool,
    pending: Vec<InputEvent>,
}

impl InputCollector {
    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_key_state(key_event.physical_key, key_event.state);
    }

    pub(crate) fn handle_key_state(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(code) {
                    if let Some(action) = action_for_key(code) {
                        self.pending.push(InputEvent::Action(action));
                    }
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    pub(crate) fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some((x, y));
    }

    pub(crate) fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    pub(crate) fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    if let Some((x, y)) = self.cursor_position_px {
                        self.pending.push(InputEvent::Click { x, y });
                    }
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    pub(crate) fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}
