use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use reelpan_core::{PointerButton, RawInput};

use crate::app::App;
use crate::keymap::KeyBinding;

/// Terminal lines scrolled per wheel notch
pub const WHEEL_LINES: f64 = 3.0;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NavUp,
    NavDown,
    NavLeft,
    NavRight,
    /// Keyboard return to the origin
    NavReset,
    /// Reset button: slower animated return to the origin
    ResetPosition,
    ToggleProfile,
    InfoTop,
    InfoPageDown,
    InfoPageUp,
    ToggleHelp,
    Dismiss,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    // Any key closes help
    if app.show_help {
        return Action::Dismiss;
    }

    let binding = KeyBinding::new(key.code, key.modifiers);
    if let Some(action) = app.keymap.get(&binding) {
        return *action;
    }
    // Some terminals report shifted symbols ("?") with SHIFT set
    if key.modifiers == KeyModifiers::SHIFT {
        if let KeyCode::Char(c) = key.code {
            if !c.is_ascii_alphabetic() {
                if let Some(action) = app.keymap.get(&KeyBinding::simple(key.code)) {
                    return *action;
                }
            }
        }
    }
    Action::None
}

/// Pixel size of one terminal cell, used to express mouse input in gallery units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

/// Translate a terminal mouse event into controller input
pub fn mouse_to_input(mouse: MouseEvent, cell: CellMetrics, timestamp: Duration) -> Option<RawInput> {
    let x = mouse.column as f64 * cell.width;
    let y = mouse.row as f64 * cell.height;
    let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
    let notch = WHEEL_LINES * cell.height;

    let input = match mouse.kind {
        MouseEventKind::Down(button) => RawInput::PointerDown {
            x,
            y,
            button: pointer_button(button),
            timestamp,
        },
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            RawInput::PointerMove { x, y, timestamp }
        }
        MouseEventKind::Drag(_) => return None,
        MouseEventKind::Up(button) => RawInput::PointerUp {
            button: pointer_button(button),
            timestamp,
        },
        MouseEventKind::ScrollDown => wheel(0.0, notch, shift, timestamp),
        MouseEventKind::ScrollUp => wheel(0.0, -notch, shift, timestamp),
        MouseEventKind::ScrollRight => wheel(notch, 0.0, shift, timestamp),
        MouseEventKind::ScrollLeft => wheel(-notch, 0.0, shift, timestamp),
    };
    Some(input)
}

fn wheel(delta_x: f64, delta_y: f64, shift: bool, timestamp: Duration) -> RawInput {
    RawInput::Wheel {
        delta_x,
        delta_y,
        shift,
        timestamp,
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: CellMetrics = CellMetrics {
        width: 10.0,
        height: 20.0,
    };

    fn mouse(kind: MouseEventKind, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column: 4,
            row: 3,
            modifiers,
        }
    }

    #[test]
    fn test_left_press_is_primary_pointer_down() {
        let ts = Duration::from_millis(5);
        let input = mouse_to_input(mouse(MouseEventKind::Down(MouseButton::Left), KeyModifiers::NONE), CELL, ts);
        assert_eq!(
            input,
            Some(RawInput::PointerDown {
                x: 40.0,
                y: 60.0,
                button: PointerButton::Primary,
                timestamp: ts,
            })
        );
    }

    #[test]
    fn test_drag_maps_to_pointer_move() {
        let ts = Duration::from_millis(9);
        let input = mouse_to_input(mouse(MouseEventKind::Drag(MouseButton::Left), KeyModifiers::NONE), CELL, ts);
        assert_eq!(input, Some(RawInput::PointerMove { x: 40.0, y: 60.0, timestamp: ts }));
        assert_eq!(
            mouse_to_input(mouse(MouseEventKind::Drag(MouseButton::Right), KeyModifiers::NONE), CELL, ts),
            None
        );
    }

    #[test]
    fn test_scroll_notch_is_three_lines() {
        let ts = Duration::ZERO;
        match mouse_to_input(mouse(MouseEventKind::ScrollDown, KeyModifiers::NONE), CELL, ts) {
            Some(RawInput::Wheel { delta_x, delta_y, shift, .. }) => {
                assert_eq!(delta_x, 0.0);
                assert_eq!(delta_y, 60.0);
                assert!(!shift);
            }
            other => panic!("unexpected input: {:?}", other),
        }
        match mouse_to_input(mouse(MouseEventKind::ScrollUp, KeyModifiers::SHIFT), CELL, ts) {
            Some(RawInput::Wheel { delta_y, shift, .. }) => {
                assert_eq!(delta_y, -60.0);
                assert!(shift);
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[test]
    fn test_release_keeps_button() {
        let input = mouse_to_input(mouse(MouseEventKind::Up(MouseButton::Right), KeyModifiers::NONE), CELL, Duration::ZERO);
        assert_eq!(
            input,
            Some(RawInput::PointerUp {
                button: PointerButton::Secondary,
                timestamp: Duration::ZERO,
            })
        );
    }
}
