//! Maps window input onto session operations.

use tracing::debug;

use crate::content::Direction;
use crate::session::{InputError, RoomSession};

use super::input::InputAction;
use super::rendering::{KeypadKey, ScreenLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    Continue,
    Quit,
}

fn log_ignored(result: Result<(), InputError>) {
    if let Err(error) = result {
        debug!(error = %error, "input_ignored");
    }
}

pub fn dispatch_action(session: &mut RoomSession, action: InputAction) -> LoopSignal {
    match action {
        InputAction::RotateLeft => log_ignored(session.rotate(Direction::Left).map(drop)),
        InputAction::RotateRight => log_ignored(session.rotate(Direction::Right).map(drop)),
        InputAction::Digit(digit) => log_ignored(session.press_code_digit(digit).map(drop)),
        InputAction::ClearCode => log_ignored(session.clear_code()),
        InputAction::SubmitCode => log_ignored(session.submit_code().map(drop)),
        InputAction::ToggleDebug => {
            session.toggle_debug_mode();
        }
        InputAction::Cancel => {
            if session.code_entry().is_some() {
                log_ignored(session.close_code_entry());
            } else if session.inspecting().is_some() {
                session.close_inspect();
            } else {
                return LoopSignal::Quit;
            }
        }
    }
    LoopSignal::Continue
}

/// Routes a left click at window pixel (`px`, `py`).
pub fn dispatch_click(session: &mut RoomSession, layout: &ScreenLayout, px: f32, py: f32) {
    let (ix, iy) = (px as i32, py as i32);

    if session.code_entry().is_some() {
        match layout.keypad_key_at(ix, iy) {
            Some(KeypadKey::Digit(digit)) => log_ignored(session.press_code_digit(digit).map(drop)),
            Some(KeypadKey::Clear) => log_ignored(session.clear_code()),
            Some(KeypadKey::Enter) => log_ignored(session.submit_code().map(drop)),
            None if !layout.keypad_panel().contains(ix, iy) => {
                log_ignored(session.close_code_entry());
            }
            None => {}
        }
        return;
    }

    if session.inspecting().is_some() {
        session.close_inspect();
        return;
    }

    if let Some(direction) = layout.rotate_button_at(ix, iy) {
        log_ignored(session.rotate(direction).map(drop));
        return;
    }

    let item_count = session.state().inventory().len();
    if let Some(index) = layout.inventory_slot_at(ix, iy, item_count) {
        if let Some(item) = session.state().inventory().get(index).cloned() {
            log_ignored(session.select_item(&item).map(drop));
        }
        return;
    }

    if let Some((x_pct, y_pct)) = layout.to_room_pct(px, py) {
        log_ignored(session.click_at(x_pct, y_pct).map(drop));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::PxRect;
    use crate::content::PercentRect;
    use crate::session::fixtures::session;

    fn layout() -> ScreenLayout {
        ScreenLayout::compute(1600, 720)
    }

    fn room_point(layout: &ScreenLayout, top: f32, left: f32) -> (f32, f32) {
        let rect = layout.pct_rect(PercentRect {
            top,
            left,
            width: 0.0,
            height: 0.0,
        });
        (rect.x as f32 + 0.5, rect.y as f32 + 0.5)
    }

    fn center_of(rect: PxRect) -> (f32, f32) {
        let (x, y) = rect.center();
        (x as f32, y as f32)
    }

    #[test]
    fn rotate_buttons_and_keys_change_wall() {
        let (mut session, _) = session();
        let layout = layout();
        let (x, y) = center_of(layout.rotate_button(Direction::Right));
        dispatch_click(&mut session, &layout, x, y);
        assert_eq!(session.current_wall().index(), 1);
        assert_eq!(dispatch_action(&mut session, InputAction::RotateLeft), LoopSignal::Continue);
        assert_eq!(session.current_wall().index(), 0);
    }

    #[test]
    fn keypad_clicks_enter_the_code() {
        let (mut session, recorder) = session();
        let layout = layout();
        dispatch_action(&mut session, InputAction::RotateRight);
        let (x, y) = room_point(&layout, 55.0, 60.0);
        dispatch_click(&mut session, &layout, x, y);
        assert!(session.code_entry().is_some());

        let keys = layout.keypad_keys().collect::<Vec<_>>();
        for wanted in [
            KeypadKey::Digit('3'),
            KeypadKey::Digit('1'),
            KeypadKey::Digit('4'),
            KeypadKey::Enter,
        ] {
            let (_, rect) = keys
                .iter()
                .find(|(key, _)| *key == wanted)
                .expect("key on pad");
            let (x, y) = center_of(*rect);
            dispatch_click(&mut session, &layout, x, y);
        }
        assert!(session.code_entry().is_none());
        assert!(session.state().flag("drawerOpen"));
        assert!(recorder.contains("The drawer unlocks!"));
    }

    #[test]
    fn clicking_outside_keypad_closes_it() {
        let (mut session, recorder) = session();
        let layout = layout();
        dispatch_action(&mut session, InputAction::RotateRight);
        session.click_zone("east-drawer").expect("click");
        let (x, y) = room_point(&layout, 5.0, 5.0);
        dispatch_click(&mut session, &layout, x, y);
        assert!(session.code_entry().is_none());
        assert!(recorder.contains("You step back from the drawer."));
    }

    #[test]
    fn escape_closes_panels_before_quitting() {
        let (mut session, _) = session();
        dispatch_action(&mut session, InputAction::RotateRight);
        session.click_zone("east-drawer").expect("click");
        assert_eq!(dispatch_action(&mut session, InputAction::Cancel), LoopSignal::Continue);
        assert!(session.code_entry().is_none());

        session.click_zone("east-letter").expect("inspect");
        assert!(session.inspecting().is_some());
        assert_eq!(dispatch_action(&mut session, InputAction::Cancel), LoopSignal::Continue);
        assert!(session.inspecting().is_none());

        assert_eq!(dispatch_action(&mut session, InputAction::Cancel), LoopSignal::Quit);
    }

    #[test]
    fn inventory_slot_click_selects_item() {
        let (mut session, _) = session();
        let layout = layout();
        dispatch_action(&mut session, InputAction::RotateRight);
        session.click_zone("east-drawer").expect("click");
        session.submit_code_str("314").expect("submit");
        session.click_zone("east-tv-knob").expect("pickup");

        let (x, y) = center_of(layout.inventory_slot(0));
        dispatch_click(&mut session, &layout, x, y);
        assert_eq!(session.state().active_item(), Some("TV Knob"));
        dispatch_click(&mut session, &layout, x, y);
        assert_eq!(session.state().active_item(), None);
    }

    #[test]
    fn keys_without_a_keypad_are_ignored() {
        let (mut session, recorder) = session();
        for action in [
            InputAction::Digit('1'),
            InputAction::ClearCode,
            InputAction::SubmitCode,
        ] {
            assert_eq!(dispatch_action(&mut session, action), LoopSignal::Continue);
        }
        assert!(recorder.messages().is_empty());
        dispatch_action(&mut session, InputAction::ToggleDebug);
        assert!(session.state().debug_mode());
    }
}
