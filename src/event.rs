use crate::actions::Action;
use crate::app::{AppState, DragGesture, DragMode};
use crate::camera::{MoveKey, Viewport, PX_PER_CELL_X, PX_PER_CELL_Y};
use crate::fsops::OpKind;
use crate::nav::Direction;
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// Poll for terminal events and translate them into actions. Blocks for at
/// most `timeout`, then drains whatever else is already queued so a burst of
/// input lands in a single frame. Held movement keys and the mouse gesture
/// state are updated in place; everything discrete becomes an [`Action`].
pub fn poll_actions(app: &mut AppState, timeout: Duration) -> Result<Vec<Action>> {
    let mut actions = Vec::new();

    if !event::poll(timeout)? {
        return Ok(actions);
    }

    loop {
        match event::read()? {
            Event::Key(key) => {
                if let Some(action) = handle_key_event(app, key) {
                    actions.push(action);
                }
            }
            Event::Mouse(mouse) => {
                if let Some(action) = handle_mouse_event(app, mouse) {
                    actions.push(action);
                }
            }
            Event::FocusLost => {
                // no release events arrive once focus is gone
                app.drag = None;
                app.release_all_keys();
            }
            Event::FocusGained | Event::Paste(_) | Event::Resize(_, _) => {}
        }
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }

    Ok(actions)
}

fn movement_key(code: KeyCode) -> Option<MoveKey> {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') => Some(MoveKey::Forward),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(MoveKey::Back),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(MoveKey::StrafeLeft),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(MoveKey::StrafeRight),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(MoveKey::Rise),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(MoveKey::Sink),
        _ => None,
    }
}

fn handle_key_event(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    // key-release reporting only exists under the keyboard enhancement
    // protocol; elsewhere held keys expire via the hold window
    if key.kind == KeyEventKind::Release {
        if let Some(move_key) = movement_key(key.code) {
            app.release_move_key(move_key);
        }
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if app.show_help {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        };
    }

    if let Some(move_key) = movement_key(key.code) {
        app.press_move_key(move_key);
        return None;
    }

    // under the enhancement protocol, auto-repeat drives navigation but
    // never edge-triggered commands (a held Delete must not self-confirm)
    if key.kind == KeyEventKind::Repeat {
        return match key.code {
            KeyCode::Up => Some(Action::Navigate(Direction::Up)),
            KeyCode::Down => Some(Action::Navigate(Direction::Down)),
            KeyCode::Left => Some(Action::Navigate(Direction::Left)),
            KeyCode::Right => Some(Action::Navigate(Direction::Right)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(Action::Quit),

        // spatial navigation
        KeyCode::Up => Some(Action::Navigate(Direction::Up)),
        KeyCode::Down => Some(Action::Navigate(Direction::Down)),
        KeyCode::Left => Some(Action::Navigate(Direction::Left)),
        KeyCode::Right => Some(Action::Navigate(Direction::Right)),

        KeyCode::Enter => Some(Action::ToggleExpandCursor),
        KeyCode::Char(' ') => Some(Action::ToggleSampleTree),
        KeyCode::Char('c') => Some(Action::RecenterCamera),
        KeyCode::Delete => Some(Action::DeleteCursor),

        KeyCode::Char('y') => Some(Action::YankPath),
        KeyCode::Char('m') => Some(Action::MarkSource),
        KeyCode::Char('p') => Some(Action::PasteInto(OpKind::Copy)),
        KeyCode::Char('v') => Some(Action::PasteInto(OpKind::Move)),
        KeyCode::Char('g') => Some(Action::RequestAnalysis),

        KeyCode::Char('?') => Some(Action::ShowHelp),
        _ => None,
    }
}

fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let mode = if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                DragMode::Pan
            } else {
                DragMode::Rotate
            };
            app.drag = Some(DragGesture {
                mode,
                last: (mouse.column, mouse.row),
                moved: false,
            });
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let gesture = app.drag.as_mut()?;
            let dx = (mouse.column as f32 - gesture.last.0 as f32) * PX_PER_CELL_X;
            let dy = (mouse.row as f32 - gesture.last.1 as f32) * PX_PER_CELL_Y;
            gesture.last = (mouse.column, mouse.row);
            gesture.moved = true;
            match gesture.mode {
                DragMode::Rotate => Some(Action::Rotate(dx, dy)),
                DragMode::Pan => Some(Action::Pan(dx, dy)),
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let gesture = app.drag.take()?;
            if gesture.moved {
                return None;
            }
            // a click: down+up with no intervening drag
            let area = app.scene_area?;
            if mouse.column < area.x
                || mouse.column >= area.x + area.width
                || mouse.row < area.y
                || mouse.row >= area.y + area.height
            {
                return None;
            }
            let (x, y) = Viewport::cell_center(mouse.column - area.x, mouse.row - area.y);
            Some(Action::ClickAt(x, y))
        }
        MouseEventKind::ScrollUp => Some(Action::Zoom(1.0)),
        MouseEventKind::ScrollDown => Some(Action::Zoom(-1.0)),
        _ => None,
    }
}
