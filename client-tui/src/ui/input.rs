//! Terminal events to controller input.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

use crate::events::InputEvent;
use crate::ui::geometry::BoardGeometry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Board,
    /// Typing a chat message.
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
    Forward(InputEvent),
}

pub fn handle_event(event: &Event, mode: &mut InputMode, geometry: Option<&BoardGeometry>) -> AppAction {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(*key, mode),
        Event::Mouse(mouse) => {
            let square = geometry.and_then(|g| g.square_at(mouse.column, mouse.row));
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => match square {
                    Some(square) => AppAction::Forward(InputEvent::PickUp(square)),
                    None => AppAction::Continue,
                },
                MouseEventKind::Up(MouseButton::Left) => AppAction::Forward(InputEvent::Drop(square)),
                _ => AppAction::Continue,
            }
        }
        _ => AppAction::Continue,
    }
}

fn handle_key(key: KeyEvent, mode: &mut InputMode) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return AppAction::Quit;
    }

    if let InputMode::Chat(text) = mode {
        return match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(text);
                *mode = InputMode::Board;
                AppAction::Forward(InputEvent::ChatSubmitted(text))
            }
            KeyCode::Esc => {
                *mode = InputMode::Board;
                AppAction::Continue
            }
            KeyCode::Backspace => {
                text.pop();
                AppAction::Continue
            }
            KeyCode::Char(c) => {
                text.push(c);
                AppAction::Continue
            }
            _ => AppAction::Continue,
        };
    }

    match key.code {
        KeyCode::Char('q') => AppAction::Quit,
        KeyCode::Char('u') => AppAction::Forward(InputEvent::Undo),
        KeyCode::Char('r') => AppAction::Forward(InputEvent::Retry),
        KeyCode::Char('f') => AppAction::Forward(InputEvent::FlipView),
        KeyCode::Char('i') => {
            *mode = InputMode::Chat(String::new());
            AppAction::Continue
        }
        _ => AppAction::Continue,
    }
}
