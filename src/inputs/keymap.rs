//! Keyboard shortcuts for the viewer surface

use crossterm::event::{KeyCode, KeyEvent};

use crate::viewer::Command;

/// Map a key press to a viewer command.
///
/// All shortcuts are disabled while a text input has focus, so typing a
/// space into a comment draft never turns the page.
#[must_use]
pub fn shortcut_command(key: &KeyEvent, input_active: bool) -> Option<Command> {
    if input_active {
        return None;
    }

    match key.code {
        KeyCode::Left | KeyCode::PageUp => Some(Command::PrevPage),
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char(' ') => Some(Command::NextPage),
        KeyCode::Home => Some(Command::FirstPage),
        KeyCode::End => Some(Command::LastPage),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::ZoomIn),
        KeyCode::Char('-') => Some(Command::ZoomOut),
        _ => None,
    }
}
