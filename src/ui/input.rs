//! Keyboard input for the prompt line
//!
//! Turns key events into edits of the pending line. The session only ever
//! sees finished lines and activity notifications.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::Activity;

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Whether a key event types a character into the line
fn typed_char(event: &KeyEvent) -> Option<char> {
    let mods = Modifiers::from(event.modifiers);
    match event.code {
        KeyCode::Char(ch) if !mods.intersects(Modifiers::CTRL | Modifiers::ALT) => Some(ch),
        _ => None,
    }
}

/// Classify a key event as session activity
pub fn activity(event: &KeyEvent) -> Activity {
    Activity::Key {
        printable: typed_char(event).is_some(),
    }
}

/// Whether the key should quit the program
pub fn is_quit(event: &KeyEvent) -> bool {
    let mods = Modifiers::from(event.modifiers);
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('d') => mods.contains(Modifiers::CTRL),
        _ => false,
    }
}

/// Result of feeding a key to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Inserted(char),
    Deleted,
    /// Enter pressed; carries the trimmed line
    Submitted(String),
    Ignored,
}

/// Single-line input buffer
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
    /// Last key typed a character (drawn highlighted)
    highlight_last: bool,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Text split into the plain part and the highlighted last character
    pub fn split_caret(&self) -> (&str, Option<char>) {
        if !self.highlight_last {
            return (&self.buffer, None);
        }
        match self.buffer.char_indices().last() {
            Some((idx, ch)) => (&self.buffer[..idx], Some(ch)),
            None => (&self.buffer, None),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.highlight_last = false;
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> EditAction {
        if let Some(ch) = typed_char(event) {
            self.buffer.push(ch);
            self.highlight_last = true;
            return EditAction::Inserted(ch);
        }

        match event.code {
            KeyCode::Backspace => {
                self.highlight_last = false;
                match self.buffer.pop() {
                    Some(_) => EditAction::Deleted,
                    None => EditAction::Ignored,
                }
            }
            KeyCode::Enter => {
                let line = self.buffer.trim().to_string();
                self.clear();
                EditAction::Submitted(line)
            }
            _ => EditAction::Ignored,
        }
    }
}
