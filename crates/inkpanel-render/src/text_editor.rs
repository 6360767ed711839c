//! Inline text-entry state for the text, balloon and re-edit flows.

use inkpanel_core::input::{Key, KeyEvent};
use inkpanel_core::layers::LayerId;
use kurbo::Point;

/// Where the committed text box goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryPlacement {
    /// Top-left corner of the box.
    Anchor(Point),
    /// Center of the box (balloon text).
    Centered(Point),
}

/// Result of handling a key while text entry is open.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditResult {
    /// Event was handled, text may have changed.
    Handled,
    /// Enter with non-blank text: the entry should be committed.
    Commit,
    /// Escape, or Enter with blank text: the entry should be discarded.
    Cancel,
    /// Event was not handled (pass to other handlers).
    NotHandled,
}

/// An open text-entry box anchored in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    placement: EntryPlacement,
    buffer: String,
    /// Layer being re-edited, if any; `None` creates a new layer.
    editing: Option<LayerId>,
}

impl TextEntry {
    /// New empty entry with its top-left at `anchor`.
    pub fn at(anchor: Point) -> Self {
        Self {
            placement: EntryPlacement::Anchor(anchor),
            buffer: String::new(),
            editing: None,
        }
    }

    /// New empty entry centered on `center`.
    pub fn centered(center: Point) -> Self {
        Self {
            placement: EntryPlacement::Centered(center),
            buffer: String::new(),
            editing: None,
        }
    }

    /// Re-open an existing layer, pre-filled with its text.
    pub fn editing(id: LayerId, anchor: Point, text: &str) -> Self {
        Self {
            placement: EntryPlacement::Anchor(anchor),
            buffer: text.to_string(),
            editing: Some(id),
        }
    }

    pub fn placement(&self) -> EntryPlacement {
        self.placement
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn editing_layer(&self) -> Option<LayerId> {
        self.editing
    }

    /// Whether committing would produce nothing.
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Append typed or pasted text.
    pub fn insert_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Handle a key press event.
    pub fn handle_key(&mut self, event: &KeyEvent) -> TextEditResult {
        match event.key {
            Key::Escape => TextEditResult::Cancel,
            Key::Enter if self.is_blank() => TextEditResult::Cancel,
            Key::Enter => TextEditResult::Commit,
            Key::Backspace => {
                self.buffer.pop();
                TextEditResult::Handled
            }
            // No caret: there is never anything after the end of the buffer.
            Key::Delete => TextEditResult::Handled,
            Key::Char(_) if event.modifiers.command() => TextEditResult::NotHandled,
            Key::Char(c) => {
                self.buffer.push(c);
                TextEditResult::Handled
            }
        }
    }
}
