//! Keyboard shortcut registry and documentation.

use inkpanel_core::input::{Key, KeyEvent};

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    DeleteSelection,
    CommitText,
    CancelText,
    Undo,
    Redo,
    Duplicate,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, action: ShortcutAction, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        if self.ctrl != event.modifiers.command() {
            return false;
        }
        match &event.key {
            Key::Delete => self.key == "Delete",
            Key::Backspace => self.key == "Backspace",
            Key::Enter => self.key == "Enter",
            Key::Escape => self.key == "Escape",
            Key::Char(c) => {
                let mut chars = self.key.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(c))
            }
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", false, ShortcutAction::DeleteSelection, "Delete selected layer"),
            Shortcut::new("Backspace", false, ShortcutAction::DeleteSelection, "Delete selected layer"),
            Shortcut::new("Enter", false, ShortcutAction::CommitText, "Finish text entry"),
            Shortcut::new("Escape", false, ShortcutAction::CancelText, "Cancel text entry or selection"),
            Shortcut::new("Z", true, ShortcutAction::Undo, "Undo"),
            Shortcut::new("Y", true, ShortcutAction::Redo, "Redo"),
            Shortcut::new("D", true, ShortcutAction::Duplicate, "Duplicate selected layer"),
        ]
    }

    /// The shortcut bound to `event`, if any.
    pub fn lookup(event: &KeyEvent) -> Option<ShortcutAction> {
        Self::all().into_iter().find(|s| s.matches(event)).map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
