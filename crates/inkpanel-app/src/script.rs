//! Gesture scripts replayed by the headless shell.
//!
//! A script is a JSON array of commands, e.g.
//!
//! ```json
//! [
//!   { "cmd": "tool", "tool": "pen" },
//!   { "cmd": "drag", "from": [100, 100], "to": [300, 120] },
//!   { "cmd": "key", "key": "z", "ctrl": true }
//! ]
//! ```
//!
//! Coordinates are screen coordinates of the configured display.

use crate::error::{AppError, AppResult};
use inkpanel_core::input::{Key, KeyEvent, Modifiers};
use inkpanel_core::tools::{ToolKind, ToolSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Moves generated per drag when a script does not say.
pub const DEFAULT_DRAG_STEPS: usize = 8;

fn default_drag_steps() -> usize {
    DEFAULT_DRAG_STEPS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Tool { tool: ToolKind },
    Settings { settings: ToolSettings },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave { x: f64, y: f64 },
    /// Press and release in place.
    Click { x: f64, y: f64 },
    /// Press, evenly spaced moves, release.
    Drag {
        from: [f64; 2],
        to: [f64; 2],
        #[serde(default = "default_drag_steps")]
        steps: usize,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    /// Type into the open text entry.
    Type { text: String },
    /// Advance the replay clock, e.g. to keep two clicks apart.
    Wait { ms: u64 },
    Undo,
    Redo,
}

impl Command {
    /// Pointer positions visited by a drag, excluding the press point.
    pub fn drag_path(from: [f64; 2], to: [f64; 2], steps: usize) -> Vec<Point> {
        let (from, to) = (Point::new(from[0], from[1]), Point::new(to[0], to[1]));
        let steps = steps.max(1);
        (1..=steps)
            .map(|i| from.lerp(to, i as f64 / steps as f64))
            .collect()
    }
}

/// Parse a key name: `Delete`, `Backspace`, `Enter`, `Escape` (any case) or a single character.
pub fn parse_key(name: &str) -> AppResult<Key> {
    let key = match name.to_ascii_lowercase().as_str() {
        "delete" | "del" => Key::Delete,
        "backspace" => Key::Backspace,
        "enter" | "return" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Char(' '),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return Err(AppError::UnknownKey(name.to_string())),
            }
        }
    };
    Ok(key)
}

/// Build the key event of a `key` command.
pub fn key_event(name: &str, ctrl: bool, shift: bool) -> AppResult<KeyEvent> {
    let modifiers = Modifiers {
        ctrl,
        shift,
        ..Modifiers::NONE
    };
    Ok(KeyEvent::new(parse_key(name)?, modifiers))
}

/// Load a script file.
pub fn load_script(path: &Path) -> AppResult<Vec<Command>> {
    let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| AppError::json(path, e))
}
