//! Input state management for pointer and keyboard events.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Two presses closer than this in time can form a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);
/// Two presses closer than this in canvas pixels can form a double click.
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in canvas coordinates.
///
/// `Leave` ends any gesture exactly like `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    Leave { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Leave { position } => position,
        }
    }

    /// Same event with its position mapped through `f`.
    pub fn map_position(self, f: impl FnOnce(Point) -> Point) -> Self {
        match self {
            PointerEvent::Down { position } => PointerEvent::Down { position: f(position) },
            PointerEvent::Move { position } => PointerEvent::Move { position: f(position) },
            PointerEvent::Up { position } => PointerEvent::Up { position: f(position) },
            PointerEvent::Leave { position } => PointerEvent::Leave { position: f(position) },
        }
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Enter,
    Escape,
    /// Printable character.
    Char(char),
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Tracks pointer state between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in canvas coordinates.
    pub pointer_position: Point,
    /// Whether the primary button is down.
    pub is_pressed: bool,
    /// Where the current press started.
    pub press_start: Option<Point>,
    /// Last click time and position for double-click detection.
    last_click: Option<(Instant, Point)>,
    /// Whether the latest press completed a double click.
    double_click_detected: bool,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event stamped with the current time.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.handle_pointer_event_at(event, Instant::now());
    }

    /// Process a pointer event that happened at `now`.
    pub fn handle_pointer_event_at(&mut self, event: PointerEvent, now: Instant) {
        self.pointer_position = event.position();
        match event {
            PointerEvent::Down { position } => {
                self.double_click_detected = match self.last_click {
                    Some((time, pos)) => {
                        now.saturating_duration_since(time) <= DOUBLE_CLICK_WINDOW
                            && (position - pos).hypot() <= DOUBLE_CLICK_DISTANCE
                    }
                    None => false,
                };
                // A completed double click resets, so a third click starts over.
                self.last_click = if self.double_click_detected {
                    None
                } else {
                    Some((now, position))
                };
                self.is_pressed = true;
                self.press_start = Some(position);
            }
            PointerEvent::Up { .. } | PointerEvent::Leave { .. } => {
                self.is_pressed = false;
                self.press_start = None;
            }
            PointerEvent::Move { .. } => {}
        }
    }

    /// Check if the latest press was a double click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_drag_tracking() {
        let mut input = InputState::new();
        input.handle_pointer_event(down(100.0, 100.0));
        assert!(input.is_pressed);

        input.handle_pointer_event(PointerEvent::Move {
            position: Point::new(150.0, 120.0),
        });
        assert_eq!(input.pointer_position, Point::new(150.0, 120.0));
        assert_eq!(input.press_start, Some(Point::new(100.0, 100.0)));

        input.handle_pointer_event(PointerEvent::Leave {
            position: Point::new(-1.0, 0.0),
        });
        assert!(!input.is_pressed);
        assert!(input.press_start.is_none());
    }

    #[test]
    fn test_double_click_detection() {
        let mut input = InputState::new();
        let t0 = Instant::now();

        input.handle_pointer_event_at(down(100.0, 100.0), t0);
        assert!(!input.is_double_click());

        input.handle_pointer_event_at(down(103.0, 104.0), t0 + Duration::from_millis(250));
        assert!(input.is_double_click());

        // Third click right after is not another double click.
        input.handle_pointer_event_at(down(103.0, 104.0), t0 + Duration::from_millis(350));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_pointer_event_at(down(100.0, 100.0), t0);
        input.handle_pointer_event_at(down(100.0, 100.0), t0 + Duration::from_millis(301));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_too_far() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_pointer_event_at(down(100.0, 100.0), t0);
        input.handle_pointer_event_at(down(106.0, 100.0), t0 + Duration::from_millis(10));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_pointer_event_json() {
        let event: PointerEvent = serde_json::from_str(r#"{"type":"leave","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(event.position(), Point::new(1.0, 2.0));
    }
}
