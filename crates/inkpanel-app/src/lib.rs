//! InkPanel application layer.
//!
//! The canvas interaction engine that drives tools over one panel, and the
//! headless shell that replays gesture scripts against it.

mod app;
mod error;
mod event_handler;
mod script;
mod shortcuts;

pub use app::{AppConfig, EVENT_INTERVAL, Session, encode_png, load_panel, write_file};
pub use error::{AppError, AppResult};
pub use event_handler::{CanvasEngine, EngineEvent};
pub use script::{Command, DEFAULT_DRAG_STEPS, key_event, load_script, parse_key};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
