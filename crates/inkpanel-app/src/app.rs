//! Headless application shell: configuration, undo history and script replay.

use crate::error::{AppError, AppResult};
use crate::event_handler::{CanvasEngine, EngineEvent};
use crate::script::{Command, key_event};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use inkpanel_core::history::{MAX_UNDO_HISTORY, UndoStack};
use inkpanel_core::input::{KeyEvent, PointerEvent};
use inkpanel_core::layers::{ShapeLayer, TextLayer};
use inkpanel_core::panel::{CANVAS_HEIGHT, CANVAS_WIDTH, Panel};
use inkpanel_core::tools::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, ToolSettings};
use inkpanel_core::viewport::Viewport;
use inkpanel_core::{BackgroundImage, LayerStack};
use inkpanel_render::{FontBook, Raster, RendererError, decode_image};
use kurbo::{Affine, Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Simulated time between two replayed pointer events.
pub const EVENT_INTERVAL: Duration = Duration::from_millis(16);

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Size of the display the script's screen coordinates refer to.
    pub display_width: f64,
    pub display_height: f64,
    /// Font files to register, by family name.
    pub fonts: BTreeMap<String, PathBuf>,
    pub default_font: String,
    pub default_font_size: f64,
    pub max_undo: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display_width: CANVAS_WIDTH as f64,
            display_height: CANVAS_HEIGHT as f64,
            fonts: BTreeMap::new(),
            default_font: DEFAULT_FONT_FAMILY.to_string(),
            default_font_size: DEFAULT_FONT_SIZE,
            max_undo: MAX_UNDO_HISTORY,
        }
    }
}

impl AppConfig {
    /// Load a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| AppError::json(path, e))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(Point::ZERO, Size::new(self.display_width, self.display_height))
    }

    /// Register every configured font.
    pub fn font_book(&self) -> AppResult<FontBook> {
        let mut fonts = FontBook::new();
        for (family, path) in &self.fonts {
            fonts.load_file(family, path)?;
        }
        if fonts.is_empty() {
            log::warn!("No fonts configured, text will be measured but not drawn");
        }
        Ok(fonts)
    }
}

/// Both layer arrays as they were before an undoable change.
type LayerSnapshot = (Vec<ShapeLayer>, Vec<TextLayer>);

/// An engine bound to a panel, with undo history and a replay clock.
pub struct Session {
    engine: CanvasEngine,
    panel: Panel,
    history: UndoStack<LayerSnapshot>,
    start: Instant,
    elapsed: Duration,
}

impl Session {
    pub fn new(panel: Panel, config: &AppConfig) -> AppResult<Self> {
        let mut engine = CanvasEngine::new(&panel, config.font_book()?, config.viewport())?;
        engine.set_settings(ToolSettings {
            font_family: config.default_font.clone(),
            font_size: config.default_font_size,
            ..ToolSettings::default()
        });
        engine.drain_events();
        log::info!("Opened panel {} ({})", panel.name, panel.id);
        Ok(Self {
            engine,
            panel,
            history: UndoStack::new(config.max_undo),
            start: Instant::now(),
            elapsed: Duration::ZERO,
        })
    }

    pub fn engine(&self) -> &CanvasEngine {
        &self.engine
    }

    /// The panel with every change the engine emitted so far.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.elapsed += EVENT_INTERVAL;
        let now = self.now();
        self.engine.pointer_at(event, now);
    }

    /// Replay a whole script, then finish pending gestures and text.
    pub fn run(&mut self, commands: &[Command]) -> AppResult<()> {
        for command in commands {
            self.apply(command)?;
        }
        self.engine.flush();
        self.sync();
        Ok(())
    }

    /// Apply one script command.
    pub fn apply(&mut self, command: &Command) -> AppResult<()> {
        log::debug!("Command: {command:?}");
        match command {
            Command::Tool { tool } => self.engine.set_tool(*tool),
            Command::Settings { settings } => self.engine.set_settings(settings.clone()),
            Command::Down { x, y } => self.pointer(PointerEvent::Down { position: Point::new(*x, *y) }),
            Command::Move { x, y } => self.pointer(PointerEvent::Move { position: Point::new(*x, *y) }),
            Command::Up { x, y } => self.pointer(PointerEvent::Up { position: Point::new(*x, *y) }),
            Command::Leave { x, y } => self.pointer(PointerEvent::Leave { position: Point::new(*x, *y) }),
            Command::Click { x, y } => {
                let position = Point::new(*x, *y);
                self.pointer(PointerEvent::Down { position });
                self.pointer(PointerEvent::Up { position });
            }
            Command::Drag { from, to, steps } => {
                self.pointer(PointerEvent::Down {
                    position: Point::new(from[0], from[1]),
                });
                let path = Command::drag_path(*from, *to, *steps);
                for position in &path {
                    self.pointer(PointerEvent::Move { position: *position });
                }
                let end = path.last().copied().unwrap_or(Point::new(to[0], to[1]));
                self.pointer(PointerEvent::Up { position: end });
            }
            Command::Key { key, ctrl, shift } => {
                let event = key_event(key, *ctrl, *shift)?;
                self.key(event);
            }
            Command::Type { text } => {
                if !self.engine.type_text(text) {
                    log::warn!("No text entry open, dropping {text:?}");
                }
            }
            Command::Wait { ms } => self.elapsed += Duration::from_millis(*ms),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
        }
        self.sync();
        Ok(())
    }

    /// Route a key press: undo/redo are handled here unless text is being typed.
    pub fn key(&mut self, event: KeyEvent) -> bool {
        if !self.engine.is_text_editing() {
            match ShortcutRegistry::lookup(&event) {
                Some(ShortcutAction::Undo) => return self.undo(),
                Some(ShortcutAction::Redo) => return self.redo(),
                _ => {}
            }
        }
        let handled = self.engine.key(event.clone());
        if !handled {
            log::debug!("Unhandled key {event:?}");
        }
        self.sync();
        handled
    }

    fn current_layers(&self) -> LayerSnapshot {
        (self.panel.shape_layers.to_vec(), self.panel.text_layers.to_vec())
    }

    fn restore(&mut self, (shapes, texts): LayerSnapshot) {
        self.engine.set_shape_layers(shapes.clone());
        self.engine.set_text_layers(texts.clone());
        self.engine.drain_events();
        self.panel.shape_layers = LayerStack::new(shapes);
        self.panel.text_layers = LayerStack::new(texts);
    }

    pub fn undo(&mut self) -> bool {
        let mut current = self.current_layers();
        if !self.history.undo(&mut current) {
            log::info!("Nothing to undo");
            return false;
        }
        log::info!("Undo");
        self.restore(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let mut current = self.current_layers();
        if !self.history.redo(&mut current) {
            log::info!("Nothing to redo");
            return false;
        }
        log::info!("Redo");
        self.restore(current);
        true
    }

    /// Fold the engine's events into the panel and the undo history.
    fn sync(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::BackgroundChanged(image) => {
                    log::info!("Background changed");
                    self.panel.background_image = Some(image);
                }
                EngineEvent::ShapeLayersChanged(change) => {
                    if let Some(previous) = change.history.into_previous() {
                        self.history.push((previous, self.panel.text_layers.to_vec()));
                    }
                    log::info!("Shape layers: {}", change.layers.len());
                    self.panel.shape_layers = LayerStack::new(change.layers);
                }
                EngineEvent::TextLayersChanged(change) => {
                    if let Some(previous) = change.history.into_previous() {
                        self.history.push((self.panel.shape_layers.to_vec(), previous));
                    }
                    log::info!("Text layers: {}", change.layers.len());
                    self.panel.text_layers = LayerStack::new(change.layers);
                }
                EngineEvent::TextEditingActive(active) => log::info!("Text editing: {active}"),
                EngineEvent::ControlsMoved(controls) => log::debug!("Controls: {controls:?}"),
            }
        }
    }

    /// Replace the background with a decoded image, stretched over the canvas.
    pub fn import_background(&mut self, bytes: &[u8]) -> AppResult<()> {
        let decoded = decode_image(bytes)?;
        let mut canvas = Raster::white(CANVAS_WIDTH, CANVAS_HEIGHT)?;
        let sx = CANVAS_WIDTH as f64 / decoded.width() as f64;
        let sy = CANVAS_HEIGHT as f64 / decoded.height() as f64;
        canvas.draw_raster(&decoded, Affine::scale_non_uniform(sx, sy));
        let image = canvas.to_background();
        self.engine.set_background(Some(&image))?;
        self.engine.drain_events();
        self.panel.background_image = Some(image);
        Ok(())
    }

    /// PNG of the visible frame.
    pub fn frame_png(&self) -> AppResult<Vec<u8>> {
        let frame = self.engine.frame();
        encode_png(&frame.to_rgba(), frame.width(), frame.height())
    }

    /// PNG of the background with the grid, without layers.
    pub fn background_png(&mut self) -> AppResult<Vec<u8>> {
        let snapshot: BackgroundImage = self.engine.background_snapshot();
        encode_png(&snapshot.rgba, snapshot.width, snapshot.height)
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> AppResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| RendererError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Read a panel file.
pub fn load_panel(path: &Path) -> AppResult<Panel> {
    let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(Panel::from_json(&json)?)
}

/// Write bytes to `path`, logging the size.
pub fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    std::fs::write(path, bytes).map_err(|e| AppError::io(path, e))?;
    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
