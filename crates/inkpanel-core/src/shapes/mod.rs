//! Shape path tracer.
//!
//! Every shape kind is traced analytically from a bounding box into a
//! `kurbo::BezPath`. The same path is used for freehand raster shapes and for
//! rendering persisted shape layers, so the two always look identical.

mod arrow;
mod heart;
mod polygon;
mod star;

pub use arrow::{ARM_WIDTH_RATIO, arrow_path, cross_path};
pub use heart::heart_path;
pub use polygon::{diamond_path, regular_polygon_path, triangle_path};
pub use star::{STAR_INNER_RATIO, STAR_SPIKES, star_path};

use kurbo::{BezPath, Ellipse, Point, Rect, Shape as _};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_8};
use std::fmt;
use std::str::FromStr;

/// Flattening tolerance used when converting curved primitives to paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    channels[i] = v * 17;
                }
                Some(Self::new(channels[0], channels[1], channels[2], 255))
            }
            6 => Some(Self::new(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?, 255)),
            8 => Some(Self::new(
                byte(&digits[0..2])?,
                byte(&digits[2..4])?,
                byte(&digits[4..6])?,
                byte(&digits[6..8])?,
            )),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`, with an alpha pair only when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color at full opacity.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The twelve traceable shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Star,
    Heart,
    Diamond,
    Hexagon,
    Pentagon,
    Arrow,
    Cross,
    Heptagon,
    Octagon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 12] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Diamond,
        ShapeKind::Hexagon,
        ShapeKind::Pentagon,
        ShapeKind::Arrow,
        ShapeKind::Cross,
        ShapeKind::Heptagon,
        ShapeKind::Octagon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Cross => "cross",
            ShapeKind::Heptagon => "heptagon",
            ShapeKind::Octagon => "octagon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shape kind: {s}"))
    }
}

/// Center and non-negative half extents of a box given by two corners in any order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    pub center: Point,
    pub half_w: f64,
    pub half_h: f64,
}

impl BoxFrame {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            center: Point::new((x0 + x1) / 2.0, (y0 + y1) / 2.0),
            half_w: ((x1 - x0) / 2.0).abs().max(0.0),
            half_h: ((y1 - y0) / 2.0).abs().max(0.0),
        }
    }

    /// Smaller of the two half extents.
    pub fn min_half(&self) -> f64 {
        self.half_w.min(self.half_h)
    }

    /// Point at `(dx, dy)` from the center.
    pub fn at(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.center.x + dx, self.center.y + dy)
    }
}

/// Closed polygon through `points`. An empty slice yields an empty path.
pub fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Trace `kind` spanning the box `(x0, y0)-(x1, y1)`.
///
/// The corners may be given in any order and may coincide; the result is then
/// a degenerate (but finite) path rather than a panic.
pub fn trace_path(kind: ShapeKind, x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    let frame = BoxFrame::new(x0, y0, x1, y1);
    match kind {
        ShapeKind::Rectangle => Rect::new(x0, y0, x1, y1).abs().to_path(PATH_TOLERANCE),
        ShapeKind::Circle => {
            Ellipse::new(frame.center, (frame.half_w, frame.half_h), 0.0).to_path(PATH_TOLERANCE)
        }
        ShapeKind::Triangle => triangle_path(&frame),
        ShapeKind::Star => star_path(&frame),
        ShapeKind::Heart => heart_path(&frame),
        ShapeKind::Diamond => diamond_path(&frame),
        ShapeKind::Hexagon => regular_polygon_path(&frame, 6, 0.0),
        ShapeKind::Pentagon => regular_polygon_path(&frame, 5, -FRAC_PI_2),
        ShapeKind::Arrow => arrow_path(&frame),
        ShapeKind::Cross => cross_path(&frame),
        ShapeKind::Heptagon => regular_polygon_path(&frame, 7, -FRAC_PI_2),
        ShapeKind::Octagon => regular_polygon_path(&frame, 8, FRAC_PI_8),
    }
}

/// Trace `kind` into `rect`.
pub fn trace_rect(kind: ShapeKind, rect: Rect) -> BezPath {
    trace_path(kind, rect.x0, rect.y0, rect.x1, rect.y1)
}
