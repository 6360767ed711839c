//! Font registry, text measurement and glyph rasterization.

use crate::raster::Raster;
use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, GlyphId, Outline, OutlineCurve, PxScale, PxScaleFactor, PxScaleFont, ScaleFont, point};
use inkpanel_core::layers::{CanvasFont, EstimatedMetrics, TextMeasure};
use inkpanel_core::shapes::SerializableColor;
use kurbo::{Affine, BezPath, Point, Rect, Size};
use std::collections::HashMap;
use std::path::Path;

/// Loaded fonts keyed by lowercase family name.
///
/// Unknown families fall back to the first registered font; with no fonts at
/// all, measurement uses [`EstimatedMetrics`] and drawing is skipped.
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: HashMap<String, FontArc>,
    fallback: Option<String>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<&String> = self.fonts.keys().collect();
        families.sort();
        f.debug_struct("FontBook")
            .field("families", &families)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType font under `family`.
    pub fn register(&mut self, family: &str, bytes: Vec<u8>) -> RenderResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RendererError::Font(format!("{family}: {e}")))?;
        let key = family.to_lowercase();
        if self.fallback.is_none() {
            self.fallback = Some(key.clone());
        }
        log::info!("Registered font family {family}");
        self.fonts.insert(key, font);
        Ok(())
    }

    /// Read a font file from disk and register it.
    pub fn load_file(&mut self, family: &str, path: &Path) -> RenderResult<()> {
        let bytes = std::fs::read(path).map_err(|e| RendererError::Font(format!("{}: {e}", path.display())))?;
        self.register(family, bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Font for `family`, or the fallback font.
    pub fn font_for(&self, family: &str) -> Option<&FontArc> {
        self.fonts
            .get(&family.to_lowercase())
            .or_else(|| self.fallback.as_ref().and_then(|key| self.fonts.get(key)))
    }

    /// Lay out `text` and draw it into `target`, filling `rect` rotated by
    /// `rotation` about its center.
    ///
    /// Glyph outlines are filled straight into `target` through the layer
    /// transform, so the cost is bounded by the target, not by the box.
    pub fn draw_text(
        &self,
        target: &mut Raster,
        text: &str,
        font: &CanvasFont,
        color: SerializableColor,
        rect: Rect,
        rotation: f64,
    ) {
        let Some(face) = self.font_for(&font.family) else {
            log::debug!("No font loaded, skipping text {text:?}");
            return;
        };
        let Some(visible) = visible_box(rect, rotation, target.bounds()) else {
            log::trace!("Text {text:?} is off the surface");
            return;
        };

        let scaled = face.as_scaled(em_scale(face, font.size_px));
        let factor = scaled.scale_factor();
        let line_height = scaled.height() + scaled.line_gap();
        let mut path = BezPath::new();
        for (row, line) in text.split('\n').enumerate() {
            let baseline = scaled.ascent() + row as f32 * line_height;
            let mut caret = 0.0f32;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let id = face.glyph_id(ch);
                if let Some(prev) = prev {
                    caret += scaled.kern(prev, id);
                }
                if let Some(outline) = face.outline(id) {
                    let place = Placement {
                        factor,
                        origin: point(caret, baseline),
                    };
                    if place.bounds(&outline).overlaps(visible) {
                        place.append(&mut path, &outline);
                    }
                }
                caret += scaled.h_advance(id);
                prev = Some(id);
            }
        }

        target.fill_path(&path, color, box_transform(rect, rotation));
    }
}

/// Maps box space (origin at the box's top-left) onto the surface.
fn box_transform(rect: Rect, rotation: f64) -> Affine {
    Affine::rotate_about(rotation, rect.center()) * Affine::translate(rect.origin().to_vec2())
}

/// The part of a text box, in box space, that lands on `surface`.
///
/// `None` when the rotated box misses the surface entirely.
pub fn visible_box(rect: Rect, rotation: f64, surface: Rect) -> Option<Rect> {
    let transform = box_transform(rect, rotation);
    let local = Rect::from_origin_size(Point::ZERO, rect.size());
    if !transform.transform_rect_bbox(local).overlaps(surface) {
        return None;
    }
    let visible = transform.inverse().transform_rect_bbox(surface).intersect(local);
    (visible.width() > 0.0 && visible.height() > 0.0).then_some(visible)
}

/// Where one glyph outline sits in box space.
struct Placement {
    factor: PxScaleFactor,
    origin: ab_glyph::Point,
}

impl Placement {
    /// Font units (y up) to box pixels (y down).
    fn map(&self, p: ab_glyph::Point) -> Point {
        Point::new(
            (self.origin.x + p.x * self.factor.horizontal) as f64,
            (self.origin.y - p.y * self.factor.vertical) as f64,
        )
    }

    fn bounds(&self, outline: &Outline) -> Rect {
        Rect::from_points(self.map(outline.bounds.min), self.map(outline.bounds.max))
    }

    /// Append the outline's contours; a curve that does not start where the
    /// previous one ended opens a new contour.
    fn append(&self, path: &mut BezPath, outline: &Outline) {
        let mut last: Option<Point> = None;
        for curve in &outline.curves {
            let start = match curve {
                OutlineCurve::Line(p0, _) | OutlineCurve::Quad(p0, _, _) | OutlineCurve::Cubic(p0, _, _, _) => {
                    self.map(*p0)
                }
            };
            if last != Some(start) {
                if last.is_some() {
                    path.close_path();
                }
                path.move_to(start);
            }
            let end = match curve {
                OutlineCurve::Line(_, p1) => {
                    let p1 = self.map(*p1);
                    path.line_to(p1);
                    p1
                }
                OutlineCurve::Quad(_, c, p1) => {
                    let p1 = self.map(*p1);
                    path.quad_to(self.map(*c), p1);
                    p1
                }
                OutlineCurve::Cubic(_, c0, c1, p1) => {
                    let p1 = self.map(*p1);
                    path.curve_to(self.map(*c0), self.map(*c1), p1);
                    p1
                }
            };
            last = Some(end);
        }
        if last.is_some() {
            path.close_path();
        }
    }
}

/// Pixel scale for an em size in pixels (ab_glyph scales by ascent minus descent).
fn em_scale(font: &FontArc, size_px: f64) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size_px as f32 * font.height_unscaled() / units_per_em)
}

fn line_width(face: &FontArc, scaled: &PxScaleFont<&FontArc>, line: &str) -> f32 {
    let mut width = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for ch in line.chars() {
        let id = face.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, font: &CanvasFont) -> Size {
        let Some(face) = self.font_for(&font.family) else {
            return EstimatedMetrics.measure(text, font);
        };
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            log::warn!("Refusing to measure with font {font}");
            return Size::ZERO;
        }
        let scaled = face.as_scaled(em_scale(face, font.size_px));
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines
            .iter()
            .map(|line| line_width(face, &scaled, line))
            .fold(0.0f32, f32::max);
        let height = scaled.height() * lines.len() as f32 + scaled.line_gap() * (lines.len() as f32 - 1.0);
        Size::new(width as f64, height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_book_estimates() {
        let book = FontBook::new();
        let font = CanvasFont::new(20.0, "Arial");
        assert_eq!(book.measure("abc", &font), EstimatedMetrics.measure("abc", &font));
        assert!(book.font_for("Arial").is_none());
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut book = FontBook::new();
        assert!(matches!(book.register("Broken", vec![0, 1, 2, 3]), Err(RendererError::Font(_))));
        assert!(book.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let mut book = FontBook::new();
        let err = book.load_file("Nope", Path::new("/definitely/not/here.ttf"));
        assert!(matches!(err, Err(RendererError::Font(_))));
    }

    fn system_font() -> Option<FontBook> {
        let bytes = std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf").ok()?;
        let mut book = FontBook::new();
        book.register("DejaVu Sans", bytes).ok()?;
        Some(book)
    }

    #[test]
    fn test_visible_box_is_bounded_by_surface() {
        let surface = Rect::new(0.0, 0.0, 1200.0, 800.0);
        let huge = Rect::new(100.0, 100.0, 9000.0, 9000.0);
        let visible = visible_box(huge, 0.0, surface).unwrap();
        assert!((visible.width() - 1100.0).abs() < 1e-6 && (visible.height() - 700.0).abs() < 1e-6);

        let rotated = visible_box(huge, 0.7, surface).unwrap();
        let diagonal = 1200.0f64.hypot(800.0);
        assert!(rotated.width() <= diagonal && rotated.height() <= diagonal);

        let off = Rect::new(2000.0, 2000.0, 2100.0, 2100.0);
        assert!(visible_box(off, 0.0, surface).is_none());
    }

    #[test]
    fn test_huge_text_draws_into_target() {
        let Some(book) = system_font() else {
            return;
        };
        let mut raster = Raster::white(1200, 800).unwrap();
        book.draw_text(
            &mut raster,
            "H",
            &CanvasFont::new(2000.0, "DejaVu Sans"),
            SerializableColor::black(),
            Rect::new(0.0, 0.0, 4000.0, 3000.0),
            0.0,
        );
        assert_eq!((raster.width(), raster.height()), (1200, 800));
        // Inside the left stem of the H.
        assert!(raster.pixel(300, 600).unwrap()[0] < 50);
        assert_eq!(raster.pixel(1150, 50).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_offscreen_text_leaves_target_untouched() {
        let Some(book) = system_font() else {
            return;
        };
        let mut raster = Raster::white(100, 100).unwrap();
        let before = raster.clone();
        book.draw_text(
            &mut raster,
            "Hi",
            &CanvasFont::new(24.0, "DejaVu Sans"),
            SerializableColor::black(),
            Rect::new(500.0, 500.0, 540.0, 530.0),
            0.0,
        );
        assert_eq!(raster, before);
    }

    #[test]
    fn test_draw_without_font_is_noop() {
        let book = FontBook::new();
        let mut raster = Raster::white(50, 50).unwrap();
        let before = raster.clone();
        book.draw_text(
            &mut raster,
            "Hi",
            &CanvasFont::new(24.0, "Arial"),
            SerializableColor::black(),
            Rect::new(0.0, 0.0, 40.0, 30.0),
            0.0,
        );
        assert_eq!(raster, before);
    }
}
