//! The pixel surface every drawing operation targets.
//!
//! A [`Raster`] wraps a tiny-skia `Pixmap` (premultiplied RGBA) and exposes
//! unpremultiplied pixel access, pen and eraser strokes, path fill/stroke and
//! transformed raster blits.

use crate::path::{segment_path, to_skia_path, to_skia_transform};
use crate::renderer::RendererError;
use inkpanel_core::panel::BackgroundImage;
use inkpanel_core::shapes::SerializableColor;
use kurbo::{Affine, BezPath, Point, Rect};
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, FilterQuality, IntRect, IntSize, LineCap, LineJoin, Paint, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

/// Stroke style for [`Raster::stroke_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: SerializableColor,
    pub width: f64,
    /// Dash pattern (on, off, ...) in pixels; `None` for a solid line.
    pub dash: Option<Vec<f32>>,
    pub round: bool,
}

impl StrokeStyle {
    pub fn solid(color: SerializableColor, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            round: false,
        }
    }

    pub fn rounded(color: SerializableColor, width: f64) -> Self {
        Self {
            round: true,
            ..Self::solid(color, width)
        }
    }

    pub fn dashed(color: SerializableColor, width: f64, on: f32, off: f32) -> Self {
        Self {
            dash: Some(vec![on, off]),
            ..Self::solid(color, width)
        }
    }

    fn to_skia(&self) -> Stroke {
        let mut stroke = Stroke {
            width: self.width as f32,
            ..Default::default()
        };
        if self.round {
            stroke.line_cap = LineCap::Round;
            stroke.line_join = LineJoin::Round;
        }
        if let Some(dash) = &self.dash {
            stroke.dash = StrokeDash::new(dash.clone(), 0.0);
        }
        stroke
    }
}

fn paint(color: SerializableColor, blend_mode: BlendMode) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint.blend_mode = blend_mode;
    paint
}

/// A fixed-size RGBA pixel buffer.
#[derive(Clone, PartialEq)]
pub struct Raster {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Raster {
    /// Allocate a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RendererError::Surface(format!("cannot allocate {width}x{height} surface")))?;
        Ok(Self { pixmap })
    }

    /// Allocate a surface filled with opaque white.
    pub fn white(width: u32, height: u32) -> Result<Self, RendererError> {
        let mut raster = Self::new(width, height)?;
        raster.clear(SerializableColor::white());
        Ok(raster)
    }

    /// Build from unpremultiplied RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, RendererError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RendererError::InvalidBuffer {
                expected,
                actual: rgba.len(),
            });
        }
        let mut data = Vec::with_capacity(expected);
        for px in rgba.chunks_exact(4) {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| RendererError::Surface(format!("invalid size {width}x{height}")))?;
        let pixmap =
            Pixmap::from_vec(data, size).ok_or_else(|| RendererError::Surface("pixel buffer rejected".into()))?;
        Ok(Self { pixmap })
    }

    pub fn from_background(image: &BackgroundImage) -> Result<Self, RendererError> {
        Self::from_rgba(image.width, image.height, &image.rgba)
    }

    /// Unpremultiplied RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub fn to_background(&self) -> BackgroundImage {
        BackgroundImage {
            width: self.width(),
            height: self.height(),
            rgba: self.to_rgba(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f64, self.height() as f64)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Overwrite one pixel (no blending). Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let index = (y * self.width() + x) as usize;
        let c = ColorU8::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).premultiply();
        self.pixmap.pixels_mut()[index] = c;
    }

    /// Fill the whole surface with one color, replacing what was there.
    pub fn clear(&mut self, color: SerializableColor) {
        self.pixmap.fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    /// Copy another raster of the same size over this one.
    pub fn copy_from(&mut self, other: &Raster) {
        if other.width() == self.width() && other.height() == self.height() {
            self.pixmap.data_mut().copy_from_slice(other.pixmap.data());
        } else {
            log::warn!(
                "Ignoring copy from {}x{} into {}x{} surface",
                other.width(),
                other.height(),
                self.width(),
                self.height()
            );
        }
    }

    /// Paint an opaque round-capped segment (pen).
    pub fn pen_segment(&mut self, from: Point, to: Point, color: SerializableColor, width: f64) {
        if let Some(path) = segment_path(from, to) {
            let stroke = StrokeStyle::rounded(color, width).to_skia();
            self.pixmap
                .stroke_path(&path, &paint(color, BlendMode::SourceOver), &stroke, Transform::identity(), None);
        }
    }

    /// Clear pixels along a round-capped segment (eraser).
    ///
    /// The destination-out blend lives on this one paint, so later drawing is
    /// unaffected.
    pub fn erase_segment(&mut self, from: Point, to: Point, width: f64) {
        if let Some(path) = segment_path(from, to) {
            let stroke = StrokeStyle::rounded(SerializableColor::black(), width).to_skia();
            let eraser = paint(SerializableColor::black(), BlendMode::DestinationOut);
            self.pixmap.stroke_path(&path, &eraser, &stroke, Transform::identity(), None);
        }
    }

    /// Fill a path, transformed by `transform`. Degenerate paths draw nothing.
    pub fn fill_path(&mut self, path: &BezPath, color: SerializableColor, transform: Affine) {
        match to_skia_path(path) {
            Some(path) => self.pixmap.fill_path(
                &path,
                &paint(color, BlendMode::SourceOver),
                FillRule::Winding,
                to_skia_transform(transform),
                None,
            ),
            None => log::debug!("Skipping fill of degenerate path"),
        }
    }

    /// Stroke a path, transformed by `transform`. Degenerate paths draw nothing.
    pub fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle, transform: Affine) {
        if style.width <= 0.0 {
            return;
        }
        match to_skia_path(path) {
            Some(path) => self.pixmap.stroke_path(
                &path,
                &paint(style.color, BlendMode::SourceOver),
                &style.to_skia(),
                to_skia_transform(transform),
                None,
            ),
            None => log::debug!("Skipping stroke of degenerate path"),
        }
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: SerializableColor) {
        if let Some(r) = tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32) {
            self.pixmap
                .fill_rect(r, &paint(color, BlendMode::SourceOver), Transform::identity(), None);
        }
    }

    /// Composite `source` over this surface through `transform`, with bicubic filtering.
    pub fn draw_raster(&mut self, source: &Raster, transform: Affine) {
        let pixmap_paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.pixmap.as_ref(), &pixmap_paint, to_skia_transform(transform), None);
    }

    /// Copy out a pixel-aligned region; the rect is rounded outward and clipped.
    pub fn crop(&self, rect: Rect) -> Option<Raster> {
        let clipped = rect.round().intersect(self.bounds());
        if clipped.width() < 1.0 || clipped.height() < 1.0 {
            return None;
        }
        let int_rect = IntRect::from_xywh(
            clipped.x0 as i32,
            clipped.y0 as i32,
            clipped.width() as u32,
            clipped.height() as u32,
        )?;
        self.pixmap.clone_rect(int_rect).map(|pixmap| Raster { pixmap })
    }

    /// Replace the pixels under `rect` with opaque white.
    pub fn whiten(&mut self, rect: Rect) {
        let mut white = paint(SerializableColor::white(), BlendMode::Source);
        white.anti_alias = false;
        let r = rect.round();
        if let Some(r) = tiny_skia::Rect::from_ltrb(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32) {
            self.pixmap.fill_rect(r, &white, Transform::identity(), None);
        }
    }

    /// Iterate unpremultiplied pixels inside `rect` (clipped to the surface).
    pub fn pixels_in(&self, rect: Rect) -> impl Iterator<Item = [u8; 4]> + '_ {
        let clipped = rect.round().intersect(self.bounds());
        let (x0, y0) = (clipped.x0.max(0.0) as u32, clipped.y0.max(0.0) as u32);
        let (x1, y1) = (clipped.x1.max(0.0) as u32, clipped.y1.max(0.0) as u32);
        (y0..y1).flat_map(move |y| (x0..x1).filter_map(move |x| self.pixel(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_round_trip_opaque() {
        let rgba = vec![10, 20, 30, 255, 200, 100, 50, 255];
        let raster = Raster::from_rgba(2, 1, &rgba).unwrap();
        assert_eq!(raster.to_rgba(), rgba);
        assert!(Raster::from_rgba(2, 2, &rgba).is_err());
    }

    #[test]
    fn test_pen_then_erase() {
        let mut raster = Raster::new(40, 40).unwrap();
        let red = SerializableColor::new(255, 0, 0, 255);
        raster.pen_segment(Point::new(5.0, 20.0), Point::new(35.0, 20.0), red, 8.0);
        assert_eq!(raster.pixel(20, 20), Some([255, 0, 0, 255]));

        raster.erase_segment(Point::new(20.0, 0.0), Point::new(20.0, 40.0), 20.0);
        assert_eq!(raster.pixel(20, 20).map(|p| p[3]), Some(0));

        // Drawing after erasing composites normally again.
        raster.pen_segment(Point::new(20.0, 5.0), Point::new(20.0, 35.0), red, 4.0);
        assert_eq!(raster.pixel(20, 20), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_crop_and_whiten() {
        let mut raster = Raster::new(20, 20).unwrap();
        raster.clear(SerializableColor::new(0, 0, 255, 255));
        let crop = raster.crop(Rect::new(5.0, 5.0, 10.0, 15.0)).unwrap();
        assert_eq!((crop.width(), crop.height()), (5, 10));
        raster.whiten(Rect::new(5.0, 5.0, 10.0, 15.0));
        assert_eq!(raster.pixel(6, 6), Some([255, 255, 255, 255]));
        assert_eq!(raster.pixel(4, 6), Some([0, 0, 255, 255]));
        assert!(raster.crop(Rect::new(30.0, 30.0, 40.0, 40.0)).is_none());
    }

    #[test]
    fn test_set_pixel_out_of_range() {
        let mut raster = Raster::new(2, 2).unwrap();
        raster.set_pixel(5, 5, [1, 2, 3, 4]);
        assert_eq!(raster.pixel(5, 5), None);
    }

    #[test]
    fn test_draw_raster_translated() {
        let mut src = Raster::new(10, 10).unwrap();
        src.clear(SerializableColor::new(0, 255, 0, 255));
        let mut dst = Raster::white(30, 30).unwrap();
        dst.draw_raster(&src, Affine::translate((10.0, 10.0)));
        assert_eq!(dst.pixel(15, 15), Some([0, 255, 0, 255]));
        assert_eq!(dst.pixel(5, 5), Some([255, 255, 255, 255]));
    }
}
