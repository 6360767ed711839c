//! Mapping between the on-screen display rectangle and the fixed logical canvas.

use crate::layers::CanvasFont;
use crate::panel::CANVAS_SIZE;
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Where the canvas is shown on screen.
///
/// The logical canvas is always 1200x800; the display rectangle may be any
/// size, including zero while the surface is not laid out yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Top-left of the displayed canvas in screen coordinates.
    pub origin: Point,
    /// Displayed size in screen pixels.
    pub display: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            display: CANVAS_SIZE,
        }
    }
}

fn ratio(logical: f64, displayed: f64) -> f64 {
    let r = logical / displayed;
    if displayed > 0.0 && r.is_finite() && r > 0.0 {
        r
    } else {
        1.0
    }
}

impl Viewport {
    pub fn new(origin: Point, display: Size) -> Self {
        Self { origin, display }
    }

    /// Viewport from a display rectangle in screen space.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin(), rect.size())
    }

    /// Horizontal and vertical canvas pixels per screen pixel.
    ///
    /// A zero or non-finite display dimension yields 1 for that axis.
    pub fn scale_xy(&self) -> (f64, f64) {
        (
            ratio(CANVAS_SIZE.width, self.display.width),
            ratio(CANVAS_SIZE.height, self.display.height),
        )
    }

    /// Uniform scale used for fonts: falls back to 1 unless both axes are valid.
    pub fn scale(&self) -> f64 {
        let valid = self.display.width > 0.0
            && self.display.height > 0.0
            && self.display.width.is_finite()
            && self.display.height.is_finite();
        if valid {
            self.scale_xy().0
        } else {
            log::debug!("Display size {:?} not usable, falling back to scale 1", self.display);
            1.0
        }
    }

    /// Transform from canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        let (sx, sy) = self.scale_xy();
        Affine::translate(self.origin.to_vec2()) * Affine::scale_non_uniform(1.0 / sx, 1.0 / sy)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let (sx, sy) = self.scale_xy();
        Point::new((screen.x - self.origin.x) * sx, (screen.y - self.origin.y) * sy)
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Font string for a CSS font size at the current display scale.
    pub fn canvas_font(&self, family: &str, css_size: f64) -> CanvasFont {
        CanvasFont::new(css_size * self.scale(), family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_viewport() {
        let vp = Viewport::default();
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.screen_to_canvas(Point::new(10.0, 20.0)), Point::new(10.0, 20.0));
        assert_eq!(vp.canvas_font("Arial", 24.0).to_string(), "24px Arial");
    }

    #[test]
    fn test_zero_display_falls_back() {
        let vp = Viewport::new(Point::ZERO, Size::ZERO);
        assert_eq!(vp.scale(), 1.0);
        let font = vp.canvas_font("Arial", 24.0);
        assert_eq!(font.to_string(), "24px Arial");
        assert!(font.size_px.is_finite());
        let p = vp.screen_to_canvas(Point::new(5.0, 5.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn test_half_size_display() {
        let vp = Viewport::new(Point::new(100.0, 50.0), Size::new(600.0, 400.0));
        assert_eq!(vp.scale(), 2.0);
        let canvas = vp.screen_to_canvas(Point::new(400.0, 250.0));
        assert_eq!(canvas, Point::new(600.0, 400.0));
        let back = vp.canvas_to_screen(canvas);
        assert!((back.x - 400.0).abs() < 1e-9 && (back.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_display() {
        let vp = Viewport::new(Point::ZERO, Size::new(f64::NAN, 800.0));
        assert_eq!(vp.scale(), 1.0);
    }
}
