//! Panel border overlay.

use crate::raster::{Raster, StrokeStyle};
use inkpanel_core::panel::Layout;
use inkpanel_core::shapes::SerializableColor;
use kurbo::{Affine, Shape};

/// Width of the cell border lines.
pub const GRID_LINE_WIDTH: f64 = 2.0;

/// Stroke the border of every layout cell onto `raster`.
pub fn draw_grid(raster: &mut Raster, layout: &Layout) {
    let size = raster.bounds().size();
    let style = StrokeStyle::solid(SerializableColor::black(), GRID_LINE_WIDTH);
    for cell in layout.cells_in(size) {
        raster.stroke_path(&cell.to_path(0.1), &style, Affine::IDENTITY);
    }
}
