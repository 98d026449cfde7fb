use crate::geometry::{Outline, Point};
use crate::types::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

/// Raster canvas the client draws on.
///
/// Implemented over an HTML canvas by the wasm binding and by a recorder in tests.
pub trait RasterSurface {
    fn clear(&mut self);

    /// Starts a new path at `at` without touching existing pixels.
    fn begin_path(&mut self, at: Point);

    /// Extends the current path to `to` and strokes it.
    fn line_to(&mut self, to: Point, style: &StrokeStyle);

    fn stroke_outline(&mut self, outline: &Outline, color: &str);

    /// Draws the decoded snapshot at the canvas origin, over whatever is there.
    fn draw_snapshot(&mut self, snapshot: &Snapshot);

    /// Encodes the current canvas contents.
    fn capture(&self) -> Snapshot;

    /// Keeps a copy of the current pixels for shape previews.
    fn hold_preview(&mut self);

    /// Puts back the pixels kept by the last [`RasterSurface::hold_preview`].
    fn restore_preview(&mut self);
}
