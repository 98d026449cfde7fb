use crate::geometry::{Outline, Point};
use crate::surface::{RasterSurface, StrokeStyle};
use crate::types::Snapshot;

const SNAPSHOT_PREFIX: &str = "recording:";

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Clear,
    BeginPath(Point),
    LineTo(Point, StrokeStyle),
    StrokeOutline(Outline, String),
    DrawSnapshot(Snapshot),
    HoldPreview,
    RestorePreview,
}

/// Headless surface that logs every call and keeps a textual model of the visible pixels.
///
/// Its snapshots encode that model, so they survive a trip through the server and can be
/// drawn by another recording surface.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    visible: Vec<String>,
    held: Vec<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// What is currently painted, oldest first.
    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn is_blank(&self) -> bool {
        self.visible.is_empty()
    }
}

impl RasterSurface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Clear);
        self.visible.clear();
    }

    fn begin_path(&mut self, at: Point) {
        self.ops.push(SurfaceOp::BeginPath(at));
    }

    fn line_to(&mut self, to: Point, style: &StrokeStyle) {
        self.ops.push(SurfaceOp::LineTo(to, style.clone()));
        self.visible.push(format!(
            "line {},{} {} {}",
            to.x, to.y, style.color, style.width
        ));
    }

    fn stroke_outline(&mut self, outline: &Outline, color: &str) {
        self.ops
            .push(SurfaceOp::StrokeOutline(outline.clone(), color.to_owned()));
        self.visible.push(format!("{:?} {}", outline, color));
    }

    fn draw_snapshot(&mut self, snapshot: &Snapshot) {
        self.ops.push(SurfaceOp::DrawSnapshot(snapshot.clone()));
        match snapshot.as_str().strip_prefix(SNAPSHOT_PREFIX) {
            Some("") => {}
            Some(encoded) => self
                .visible
                .extend(encoded.split('\n').map(ToOwned::to_owned)),
            None => self.visible.push(format!("image {}", snapshot.as_str())),
        }
    }

    fn capture(&self) -> Snapshot {
        Snapshot::new(format!("{}{}", SNAPSHOT_PREFIX, self.visible.join("\n")))
    }

    fn hold_preview(&mut self) {
        self.ops.push(SurfaceOp::HoldPreview);
        self.held = self.visible.clone();
    }

    fn restore_preview(&mut self) {
        self.ops.push(SurfaceOp::RestorePreview);
        self.visible = self.held.clone();
    }
}
