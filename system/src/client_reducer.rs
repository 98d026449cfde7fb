use crate::geometry::{Outline, Point};
use crate::message::*;
use crate::surface::{RasterSurface, StrokeStyle};
use crate::types::Snapshot;

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Stroke {
        before: Snapshot,
    },
    Shape {
        kind: ShapeKind,
        start: Point,
        before: Snapshot,
    },
}

/// Client side of the whiteboard.
///
/// Applies canonical server events to the local surface, and turns local pointer input into
/// the events to send. The in-progress gesture is local only; the canvas itself converges
/// through the server's broadcasts.
pub struct ClientReducer<S: RasterSurface> {
    surface: S,
    gesture: Gesture,
    tool: Tool,
    color: String,
    brush_size: f64,
}

impl<S: RasterSurface> ClientReducer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            gesture: Gesture::Idle,
            tool: Tool::Marker,
            color: DEFAULT_COLOR.into(),
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn set_brush_size(&mut self, brush_size: f64) {
        self.brush_size = brush_size;
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Applies an event broadcast by the server.
    pub fn apply(&mut self, event: &ServerEvent) {
        log::trace!("Apply {}", event.name());
        match event {
            ServerEvent::Down(position) => match position.point() {
                Some(at) => self.surface.begin_path(at),
                None => log::debug!("Skipping stroke start without position"),
            },
            ServerEvent::Draw(draw) => self.draw_segment(draw),
            ServerEvent::Shape(shape) => match (&shape.shape, shape.start(), shape.end()) {
                (Some(kind), Some(start), Some(end)) => {
                    let color = shape.color.as_deref().unwrap_or(DEFAULT_COLOR);
                    self.stroke_shape(kind, start, end, color)
                }
                _ => log::debug!("Skipping incomplete shape"),
            },
            ServerEvent::Undo(snapshot) => self.replace_canvas(snapshot.as_ref()),
            ServerEvent::Redo(snapshot) => self.replace_canvas(Some(snapshot)),
            ServerEvent::Clear => self.surface.clear(),
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<ClientEvent> {
        let at = Point::new(x, y);
        let before = self.surface.capture();
        self.surface.begin_path(at);
        self.surface.hold_preview();
        self.gesture = match &self.tool {
            Tool::Shape(kind) => Gesture::Shape {
                kind: kind.clone(),
                start: at,
                before,
            },
            _ => Gesture::Stroke { before },
        };
        // the pre-stroke snapshot goes out with the commit instead
        vec![ClientEvent::Down(DownPayload::at(x, y))]
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<ClientEvent> {
        match &self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Shape { kind, start, .. } => {
                let (kind, start) = (kind.clone(), *start);
                let color = self.color.clone();
                self.surface.restore_preview();
                self.stroke_shape(&kind, start, Point::new(x, y), &color);
                Vec::new()
            }
            Gesture::Stroke { .. } => {
                let draw = DrawPayload::new(
                    x,
                    y,
                    self.tool.clone(),
                    self.color.clone(),
                    self.tool.stroke_width(self.brush_size),
                );
                self.draw_segment(&draw);
                vec![ClientEvent::Draw(draw)]
            }
        }
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Vec<ClientEvent> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Vec::new(),
            Gesture::Shape {
                kind,
                start,
                before,
            } => {
                let end = Point::new(x, y);
                let color = self.color.clone();
                self.surface.restore_preview();
                self.stroke_shape(&kind, start, end, &color);
                vec![
                    ClientEvent::Shape(ShapePayload::new(
                        kind,
                        start,
                        end,
                        color,
                        Some(before.clone()),
                    )),
                    ClientEvent::Commit(CommitPayload {
                        before: Some(before),
                    }),
                ]
            }
            Gesture::Stroke { before } => vec![ClientEvent::Commit(CommitPayload {
                before: Some(before),
            })],
        }
    }

    /// Undo is only requested; the canvas changes when the server's broadcast comes back.
    pub fn undo(&self) -> ClientEvent {
        ClientEvent::Undo
    }

    pub fn redo(&self) -> ClientEvent {
        ClientEvent::Redo
    }

    pub fn clear(&mut self) -> ClientEvent {
        let before = self.surface.capture();
        self.surface.clear();
        ClientEvent::Clear(Some(before))
    }

    /// Fields the sender left out fall back to the defaults of a fresh client.
    fn draw_segment(&mut self, draw: &DrawPayload) {
        let to = match draw.point() {
            Some(to) => to,
            None => {
                log::debug!("Skipping segment without position");
                return;
            }
        };
        let tool = draw.tool.clone().unwrap_or_default();
        let color = draw.color.as_deref().unwrap_or(DEFAULT_COLOR);
        let style = StrokeStyle {
            color: tool.paint_color(color).to_owned(),
            width: draw.size.unwrap_or(DEFAULT_BRUSH_SIZE),
        };
        self.surface.line_to(to, &style);
    }

    fn stroke_shape(&mut self, kind: &ShapeKind, start: Point, end: Point, color: &str) {
        match Outline::from_drag(kind, start, end) {
            Some(outline) => self.surface.stroke_outline(&outline, color),
            None => log::debug!("Skipping unknown shape {}", kind),
        }
    }

    fn replace_canvas(&mut self, snapshot: Option<&Snapshot>) {
        self.surface.clear();
        if let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) {
            self.surface.draw_snapshot(snapshot);
        }
    }
}
