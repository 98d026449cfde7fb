use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;

use system::{Outline, Point, RasterSurface, Snapshot, StrokeStyle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

/// [`RasterSurface`] over an HTML canvas 2D context. Snapshots are PNG data URLs.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    preview: Option<ImageData>,
    // Bumped by every clear, so a snapshot still loading never paints over a newer canvas.
    generation: Rc<Cell<u64>>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        context.set_line_cap("round");
        context.set_line_join("round");
        Ok(Self {
            canvas,
            context,
            preview: None,
            generation: Rc::new(Cell::new(0)),
        })
    }

    fn width(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn height(&self) -> f64 {
        self.canvas.height() as f64
    }

    fn trace_outline(&self, outline: &Outline) -> Result<(), JsValue> {
        match outline {
            Outline::Rect { origin, size } => {
                self.context
                    .stroke_rect(origin.x, origin.y, size.width, size.height);
            }
            Outline::Circle { center, radius } => {
                self.context.begin_path();
                self.context.arc(center.x, center.y, *radius, 0.0, PI * 2.0)?;
                self.context.stroke();
            }
            Outline::Polygon(points) => {
                if let Some((first, rest)) = points.split_first() {
                    self.context.begin_path();
                    self.context.move_to(first.x, first.y);
                    for point in rest {
                        self.context.line_to(point.x, point.y);
                    }
                    self.context.close_path();
                    self.context.stroke();
                }
            }
        }
        Ok(())
    }

    fn load_snapshot(&self, snapshot: &Snapshot) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        let context = self.context.clone();
        let loaded = image.clone();
        let generation = Rc::clone(&self.generation);
        let expected = generation.get();

        let onload = Closure::once_into_js(move || {
            if generation.get() != expected {
                log::debug!("Skipping stale snapshot");
                return;
            }
            if let Err(error) = context.draw_image_with_html_image_element(&loaded, 0.0, 0.0) {
                log::warn!("Failed to draw snapshot: {:?}", error);
            }
        });
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_src(snapshot.as_str());
        Ok(())
    }
}

impl RasterSurface for CanvasSurface {
    fn clear(&mut self) {
        self.generation.set(self.generation.get() + 1);
        self.context.clear_rect(0.0, 0.0, self.width(), self.height());
    }

    fn begin_path(&mut self, at: Point) {
        self.context.begin_path();
        self.context.move_to(at.x, at.y);
    }

    fn line_to(&mut self, to: Point, style: &StrokeStyle) {
        self.context.set_stroke_style_str(&style.color);
        self.context.set_line_width(style.width);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
    }

    fn stroke_outline(&mut self, outline: &Outline, color: &str) {
        self.context.set_stroke_style_str(color);
        if let Err(error) = self.trace_outline(outline) {
            log::warn!("Failed to stroke {:?}: {:?}", outline, error);
        }
    }

    fn draw_snapshot(&mut self, snapshot: &Snapshot) {
        if let Err(error) = self.load_snapshot(snapshot) {
            log::warn!("Failed to load snapshot {:?}: {:?}", snapshot, error);
        }
    }

    fn capture(&self) -> Snapshot {
        match self.canvas.to_data_url() {
            Ok(url) => Snapshot::new(url),
            Err(error) => {
                // An empty snapshot is never recorded, so this gesture just can't be undone.
                log::error!("Failed to capture canvas: {:?}", error);
                Snapshot::new("")
            }
        }
    }

    fn hold_preview(&mut self) {
        match self
            .context
            .get_image_data(0.0, 0.0, self.width(), self.height())
        {
            Ok(pixels) => self.preview = Some(pixels),
            Err(error) => {
                log::warn!("Failed to keep preview pixels: {:?}", error);
                self.preview = None;
            }
        }
    }

    fn restore_preview(&mut self) {
        if let Some(pixels) = &self.preview {
            if let Err(error) = self.context.put_image_data(pixels, 0.0, 0.0) {
                log::warn!("Failed to restore preview pixels: {:?}", error);
            }
        }
    }
}
