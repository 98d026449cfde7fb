mod canvas_surface;
mod utils;

use canvas_surface::CanvasSurface;
use system::{ClientEvent, ClientReducer, ServerEvent, Tool};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

/// Browser side of the whiteboard.
///
/// Frames go in and out as JSON strings; the page owns the websocket and just passes
/// them through.
#[wasm_bindgen]
pub struct WhiteboardClient {
    reducer: ClientReducer<CanvasSurface>,
}

#[wasm_bindgen]
impl WhiteboardClient {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<WhiteboardClient, JsValue> {
        utils::set_panic_hook();
        utils::init_logger();

        Ok(WhiteboardClient {
            reducer: ClientReducer::new(CanvasSurface::new(canvas)?),
        })
    }

    /// Applies a frame received from the server. Frames that don't decode are logged and dropped.
    pub fn handle_frame(&mut self, frame: &str) {
        match ServerEvent::decode(frame) {
            Ok(event) => self.reducer.apply(&event),
            Err(error) => log::warn!("Dropping malformed frame: {}", error),
        }
    }

    pub fn tool(&self) -> String {
        self.reducer.tool().to_string()
    }

    /// Accepts the toolbar names: `marker`, `eraser`, `size-N`, `esize-N` and shape names.
    pub fn set_tool(&mut self, tool: &str) {
        self.reducer.set_tool(Tool::from(tool));
    }

    pub fn set_color(&mut self, color: &str) {
        self.reducer.set_color(color);
    }

    pub fn set_brush_size(&mut self, brush_size: f64) {
        self.reducer.set_brush_size(brush_size);
    }

    pub fn is_dragging(&self) -> bool {
        self.reducer.is_dragging()
    }

    /// Returns the frames to send, in order.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<js_sys::Array, JsValue> {
        encode_all(self.reducer.pointer_down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<js_sys::Array, JsValue> {
        encode_all(self.reducer.pointer_move(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<js_sys::Array, JsValue> {
        encode_all(self.reducer.pointer_up(x, y))
    }

    pub fn undo(&self) -> Result<String, JsValue> {
        encode(&self.reducer.undo())
    }

    pub fn redo(&self) -> Result<String, JsValue> {
        encode(&self.reducer.redo())
    }

    pub fn clear(&mut self) -> Result<String, JsValue> {
        encode(&self.reducer.clear())
    }
}

fn encode(event: &ClientEvent) -> Result<String, JsValue> {
    event
        .encode()
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

fn encode_all(events: Vec<ClientEvent>) -> Result<js_sys::Array, JsValue> {
    let frames = js_sys::Array::new();
    for event in &events {
        frames.push(&JsValue::from_str(&encode(event)?));
    }
    Ok(frames)
}
