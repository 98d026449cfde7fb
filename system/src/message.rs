use crate::geometry::Point;
use crate::types::Snapshot;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    /// Kept verbatim so other clients see what the sender sent.
    Other(String),
}

impl From<String> for ShapeKind {
    fn from(name: String) -> Self {
        let known = match name.as_str() {
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            _ => None,
        };
        known.unwrap_or(Self::Other(name))
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rectangle => f.write_str("rectangle"),
            Self::Circle => f.write_str("circle"),
            Self::Triangle => f.write_str("triangle"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Drawing tool as named on the wire: `marker`, `eraser`, `size-N`, `esize-N` or a shape name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tool {
    Marker,
    Eraser,
    Sized(u32),
    EraserSized(u32),
    Shape(ShapeKind),
    Other(String),
}

pub const BACKGROUND_COLOR: &str = "white";
pub const DEFAULT_BRUSH_SIZE: f64 = 10.0;
pub const DEFAULT_COLOR: &str = "black";
const ERASER_WIDTH: f64 = 20.0;
const ERASER_PREFIX: &str = "esize";

impl Tool {
    /// Any `esize` name counts, even one whose size doesn't parse.
    pub fn is_eraser(&self) -> bool {
        match self {
            Self::Eraser | Self::EraserSized(_) => true,
            Self::Other(name) => name.starts_with(ERASER_PREFIX),
            _ => false,
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// Line width for a freehand stroke. `brush_size` applies to the plain marker only.
    pub fn stroke_width(&self, brush_size: f64) -> f64 {
        match self {
            Self::Marker => brush_size,
            Self::Eraser => ERASER_WIDTH,
            Self::Sized(n) => f64::from(*n) * 3.0,
            Self::EraserSized(n) => f64::from(*n) * 40.0,
            Self::Shape(_) | Self::Other(_) => brush_size,
        }
    }

    /// Color actually painted; erasers paint the background regardless of the nominal color.
    pub fn paint_color<'a>(&self, color: &'a str) -> &'a str {
        if self.is_eraser() {
            BACKGROUND_COLOR
        } else {
            color
        }
    }
}

impl Default for Tool {
    fn default() -> Self {
        Self::Marker
    }
}

impl From<String> for Tool {
    fn from(name: String) -> Self {
        if let Some(n) = sized(&name, "esize-") {
            return Self::EraserSized(n);
        }
        if let Some(n) = sized(&name, "size-") {
            return Self::Sized(n);
        }
        let known = match name.as_str() {
            "marker" => Some(Self::Marker),
            "eraser" => Some(Self::Eraser),
            _ => None,
        };
        known.unwrap_or_else(|| match ShapeKind::from(name) {
            ShapeKind::Other(name) => Self::Other(name),
            kind => Self::Shape(kind),
        })
    }
}

/// `N` of `<prefix>N`, only when `N` prints back exactly as written.
fn sized(name: &str, prefix: &str) -> Option<u32> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    u32::from_str(digits)
        .ok()
        .filter(|n| n.to_string() == digits)
}

impl From<&str> for Tool {
    fn from(name: &str) -> Self {
        Self::from(name.to_owned())
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        tool.to_string()
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker => f.write_str("marker"),
            Self::Eraser => f.write_str("eraser"),
            Self::Sized(n) => write!(f, "size-{}", n),
            Self::EraserSized(n) => write!(f, "esize-{}", n),
            Self::Shape(kind) => fmt::Display::fmt(kind, f),
            Self::Other(name) => f.write_str(name),
        }
    }
}

// Every payload field is optional. A field that is missing or has the wrong type reads as
// absent, and relayed payloads keep fields nobody here knows about.

/// Reads a field as `T`, or as absent when it holds something else.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DownPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Accepted for compatibility; strokes are recorded by the later `oncommit`.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub before: Option<Snapshot>,
}

impl DownPayload {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            before: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn point(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tool: Option<Tool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrawPayload {
    pub fn new(x: f64, y: f64, tool: Tool, color: impl Into<String>, size: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            tool: Some(tool),
            color: Some(color.into()),
            size: Some(size),
            extra: Map::new(),
        }
    }

    pub fn point(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub before: Option<Snapshot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShapePayload {
    pub fn new(
        shape: ShapeKind,
        start: Point,
        end: Point,
        color: impl Into<String>,
        before: Option<Snapshot>,
    ) -> Self {
        Self {
            shape: Some(shape),
            start_x: Some(start.x),
            start_y: Some(start.y),
            end_x: Some(end.x),
            end_y: Some(end.y),
            color: Some(color.into()),
            before,
            extra: Map::new(),
        }
    }

    pub fn start(&self) -> Option<Point> {
        Some(Point::new(self.start_x?, self.start_y?))
    }

    pub fn end(&self) -> Option<Point> {
        Some(Point::new(self.end_x?, self.end_y?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommitPayload {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub before: Option<Snapshot>,
}

const CLIENT_EVENTS: &[&str] = &[
    "down", "draw", "onshape", "onclear", "onundo", "onredo", "oncommit",
];

/// Client to server.
///
/// Decoding only fails on frames that aren't `{"event", "data"}` objects or name an unknown
/// event. A payload of the wrong shape decodes as an empty one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "down")]
    Down(DownPayload),
    #[serde(rename = "draw")]
    Draw(DrawPayload),
    #[serde(rename = "onshape")]
    Shape(ShapePayload),
    #[serde(rename = "onclear")]
    Clear(Option<Snapshot>),
    /// Whatever `data` carries is ignored.
    #[serde(rename = "onundo")]
    Undo,
    #[serde(rename = "onredo")]
    Redo,
    #[serde(rename = "oncommit")]
    Commit(CommitPayload),
}

#[derive(Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

fn payload<T: DeserializeOwned + Default>(event: &str, data: Value) -> T {
    T::deserialize(data).unwrap_or_else(|error| {
        log::debug!("Reading {} payload as empty: {}", event, error);
        T::default()
    })
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Frame { event, data } = Frame::deserialize(deserializer)?;
        Ok(match event.as_str() {
            "down" => Self::Down(payload(&event, data)),
            "draw" => Self::Draw(payload(&event, data)),
            "onshape" => Self::Shape(payload(&event, data)),
            "onclear" => Self::Clear(Snapshot::deserialize(data).ok()),
            "onundo" => Self::Undo,
            "onredo" => Self::Redo,
            "oncommit" => Self::Commit(payload(&event, data)),
            _ => return Err(de::Error::unknown_variant(&event, CLIENT_EVENTS)),
        })
    }
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Down(_) => "down",
            Self::Draw(_) => "draw",
            Self::Shape(_) => "onshape",
            Self::Clear(_) => "onclear",
            Self::Undo => "onundo",
            Self::Redo => "onredo",
            Self::Commit(_) => "oncommit",
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "ondown")]
    Down(Position),
    #[serde(rename = "ondraw")]
    Draw(DrawPayload),
    #[serde(rename = "onshape")]
    Shape(ShapePayload),
    #[serde(rename = "onclear")]
    Clear,
    /// `None` means the shared history is now empty.
    #[serde(rename = "onundo")]
    Undo(Option<Snapshot>),
    #[serde(rename = "onredo")]
    Redo(Snapshot),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Down(_) => "ondown",
            Self::Draw(_) => "ondraw",
            Self::Shape(_) => "onshape",
            Self::Clear => "onclear",
            Self::Undo(_) => "onundo",
            Self::Redo(_) => "onredo",
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
