pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;

mod client_reducer;
mod geometry;
mod history;
mod message;
#[cfg(any(test, feature = "testing"))]
mod recording_surface;
mod routing;
mod session_store;
mod surface;
mod types;

pub use client_reducer::*;
pub use geometry::*;
pub use history::*;
pub use message::*;
#[cfg(any(test, feature = "testing"))]
pub use recording_surface::*;
pub use routing::*;
pub use session_store::*;
pub use surface::*;
pub use types::*;
