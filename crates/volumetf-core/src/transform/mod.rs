//! Coordinate mapping between data, display and screen space.
//!
//! # Coordinate Spaces
//!
//! - **Data**: normalized intensity in `[0, 255]`, what the model stores
//! - **Display**: data passed through the active [`AxisScale`] (identity or log)
//! - **Screen**: pixels in the editor canvas, origin top-left, y grows downward
//!
//! Hit-testing, dragging and drawing all go through the same mapping, so
//! toggling the axis scale never moves a point in data space.

mod axis;
mod viewport;

pub use axis::AxisScale;
pub use viewport::{ScreenPoint, ViewWindow, Viewport};
