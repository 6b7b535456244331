//! Coordinate and geometry types shared across the packing and render layers.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Diagram center at the origin
//! - +X right, +Y down
//!
//! Angular layout uses radians, measured clockwise from +X (consistent with
//! the +Y-down pixel space). Renderers convert to NDC in shaders using a
//! viewport uniform.

mod arc_span;
mod vec2;
mod viewport;

pub use arc_span::{polar, ArcSpan};
pub use vec2::Vec2;
pub use viewport::Viewport;
