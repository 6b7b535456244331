//! GPU rendering subsystem.
//!
//! The strip renderer consumes packed attribute buffers produced by `pack`
//! and issues wgpu draw calls. It owns its GPU resources (pipeline, vertex
//! buffers, viewport uniform).
//!
//! Convention:
//! - CPU geometry is in logical pixels, diagram center at the origin.
//! - Vertex shader converts to NDC using a viewport uniform; the origin maps
//!   to the viewport center.

mod common;
mod ctx;
mod strip;

pub use ctx::{RenderCtx, RenderTarget};
pub use strip::StripRenderer;
