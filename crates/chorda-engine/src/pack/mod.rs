//! Vertex-attribute packing.
//!
//! Responsibilities:
//! - describe per-vertex attributes (`AttributeDescriptor`)
//! - own flat `f32` storage per attribute, pre-filled with defaults
//!   (`AttributeBuffer`)
//! - write per-shape vertex data through stack-local cursors in a batched,
//!   allocation-free protocol (`PackBatch` + `AttrCursor`)
//!
//! Protocol:
//! - a buffer is allocated once with an ordered descriptor list; the same
//!   list (order and component counts) governs every subsequent write for the
//!   buffer's lifetime
//! - writes are bracketed by [`PackBatch::begin`] / [`PackBatch::finish`];
//!   the finish count gives the consumer its GPU draw range
//! - triangle-strip emitters duplicate their first and last vertex, so
//!   consecutive shapes stitch with zero-area triangles inside one draw call
//!
//! Oversized submissions are a configuration error (undersized buffer for the
//! data): they surface as `log::warn!` and truncate, never as an
//! out-of-bounds write or a panic.

mod attr;
mod batch;
mod cursor;

pub use attr::{AttributeBuffer, AttributeDescriptor, MAX_COMPONENTS};
pub use batch::PackBatch;
pub use cursor::AttrCursor;
