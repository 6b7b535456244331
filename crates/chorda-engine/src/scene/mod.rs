//! Scene shape records.
//!
//! Responsibilities:
//! - define the logical shapes of a circular diagram (rings, chords, labels)
//! - give each shape a stable identity for the caches
//! - emit triangle-strip vertices through pack cursors, including the
//!   degenerate stitch vertices that join consecutive shapes in one draw call
//!
//! Shape records are plain data: caches treat them opaquely and only the
//! emitters read their fields.

pub mod shapes;

pub use shapes::{Chord, Label, Ring};
