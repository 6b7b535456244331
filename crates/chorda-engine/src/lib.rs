//! Chorda engine crate.
//!
//! This crate owns the shape-cache and GPU-buffer-packing pipeline used to
//! render large, frequently-changing circular diagrams. Per frame, hosts run
//! generate → pack → draw: caches decide what actually changed, the packer
//! writes flat per-attribute vertex data, and the strip renderer consumes it.

pub mod cache;
pub mod coords;
pub mod logging;
pub mod pack;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
