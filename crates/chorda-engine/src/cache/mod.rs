//! Shape-collection caching.
//!
//! Responsibilities:
//! - decide when a shape collection must be regenerated (`ShapeBufferCache`,
//!   armed explicitly by its owner via `bust`)
//! - report a fresh collection every frame while an animation is playing
//!   (`AnimatedShapeCache`)
//! - split one logical population across independently-invalidatable buffer
//!   trackers with pluggable placement strategies (`MultiBufferShapeCache`),
//!   persisting shard state in an owner-held `ShardStore` so the cache object
//!   itself may be recreated every frame
//!
//! Collections are published as `Arc<Vec<S>>` snapshots. A published snapshot
//! is immutable forever; consumers detect change with `Arc::ptr_eq` and skip
//! GPU uploads for shards whose snapshot identity is unchanged.

mod animated;
mod buffer_cache;
mod multi;
mod storage;
mod store;
mod strategy;
mod tracker;

pub use animated::{AnimatedShapeBuilder, AnimatedShapeCache, Playback};
pub use buffer_cache::{ShapeBufferCache, ShapeBuilder};
pub use multi::{MultiBufferShapeCache, ShardAccess, ShardPopulator};
pub use storage::MultiBufferStorage;
pub use store::{ShardStore, StorageKey};
pub use strategy::{EvenSpread, ShardStrategy};
pub use tracker::BufferTracker;

/// Stable identity for cached shapes.
///
/// Caches key their lookup maps by this id; it must not change for the
/// lifetime of the shape inside a cache.
pub trait Identify {
    type Id: Clone + Eq + core::hash::Hash;

    fn id(&self) -> Self::Id;
}
