use std::collections::HashMap;
use std::sync::Arc;

use super::strategy::ShardStrategy;
use super::tracker::BufferTracker;
use super::Identify;

/// Shard state for one multi-buffer population.
///
/// Invariant: every id present in `items`/`item_tracker` appears in exactly
/// one tracker's membership list. All mutating operations preserve this.
///
/// Storage is owned by a [`ShardStore`](super::ShardStore), never by the
/// cache object itself, so it survives the cache being reconstructed by its
/// owner across frames.
pub struct MultiBufferStorage<S: Identify> {
    trackers: Vec<BufferTracker<S, S::Id>>,
    items: HashMap<S::Id, S>,
    item_tracker: HashMap<S::Id, usize>,
}

impl<S: Identify + Clone> MultiBufferStorage<S> {
    pub fn new(num_buffers: usize) -> Self {
        Self {
            trackers: (0..num_buffers).map(|_| BufferTracker::new()).collect(),
            items: HashMap::new(),
            item_tracker: HashMap::new(),
        }
    }

    #[inline]
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Total shapes across all trackers.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn trackers(&self) -> &[BufferTracker<S, S::Id>] {
        &self.trackers
    }

    #[inline]
    pub fn contains_id(&self, id: &S::Id) -> bool {
        self.items.contains_key(id)
    }

    #[inline]
    pub fn contains_shape(&self, shape: &S) -> bool {
        self.contains_id(&shape.id())
    }

    #[inline]
    pub fn shape_by_id(&self, id: &S::Id) -> Option<&S> {
        self.items.get(id)
    }

    /// Ids of all tracked shapes, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &S::Id> {
        self.items.keys()
    }

    /// Each tracker's published snapshot, in tracker order.
    pub fn buffers(&self) -> Vec<Arc<Vec<S>>> {
        self.trackers.iter().map(|t| Arc::clone(t.shapes())).collect()
    }

    /// Places `shape` via the strategy, appends it to the primary tracker and
    /// records it in the lookup maps. Every tracker the strategy returned is
    /// marked dirty.
    ///
    /// With zero trackers this is a no-op. Adding an id that is already
    /// present is a configuration error: warned and ignored, preserving the
    /// one-tracker-per-shape invariant.
    pub fn add_shape(&mut self, shape: S, strategy: &mut dyn ShardStrategy<S>) {
        if self.trackers.is_empty() {
            return;
        }

        let id = shape.id();
        if self.item_tracker.contains_key(&id) {
            log::warn!("add_shape: id already tracked; ignoring duplicate add");
            return;
        }

        let invalidated = strategy.place_new(&shape, &self.trackers);
        let Some(&primary) = invalidated.first() else {
            return;
        };

        self.trackers[primary].push(id.clone());
        self.items.insert(id.clone(), shape);
        self.item_tracker.insert(id, primary);

        for t in invalidated {
            self.trackers[t].mark_dirty();
        }
    }

    /// Removes the shape with `id`, splicing it out of its tracker and both
    /// lookup maps. Returns the removed shape.
    ///
    /// Removing an unknown id is a caller precondition; the implementation
    /// returns `None` without touching anything.
    pub fn remove_shape(&mut self, id: &S::Id, strategy: &mut dyn ShardStrategy<S>) -> Option<S> {
        let own = *self.item_tracker.get(id)?;
        let shape = self.items.get(id)?;

        let invalidated = strategy.on_remove(shape, own, &self.trackers);

        self.trackers[own].splice(id);
        let removed = self.items.remove(id);
        self.item_tracker.remove(id);

        for t in invalidated {
            self.trackers[t].mark_dirty();
        }
        removed
    }

    /// Replaces the stored record for `shape` (same id) and marks the
    /// strategy's invalidated trackers dirty. The shape never moves between
    /// trackers; strategies that need relocation remove and re-add.
    ///
    /// Returns `false` when the id is unknown (caller precondition).
    pub fn update_shape(&mut self, shape: S, strategy: &mut dyn ShardStrategy<S>) -> bool {
        let id = shape.id();
        let Some(&own) = self.item_tracker.get(&id) else {
            return false;
        };

        let invalidated = strategy.on_update(&shape, own, &self.trackers);
        self.items.insert(id, shape);

        for t in invalidated {
            self.trackers[t].mark_dirty();
        }
        true
    }

    /// Republishes every dirty tracker's snapshot and clears its flag.
    ///
    /// Snapshots of clean trackers keep their identity, so downstream
    /// consumers see a changed array identity exactly for the shards that
    /// actually changed, and only those.
    pub fn process_dirty_buffers(&mut self) {
        let Self { trackers, items, .. } = self;
        for tracker in trackers.iter_mut() {
            if !tracker.is_dirty() {
                continue;
            }
            let snapshot = tracker
                .members()
                .iter()
                .map(|id| {
                    items
                        .get(id)
                        .expect("tracked id missing from item map")
                        .clone()
                })
                .collect();
            tracker.publish(snapshot);
        }
    }
}
