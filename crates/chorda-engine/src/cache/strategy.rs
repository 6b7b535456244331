use super::tracker::BufferTracker;
use super::Identify;

/// Placement and invalidation policy for a multi-buffer cache.
///
/// Each hook returns the indices of the trackers it invalidates; for
/// `place_new` the **first** entry is the tracker the shape joins. Default
/// update/remove policies touch only the shape's own tracker.
///
/// Strategies are selected at construction and may keep internal state
/// (e.g. a rotation counter). Panics raised here propagate to the owner.
pub trait ShardStrategy<S: Identify> {
    /// Chooses tracker(s) for a newly added shape.
    fn place_new(&mut self, shape: &S, trackers: &[BufferTracker<S, S::Id>]) -> Vec<usize>;

    /// Trackers to invalidate when a shape's data changes in place.
    fn on_update(
        &mut self,
        _shape: &S,
        own: usize,
        _trackers: &[BufferTracker<S, S::Id>],
    ) -> Vec<usize> {
        vec![own]
    }

    /// Trackers to invalidate when a shape is removed.
    fn on_remove(
        &mut self,
        _shape: &S,
        own: usize,
        _trackers: &[BufferTracker<S, S::Id>],
    ) -> Vec<usize> {
        vec![own]
    }
}

/// Default placement: each new shape joins whichever tracker currently holds
/// the fewest shapes, keeping shard populations within one of each other.
/// Ties resolve to the lowest index.
#[derive(Debug, Default, Copy, Clone)]
pub struct EvenSpread;

impl<S: Identify> ShardStrategy<S> for EvenSpread {
    fn place_new(&mut self, _shape: &S, trackers: &[BufferTracker<S, S::Id>]) -> Vec<usize> {
        if trackers.is_empty() {
            return Vec::new();
        }
        let mut best = 0;
        for (i, tracker) in trackers.iter().enumerate() {
            if tracker.len() < trackers[best].len() {
                best = i;
            }
        }
        vec![best]
    }
}
