use std::sync::Arc;

use super::storage::MultiBufferStorage;
use super::store::{ShardStore, StorageKey};
use super::strategy::{EvenSpread, ShardStrategy};
use super::Identify;

/// Population logic for a [`MultiBufferShapeCache`].
///
/// `populate` is the busted-rebuild hook: it reconciles the target shape set
/// against what the shards already hold, calling add/remove/update on the
/// access handle. `init` runs exactly once, when the shard storage for a key
/// is first created.
pub trait ShardPopulator<S: Identify, C> {
    fn init(&mut self, _shards: &mut ShardAccess<'_, S>, _ctx: &mut C) {}

    fn populate(&mut self, shards: &mut ShardAccess<'_, S>, ctx: &mut C);
}

/// Mutable view over shard storage plus the cache's strategy, handed to
/// [`ShardPopulator`] hooks.
pub struct ShardAccess<'a, S: Identify> {
    storage: &'a mut MultiBufferStorage<S>,
    strategy: &'a mut dyn ShardStrategy<S>,
}

impl<'a, S: Identify + Clone> ShardAccess<'a, S> {
    pub fn add_shape(&mut self, shape: S) {
        self.storage.add_shape(shape, &mut *self.strategy);
    }

    pub fn remove_shape(&mut self, id: &S::Id) -> Option<S> {
        self.storage.remove_shape(id, &mut *self.strategy)
    }

    pub fn update_shape(&mut self, shape: S) -> bool {
        self.storage.update_shape(shape, &mut *self.strategy)
    }

    #[inline]
    pub fn contains_id(&self, id: &S::Id) -> bool {
        self.storage.contains_id(id)
    }

    #[inline]
    pub fn contains_shape(&self, shape: &S) -> bool {
        self.storage.contains_shape(shape)
    }

    #[inline]
    pub fn shape_by_id(&self, id: &S::Id) -> Option<&S> {
        self.storage.shape_by_id(id)
    }

    /// Ids currently tracked, collected for reconciliation sweeps.
    pub fn ids(&self) -> Vec<S::Id> {
        self.storage.ids().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn tracker_count(&self) -> usize {
        self.storage.tracker_count()
    }
}

/// Splits one logical shape population across `num_buffers` independently
/// invalidatable trackers, so a renderer with fixed per-buffer capacity never
/// rebuilds the whole population when only a few shapes change.
///
/// The cache object holds only policy (buffer count, strategy, populator) and
/// the bust flag; all shard state lives in the owner's [`ShardStore`] under a
/// [`StorageKey`], so owners may recreate the cache every frame.
///
/// Per-frame sequence inside [`generate`](Self::generate): resolve storage
/// (running `init` once on creation) → reconcile if busted →
/// process dirty buffers. Consumers must read [`buffers`](Self::buffers)
/// only after `generate` has run for the frame.
pub struct MultiBufferShapeCache<S: Identify, B> {
    num_buffers: usize,
    builder: B,
    strategy: Box<dyn ShardStrategy<S>>,
    busted: bool,
}

impl<S: Identify + Clone, B> MultiBufferShapeCache<S, B> {
    /// Creates a cache with the default [`EvenSpread`] placement.
    pub fn new(num_buffers: usize, builder: B) -> Self {
        Self::with_strategy(num_buffers, builder, Box::new(EvenSpread))
    }

    pub fn with_strategy(
        num_buffers: usize,
        builder: B,
        strategy: Box<dyn ShardStrategy<S>>,
    ) -> Self {
        Self {
            num_buffers,
            builder,
            strategy,
            busted: true,
        }
    }

    #[inline]
    pub fn num_buffers(&self) -> usize {
        self.num_buffers
    }

    #[inline]
    pub fn bust(&mut self) {
        self.busted = true;
    }

    #[inline]
    pub fn is_busted(&self) -> bool {
        self.busted
    }

    #[inline]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    #[inline]
    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    /// Runs the per-frame cache pass against the storage at `key`.
    pub fn generate<C>(&mut self, store: &mut ShardStore<S>, key: StorageKey, ctx: &mut C)
    where
        B: ShardPopulator<S, C>,
    {
        let created = store.ensure(key, self.num_buffers);
        let storage = store
            .get_mut(key)
            .expect("shard storage ensured for this key");

        let Self {
            builder,
            strategy,
            busted,
            ..
        } = self;

        if created {
            let mut shards = ShardAccess {
                storage: &mut *storage,
                strategy: strategy.as_mut(),
            };
            builder.init(&mut shards, ctx);
        }

        if *busted {
            let mut shards = ShardAccess {
                storage: &mut *storage,
                strategy: strategy.as_mut(),
            };
            builder.populate(&mut shards, ctx);
            *busted = false;
        }

        storage.process_dirty_buffers();
    }

    /// Each tracker's published snapshot, in tracker order. Empty when no
    /// storage exists yet for `key`.
    pub fn buffers(&self, store: &ShardStore<S>, key: StorageKey) -> Vec<Arc<Vec<S>>> {
        store.get(key).map(|s| s.buffers()).unwrap_or_default()
    }

    /// Adds a shape outside the populate pass (e.g. incremental streaming).
    ///
    /// Requires `generate` to have created the storage; warns otherwise.
    pub fn add_shape(&mut self, store: &mut ShardStore<S>, key: StorageKey, shape: S) {
        match store.get_mut(key) {
            Some(storage) => storage.add_shape(shape, self.strategy.as_mut()),
            None => log::warn!("add_shape: no shard storage for key {:?}", key),
        }
    }

    /// See [`MultiBufferStorage::remove_shape`].
    pub fn remove_shape(
        &mut self,
        store: &mut ShardStore<S>,
        key: StorageKey,
        id: &S::Id,
    ) -> Option<S> {
        store
            .get_mut(key)?
            .remove_shape(id, self.strategy.as_mut())
    }

    /// See [`MultiBufferStorage::update_shape`].
    pub fn update_shape(&mut self, store: &mut ShardStore<S>, key: StorageKey, shape: S) -> bool {
        match store.get_mut(key) {
            Some(storage) => storage.update_shape(shape, self.strategy.as_mut()),
            None => false,
        }
    }

    pub fn contains_id(&self, store: &ShardStore<S>, key: StorageKey, id: &S::Id) -> bool {
        store.get(key).is_some_and(|s| s.contains_id(id))
    }

    pub fn contains_shape(&self, store: &ShardStore<S>, key: StorageKey, shape: &S) -> bool {
        self.contains_id(store, key, &shape.id())
    }

    pub fn shape_by_id<'a>(
        &self,
        store: &'a ShardStore<S>,
        key: StorageKey,
        id: &S::Id,
    ) -> Option<&'a S> {
        store.get(key)?.shape_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BufferTracker;

    #[derive(Debug, Clone, PartialEq)]
    struct Dot {
        id: u64,
        value: f32,
    }

    impl Identify for Dot {
        type Id = u64;

        fn id(&self) -> u64 {
            self.id
        }
    }

    fn dot(id: u64) -> Dot {
        Dot { id, value: 0.0 }
    }

    /// Populator that mirrors a target list into the shards.
    struct Mirror {
        target: Vec<Dot>,
        inits: usize,
        populates: usize,
    }

    impl Mirror {
        fn of(target: Vec<Dot>) -> Self {
            Self { target, inits: 0, populates: 0 }
        }
    }

    impl ShardPopulator<Dot, ()> for Mirror {
        fn init(&mut self, _shards: &mut ShardAccess<'_, Dot>, _ctx: &mut ()) {
            self.inits += 1;
        }

        fn populate(&mut self, shards: &mut ShardAccess<'_, Dot>, _ctx: &mut ()) {
            self.populates += 1;
            for id in shards.ids() {
                if !self.target.iter().any(|d| d.id == id) {
                    shards.remove_shape(&id);
                }
            }
            for shape in &self.target {
                if shards.contains_id(&shape.id) {
                    shards.update_shape(shape.clone());
                } else {
                    shards.add_shape(shape.clone());
                }
            }
        }
    }

    const KEY: StorageKey = StorageKey::new(7);

    fn generate(
        cache: &mut MultiBufferShapeCache<Dot, Mirror>,
        store: &mut ShardStore<Dot>,
    ) {
        cache.generate(store, KEY, &mut ());
    }

    fn tracker_lens(store: &ShardStore<Dot>) -> Vec<usize> {
        store
            .get(KEY)
            .map(|s| s.trackers().iter().map(BufferTracker::len).collect())
            .unwrap_or_default()
    }

    // ── conservation ──────────────────────────────────────────────────────

    #[test]
    fn every_shape_lives_in_exactly_one_tracker() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(3, Mirror::of((0..10).map(dot).collect()));

        generate(&mut cache, &mut store);

        let storage = store.get(KEY).unwrap();
        let total: usize = storage.trackers().iter().map(BufferTracker::len).sum();
        assert_eq!(total, storage.len());
        assert_eq!(storage.len(), 10);

        for id in 0..10u64 {
            let holding: usize = storage
                .trackers()
                .iter()
                .filter(|t| t.shapes().iter().any(|d| d.id == id))
                .count();
            assert_eq!(holding, 1, "id {id} held by {holding} trackers");
        }
    }

    #[test]
    fn conservation_holds_across_removals() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(3, Mirror::of((0..9).map(dot).collect()));

        generate(&mut cache, &mut store);

        cache.builder_mut().target.retain(|d| d.id % 3 != 0);
        cache.bust();
        generate(&mut cache, &mut store);

        let storage = store.get(KEY).unwrap();
        let total: usize = storage.trackers().iter().map(BufferTracker::len).sum();
        assert_eq!(total, storage.len());
        assert_eq!(storage.len(), 6);
        assert!(!cache.contains_id(&store, KEY, &3));
        assert!(cache.contains_id(&store, KEY, &4));
    }

    // ── round-robin balance ───────────────────────────────────────────────

    #[test]
    fn even_spread_balances_within_one() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(4, Mirror::of((0..14).map(dot).collect()));

        generate(&mut cache, &mut store);

        let lens = tracker_lens(&store);
        let min = lens.iter().min().unwrap();
        let max = lens.iter().max().unwrap();
        assert!(max - min <= 1, "unbalanced trackers: {lens:?}");
    }

    // ── dirty-set precision ───────────────────────────────────────────────

    #[test]
    fn update_republishes_only_the_own_tracker() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(4, Mirror::of((0..8).map(dot).collect()));

        generate(&mut cache, &mut store);
        let before = cache.buffers(&store, KEY);

        cache.update_shape(&mut store, KEY, Dot { id: 5, value: 9.0 });
        store.get_mut(KEY).unwrap().process_dirty_buffers();
        let after = cache.buffers(&store, KEY);

        let own = before
            .iter()
            .position(|b| b.iter().any(|d| d.id == 5))
            .unwrap();

        for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
            if i == own {
                assert!(!Arc::ptr_eq(b, a), "own tracker kept its identity");
                assert!(a.iter().any(|d| d.id == 5 && d.value == 9.0));
            } else {
                assert!(Arc::ptr_eq(b, a), "unrelated tracker {i} was republished");
            }
        }
    }

    #[test]
    fn clean_generate_keeps_every_identity() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(3, Mirror::of((0..6).map(dot).collect()));

        generate(&mut cache, &mut store);
        let before = cache.buffers(&store, KEY);

        // Not busted: populate must not run, nothing gets dirty.
        generate(&mut cache, &mut store);
        let after = cache.buffers(&store, KEY);

        assert_eq!(cache.builder().populates, 1);
        for (b, a) in before.iter().zip(after.iter()) {
            assert!(Arc::ptr_eq(b, a));
        }
    }

    // ── storage lifetime ──────────────────────────────────────────────────

    #[test]
    fn storage_survives_cache_recreation() {
        let mut store = ShardStore::new();

        let mut cache =
            MultiBufferShapeCache::new(3, Mirror::of((0..6).map(dot).collect()));
        generate(&mut cache, &mut store);
        assert_eq!(cache.builder().inits, 1);
        let before = cache.buffers(&store, KEY);
        drop(cache);

        // The owner reconstructs the cache; the store keeps the shards.
        let mut cache =
            MultiBufferShapeCache::new(3, Mirror::of((0..6).map(dot).collect()));
        generate(&mut cache, &mut store);

        // init must not run again for existing storage.
        assert_eq!(cache.builder().inits, 0);
        let after = cache.buffers(&store, KEY);
        assert_eq!(store.get(KEY).unwrap().len(), 6);

        // Reconciliation updated shapes in place: republished, same membership.
        let total: usize = after.iter().map(|b| b.len()).sum();
        assert_eq!(total, 6);
        assert_eq!(before.len(), after.len());
    }

    #[test]
    fn destroy_forgets_the_population() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(2, Mirror::of((0..4).map(dot).collect()));

        generate(&mut cache, &mut store);
        assert!(store.destroy(KEY));
        assert!(!store.contains(KEY));

        // Next generate recreates storage and re-runs init.
        cache.bust();
        generate(&mut cache, &mut store);
        assert_eq!(cache.builder().inits, 2);
        assert_eq!(store.get(KEY).unwrap().len(), 4);
    }

    // ── edge conditions ───────────────────────────────────────────────────

    #[test]
    fn zero_buffers_is_a_no_op() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(0, Mirror::of((0..4).map(dot).collect()));

        generate(&mut cache, &mut store);

        let storage = store.get(KEY).unwrap();
        assert_eq!(storage.tracker_count(), 0);
        assert_eq!(storage.len(), 0);
        assert!(cache.buffers(&store, KEY).is_empty());
    }

    #[test]
    fn removing_unknown_id_is_a_silent_no_op() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(2, Mirror::of(vec![dot(1)]));

        generate(&mut cache, &mut store);
        assert!(cache.remove_shape(&mut store, KEY, &99).is_none());
        assert_eq!(store.get(KEY).unwrap().len(), 1);
    }

    #[test]
    fn lookups_answer_through_the_maps() {
        let mut store = ShardStore::new();
        let mut cache =
            MultiBufferShapeCache::new(2, Mirror::of(vec![dot(1), dot(2)]));

        generate(&mut cache, &mut store);

        assert!(cache.contains_id(&store, KEY, &1));
        assert!(cache.contains_shape(&store, KEY, &dot(2)));
        assert!(!cache.contains_id(&store, KEY, &3));
        assert_eq!(cache.shape_by_id(&store, KEY, &2).unwrap().id, 2);
    }

    // ── add/remove outside populate ───────────────────────────────────────

    #[test]
    fn incremental_add_marks_only_the_placed_tracker_dirty() {
        let mut store = ShardStore::new();
        let mut cache = MultiBufferShapeCache::new(3, Mirror::of(vec![]));

        generate(&mut cache, &mut store);
        let before = cache.buffers(&store, KEY);

        cache.add_shape(&mut store, KEY, dot(42));
        store.get_mut(KEY).unwrap().process_dirty_buffers();
        let after = cache.buffers(&store, KEY);

        let republished = before
            .iter()
            .zip(after.iter())
            .filter(|(b, a)| !Arc::ptr_eq(b, a))
            .count();
        assert_eq!(republished, 1);
        assert!(cache.contains_id(&store, KEY, &42));
    }
}
