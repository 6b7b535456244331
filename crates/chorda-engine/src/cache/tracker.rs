use std::sync::Arc;

/// One shard of a multi-buffer population: a membership list plus a dirty
/// flag and the published snapshot consumers read.
///
/// The membership list is mutated in place by add/remove; the published
/// snapshot is only ever replaced wholesale when the dirty flag is processed,
/// so any previously returned `Arc` stays valid and immutable for as long as
/// a consumer holds it.
#[derive(Debug)]
pub struct BufferTracker<S, I> {
    members: Vec<I>,
    published: Arc<Vec<S>>,
    dirty: bool,
}

impl<S, I: PartialEq> BufferTracker<S, I> {
    pub(crate) fn new() -> Self {
        Self {
            members: Vec::new(),
            published: Arc::new(Vec::new()),
            dirty: false,
        }
    }

    /// Number of shapes currently tracked (the working membership, which may
    /// be ahead of the published snapshot until dirty processing runs).
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The published snapshot. Identity changes exactly when the tracker was
    /// dirty at the last processing pass.
    #[inline]
    pub fn shapes(&self) -> &Arc<Vec<S>> {
        &self.published
    }

    pub(crate) fn members(&self) -> &[I] {
        &self.members
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push(&mut self, id: I) {
        self.members.push(id);
    }

    /// Removes the first occurrence of `id` from the membership list,
    /// preserving the order of the remaining members.
    pub(crate) fn splice(&mut self, id: &I) -> bool {
        match self.members.iter().position(|m| m == id) {
            Some(at) => {
                self.members.remove(at);
                true
            }
            None => false,
        }
    }

    /// Replaces the published snapshot and clears the dirty flag.
    pub(crate) fn publish(&mut self, snapshot: Vec<S>) {
        self.published = Arc::new(snapshot);
        self.dirty = false;
    }
}
