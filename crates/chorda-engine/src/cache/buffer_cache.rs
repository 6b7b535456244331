use std::sync::Arc;

/// Computes a fresh shape collection when the owning cache is busted.
///
/// `C` is the caller-defined frame context (data sources, layout parameters,
/// selection state). Panics raised here propagate to the owner unmodified;
/// the cache adds no retry or suppression.
pub trait ShapeBuilder<C> {
    type Shape;

    fn build(&mut self, ctx: &mut C) -> Vec<Self::Shape>;
}

/// Single-collection shape cache.
///
/// The cache starts busted, so the first `generate` always builds. After
/// that, `generate` is a no-op until the owner re-arms it with
/// [`bust`](Self::bust); the cache performs no change detection of its own.
///
/// The published snapshot keeps its `Arc` identity across unchanged frames;
/// that pointer stability is what lets downstream consumers skip GPU-buffer
/// updates.
#[derive(Debug)]
pub struct ShapeBufferCache<S, B> {
    builder: B,
    busted: bool,
    shapes: Arc<Vec<S>>,
}

impl<S, B> ShapeBufferCache<S, B> {
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            busted: true,
            shapes: Arc::new(Vec::new()),
        }
    }

    /// Arms the cache to rebuild on the next `generate`.
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

    /// Rebuilds the collection if busted; otherwise does nothing and the
    /// snapshot keeps its identity.
    pub fn generate<C>(&mut self, ctx: &mut C)
    where
        B: ShapeBuilder<C, Shape = S>,
    {
        if !self.busted {
            return;
        }
        self.shapes = Arc::new(self.builder.build(ctx));
        self.busted = false;
    }

    /// The current published snapshot.
    #[inline]
    pub fn shapes(&self) -> Arc<Vec<S>> {
        Arc::clone(&self.shapes)
    }
}
