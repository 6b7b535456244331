use std::sync::Arc;

use super::buffer_cache::ShapeBuilder;

/// Animation state of an [`AnimatedShapeCache`].
///
/// Transitions: `Init` → `Playing` ⇄ `Stopped`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Playback {
    Init,
    Playing,
    Stopped,
}

/// A [`ShapeBuilder`] with a per-frame mutation hook.
///
/// `animate` runs once per `generate` while the cache is playing, mutating
/// the working collection in place (the built shapes persist between frames;
/// `animate` nudges them).
pub trait AnimatedShapeBuilder<C>: ShapeBuilder<C> {
    fn animate(&mut self, ctx: &mut C, shapes: &mut Vec<Self::Shape>);
}

/// Shape cache whose result counts as new every frame while playing.
///
/// While `Playing`, each `generate` runs the builder's `animate` hook and the
/// cache reports a freshly allocated snapshot on every [`shapes`](Self::shapes)
/// call, so identity-based diffing downstream always sees a change. While
/// `Init` or `Stopped`, behavior matches [`ShapeBufferCache`] exactly:
/// stable identity until busted.
///
/// [`ShapeBufferCache`]: super::ShapeBufferCache
#[derive(Debug)]
pub struct AnimatedShapeCache<S, B> {
    builder: B,
    busted: bool,
    working: Vec<S>,
    published: Arc<Vec<S>>,
    playback: Playback,
}

impl<S: Clone, B> AnimatedShapeCache<S, B> {
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            busted: true,
            working: Vec::new(),
            published: Arc::new(Vec::new()),
            playback: Playback::Init,
        }
    }

    /// Begins playing. The next `generate` starts animating.
    #[inline]
    pub fn start(&mut self) {
        self.playback = Playback::Playing;
    }

    /// Stops playing; the collection freezes at its current state.
    #[inline]
    pub fn stop(&mut self) {
        self.playback = Playback::Stopped;
    }

    #[inline]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
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

    /// Rebuilds if busted, then advances the animation if playing.
    ///
    /// Either step republishes the snapshot under a new identity.
    pub fn generate<C>(&mut self, ctx: &mut C)
    where
        B: AnimatedShapeBuilder<C, Shape = S>,
    {
        let mut republish = false;

        if self.busted {
            self.working = self.builder.build(ctx);
            self.busted = false;
            republish = true;
        }

        if self.playback == Playback::Playing {
            self.builder.animate(ctx, &mut self.working);
            republish = true;
        }

        if republish {
            self.published = Arc::new(self.working.clone());
        }
    }

    /// The current snapshot.
    ///
    /// While playing this is freshly allocated on every call; otherwise it
    /// keeps its identity until the next rebuild.
    pub fn shapes(&self) -> Arc<Vec<S>> {
        if self.is_playing() {
            Arc::new(self.published.as_ref().clone())
        } else {
            Arc::clone(&self.published)
        }
    }
}
