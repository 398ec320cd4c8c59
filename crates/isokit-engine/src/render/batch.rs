use crate::texture::TextureHandle;

use super::{Sprite, Vertex, VERTICES_PER_QUAD};

/// Default batch capacity in quads.
pub const DEFAULT_MAX_QUADS: usize = 1000;

/// Receives contiguous same-texture vertex runs from a [`SpriteBatch`].
pub trait BatchSink {
    fn submit(&mut self, texture: TextureHandle, vertices: &[Vertex]);
}

/// Counters for one batch bracket.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub sprites: u32,
    pub flushes: u32,
    pub dropped: u32,
}

/// Accumulates sprites and flushes them as one draw per contiguous texture run.
///
/// A flush happens when the texture changes, when the buffer is full, and at `end`.
/// Submission order is preserved; sprites are never reordered to share textures.
pub struct SpriteBatch {
    vertices: Vec<Vertex>,
    texture: TextureHandle,
    max_vertices: usize,
    active: bool,
    stats: BatchStats,
}

impl Default for SpriteBatch {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUADS)
    }
}

impl SpriteBatch {
    pub fn new(max_quads: usize) -> Self {
        let max_vertices = max_quads.max(1) * VERTICES_PER_QUAD;
        Self {
            vertices: Vec::with_capacity(max_vertices),
            texture: TextureHandle::INVALID,
            max_vertices,
            active: false,
            stats: BatchStats::default(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn max_quads(&self) -> usize {
        self.max_vertices / VERTICES_PER_QUAD
    }

    /// Vertices accumulated since the last flush.
    #[inline]
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Opens a bracket. Pending vertices from an unterminated bracket are discarded.
    pub fn begin(&mut self) {
        if self.active && !self.vertices.is_empty() {
            log::warn!(
                "begin_batch while a batch is open; discarding {} pending vertices",
                self.vertices.len()
            );
        }
        self.vertices.clear();
        self.texture = TextureHandle::INVALID;
        self.active = true;
        self.stats = BatchStats::default();
    }

    /// Appends one sprite, flushing first if its texture differs or the buffer is full.
    ///
    /// Returns `false` (and records nothing) outside a bracket or for the invalid handle.
    pub fn push(&mut self, sprite: &Sprite, sink: &mut dyn BatchSink) -> bool {
        if !self.active || !sprite.texture().is_valid() {
            self.stats.dropped += 1;
            return false;
        }

        if sprite.texture() != self.texture
            || self.vertices.len() + VERTICES_PER_QUAD > self.max_vertices
        {
            self.flush(sink);
            self.texture = sprite.texture();
        }

        self.vertices.extend_from_slice(&sprite.vertices());
        self.stats.sprites += 1;
        true
    }

    /// Submits pending vertices, if any.
    pub fn flush(&mut self, sink: &mut dyn BatchSink) {
        if self.vertices.is_empty() {
            return;
        }
        sink.submit(self.texture, &self.vertices);
        self.vertices.clear();
        self.stats.flushes += 1;
    }

    /// Flushes and closes the bracket. A no-op when no bracket is open.
    pub fn end(&mut self, sink: &mut dyn BatchSink) {
        if !self.active {
            return;
        }
        self.flush(sink);
        self.active = false;
        self.texture = TextureHandle::INVALID;
    }

    /// Closes the bracket without submitting anything.
    pub fn discard(&mut self) {
        self.vertices.clear();
        self.active = false;
        self.texture = TextureHandle::INVALID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::texture::TextureRegion;

    #[derive(Default)]
    struct Collect(Vec<(TextureHandle, usize)>);

    impl BatchSink for Collect {
        fn submit(&mut self, texture: TextureHandle, vertices: &[Vertex]) {
            self.0.push((texture, vertices.len()));
        }
    }

    fn sprite(tex: u32) -> Sprite {
        Sprite::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(8.0, 8.0),
            TextureRegion::full(TextureHandle::from_raw(tex)),
        )
    }

    #[test]
    fn texture_changes_split_flushes_in_order() {
        let mut batch = SpriteBatch::default();
        let mut sink = Collect::default();
        batch.begin();
        for t in [1, 1, 2, 1] {
            assert!(batch.push(&sprite(t), &mut sink));
        }
        batch.end(&mut sink);

        let t = TextureHandle::from_raw;
        assert_eq!(sink.0, vec![(t(1), 12), (t(2), 6), (t(1), 6)]);
        assert_eq!(batch.stats().flushes, 3);
    }

    #[test]
    fn capacity_overflow_flushes_every_vertex() {
        let mut batch = SpriteBatch::new(4);
        let mut sink = Collect::default();
        batch.begin();
        for _ in 0..10 {
            batch.push(&sprite(7), &mut sink);
        }
        batch.end(&mut sink);

        let sizes: Vec<usize> = sink.0.iter().map(|(_, n)| *n).collect();
        assert_eq!(sizes, vec![24, 24, 12]);
        assert_eq!(sizes.iter().sum::<usize>(), 10 * VERTICES_PER_QUAD);
    }

    #[test]
    fn empty_bracket_submits_nothing() {
        let mut batch = SpriteBatch::default();
        let mut sink = Collect::default();
        batch.begin();
        batch.end(&mut sink);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn push_outside_bracket_is_dropped() {
        let mut batch = SpriteBatch::default();
        let mut sink = Collect::default();
        assert!(!batch.push(&sprite(1), &mut sink));
        batch.end(&mut sink);
        assert!(sink.0.is_empty());
        assert_eq!(batch.pending_vertices(), 0);
    }

    #[test]
    fn invalid_texture_is_dropped() {
        let mut batch = SpriteBatch::default();
        let mut sink = Collect::default();
        batch.begin();
        assert!(!batch.push(&sprite(0), &mut sink));
        batch.end(&mut sink);
        assert!(sink.0.is_empty());
        assert_eq!(batch.stats().dropped, 1);
    }

    #[test]
    fn restarting_discards_pending() {
        let mut batch = SpriteBatch::default();
        let mut sink = Collect::default();
        batch.begin();
        batch.push(&sprite(1), &mut sink);
        batch.begin();
        batch.end(&mut sink);
        assert!(sink.0.is_empty());
    }
}
