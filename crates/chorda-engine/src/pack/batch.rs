use super::attr::AttributeBuffer;
use super::cursor::AttrCursor;

/// Batched write protocol over an [`AttributeBuffer`].
///
/// A `PackBatch` carries the running vertex offset and batch count across a
/// sequence of [`update_buffer`](Self::update_buffer) calls, so heterogeneous
/// shape groups (different vertices-per-shape, e.g. varying curve resolution)
/// can pack into one buffer back to back:
///
/// ```ignore
/// batch.begin();
/// batch.update_buffer(&rings, &mut buffer, Ring::STRIP_VERTICES, rings.len(), write_ring);
/// batch.update_buffer(&labels, &mut buffer, Label::STRIP_VERTICES, labels.len(), write_label);
/// let batches = batch.finish();
/// let draw_range = 0..batch.vertices_written() as u32;
/// ```
///
/// The struct is the explicit, reusable replacement for hot-loop module
/// state: all bookkeeping lives here and on the stack.
#[derive(Debug, Default)]
pub struct PackBatch {
    next_vertex: usize,
    batches: usize,
}

impl PackBatch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new packing pass, resetting the vertex offset and batch count.
    #[inline]
    pub fn begin(&mut self) {
        self.next_vertex = 0;
        self.batches = 0;
    }

    /// Ends the pass, returning the total number of vertex batches written
    /// since [`begin`](Self::begin).
    #[inline]
    pub fn finish(&mut self) -> usize {
        self.batches
    }

    /// Batches written so far in this pass.
    #[inline]
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Vertices written so far in this pass; the exact GPU draw range.
    #[inline]
    pub fn vertices_written(&self) -> usize {
        self.next_vertex
    }

    /// Writes up to `shape_count` shapes into `buffer`, `vertices_per_shape`
    /// vertices each, starting at the batch's running vertex offset.
    ///
    /// For each shape, every attribute's cursor is positioned at that shape's
    /// slot and `write(index, shape, cursors)` must emit exactly
    /// `vertices_per_shape` vertices' worth of components per attribute
    /// (checked in debug builds).
    ///
    /// The const arity `N` must equal the buffer's attribute count; a
    /// mismatch is a configuration error reported via `log::warn!` with no
    /// data written. Shapes that would exceed the buffer's remaining vertex
    /// capacity are likewise dropped with a warning rather than written out
    /// of bounds.
    ///
    /// Returns the number of shapes actually written.
    pub fn update_buffer<S, F, const N: usize>(
        &mut self,
        shapes: &[S],
        buffer: &mut AttributeBuffer,
        vertices_per_shape: usize,
        shape_count: usize,
        mut write: F,
    ) -> usize
    where
        F: FnMut(usize, &S, &mut [AttrCursor<'_>; N]),
    {
        if N != buffer.attribute_count() {
            log::warn!(
                "update_buffer: accessor arity {} does not match buffer attribute count {}; \
                 skipping write",
                N,
                buffer.attribute_count()
            );
            return 0;
        }
        if vertices_per_shape == 0 {
            log::warn!("update_buffer: vertices_per_shape is 0; skipping write");
            return 0;
        }

        let mut count = shape_count.min(shapes.len());
        let base = self.next_vertex;
        let free = buffer.vertex_capacity().saturating_sub(base);
        let fits = free / vertices_per_shape;
        if count > fits {
            log::warn!(
                "update_buffer: buffer capacity exceeded; {} shapes of {} vertices requested \
                 with {} vertices free, truncating to {}",
                count,
                vertices_per_shape,
                free,
                fits
            );
            count = fits;
        }

        let components: [usize; N] = core::array::from_fn(|k| buffer.descriptor(k).component_count);
        let mut cursors: [AttrCursor<'_>; N] = buffer.cursors();

        for i in 0..count {
            let start = base + i * vertices_per_shape;
            for k in 0..N {
                cursors[k].seek(start * components[k]);
            }

            write(i, &shapes[i], &mut cursors);

            #[cfg(debug_assertions)]
            for k in 0..N {
                debug_assert_eq!(
                    cursors[k].position(),
                    (start + vertices_per_shape) * components[k],
                    "accessor wrote a partial or oversized vertex batch for attribute {k}"
                );
            }

            self.batches += 1;
        }

        self.next_vertex = base + count * vertices_per_shape;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::AttributeDescriptor;

    fn position_color_buffer(vertex_capacity: usize) -> AttributeBuffer {
        AttributeBuffer::new(
            vertex_capacity,
            &[
                AttributeDescriptor::vec2("position", [0.0, 0.0]),
                AttributeDescriptor::vec4("color", [0.0, 0.0, 0.0, 0.0]),
            ],
        )
    }

    // ── basic packing ─────────────────────────────────────────────────────

    #[test]
    fn packs_shapes_at_their_slots() {
        let shapes = [1.0f32, 2.0];
        let mut buffer = position_color_buffer(4);
        let mut batch = PackBatch::new();

        batch.begin();
        let written = batch.update_buffer(
            &shapes,
            &mut buffer,
            2,
            shapes.len(),
            |_, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, s);
                pos.put2(s, -s);
                col.put4(s, 0.0, 0.0, 1.0);
                col.put4(s, 0.0, 0.0, 1.0);
            },
        );

        assert_eq!(written, 2);
        assert_eq!(batch.finish(), 2);
        assert_eq!(batch.vertices_written(), 4);
        assert_eq!(buffer.values(0), &[1.0, 1.0, 1.0, -1.0, 2.0, 2.0, 2.0, -2.0]);
        assert_eq!(buffer.values(1)[0..4], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(buffer.values(1)[8..12], [2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn consecutive_updates_advance_the_offset() {
        let mut buffer = position_color_buffer(6);
        let mut batch = PackBatch::new();

        batch.begin();
        batch.update_buffer(
            &[1.0f32],
            &mut buffer,
            1,
            1,
            |_, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, s);
                col.put4(s, s, s, s);
            },
        );
        batch.update_buffer(
            &[2.0f32, 3.0],
            &mut buffer,
            2,
            2,
            |i, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, i as f32);
                pos.put2(s, i as f32);
                col.put4(s, s, s, s);
                col.put4(s, s, s, s);
            },
        );

        assert_eq!(batch.finish(), 3);
        assert_eq!(batch.vertices_written(), 5);
        // First call wrote vertex 0; second call started at vertex 1.
        assert_eq!(buffer.values(0)[0..2], [1.0, 1.0]);
        assert_eq!(buffer.values(0)[2..6], [2.0, 0.0, 2.0, 0.0]);
        assert_eq!(buffer.values(0)[6..10], [3.0, 1.0, 3.0, 1.0]);
    }

    #[test]
    fn begin_resets_state() {
        let mut buffer = position_color_buffer(2);
        let mut batch = PackBatch::new();

        batch.begin();
        batch.update_buffer(
            &[1.0f32],
            &mut buffer,
            1,
            1,
            |_, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, s);
                col.put4(s, s, s, s);
            },
        );
        assert_eq!(batch.finish(), 1);

        batch.begin();
        assert_eq!(batch.batches(), 0);
        assert_eq!(batch.vertices_written(), 0);
    }

    // ── truncation & arity ────────────────────────────────────────────────

    #[test]
    fn overflow_truncates_instead_of_writing_out_of_bounds() {
        let shapes = [1.0f32, 2.0, 3.0];
        let mut buffer = position_color_buffer(4);
        let mut batch = PackBatch::new();

        batch.begin();
        let written = batch.update_buffer(
            &shapes,
            &mut buffer,
            2,
            shapes.len(),
            |_, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, s);
                pos.put2(s, s);
                col.put4(s, s, s, s);
                col.put4(s, s, s, s);
            },
        );

        // Only 2 of 3 shapes fit in 4 vertex slots.
        assert_eq!(written, 2);
        assert_eq!(batch.vertices_written(), 4);
    }

    #[test]
    fn shape_count_caps_the_write() {
        let shapes = [1.0f32, 2.0, 3.0];
        let mut buffer = position_color_buffer(8);
        let mut batch = PackBatch::new();

        batch.begin();
        let written = batch.update_buffer(
            &shapes,
            &mut buffer,
            1,
            1,
            |_, &s, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                pos.put2(s, s);
                col.put4(s, s, s, s);
            },
        );

        assert_eq!(written, 1);
        // Untouched slots keep their defaults.
        assert_eq!(buffer.values(0)[2..], [0.0; 14]);
    }

    #[test]
    fn arity_mismatch_writes_nothing() {
        let shapes = [1.0f32];
        let mut buffer = position_color_buffer(4);
        let mut batch = PackBatch::new();

        batch.begin();
        let written = batch.update_buffer(
            &shapes,
            &mut buffer,
            1,
            1,
            |_, &s, cursors: &mut [AttrCursor<'_>; 1]| {
                cursors[0].put2(s, s);
            },
        );

        assert_eq!(written, 0);
        assert!(buffer.values(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn zero_vertices_per_shape_writes_nothing() {
        let shapes = [1.0f32];
        let mut buffer = position_color_buffer(4);
        let mut batch = PackBatch::new();

        batch.begin();
        let written = batch.update_buffer(
            &shapes,
            &mut buffer,
            0,
            1,
            |_, _, _: &mut [AttrCursor<'_>; 2]| {},
        );
        assert_eq!(written, 0);
    }
}
