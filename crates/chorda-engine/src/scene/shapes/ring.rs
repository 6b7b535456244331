use crate::cache::Identify;
use crate::coords::ArcSpan;
use crate::pack::AttrCursor;
use crate::paint::Color;

/// Annular sector (track segment) on the diagram circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub id: u64,
    pub span: ArcSpan,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub color: Color,
}

impl Ring {
    /// Arc subdivisions per ring. Fixed so every ring occupies the same
    /// vertex batch in a packed buffer.
    pub const SEGMENTS: usize = 16;

    /// Strip vertices emitted per ring: alternating outer/inner edge points
    /// plus the duplicated first and last vertex for the degenerate stitch.
    pub const STRIP_VERTICES: usize = (Self::SEGMENTS + 1) * 2 + 2;

    #[inline]
    pub fn new(
        id: u64,
        span: ArcSpan,
        inner_radius: f32,
        outer_radius: f32,
        color: Color,
    ) -> Self {
        Self { id, span, inner_radius, outer_radius, color }
    }

    /// Emits [`STRIP_VERTICES`](Self::STRIP_VERTICES) vertices: position
    /// (2 components) and color (4 components).
    pub fn write_strip(&self, pos: &mut AttrCursor<'_>, col: &mut AttrCursor<'_>) {
        let c = self.color.to_array();

        let first = self.span.point_at(0.0, self.outer_radius);
        pos.put2(first.x, first.y);
        col.put4(c[0], c[1], c[2], c[3]);

        for i in 0..=Self::SEGMENTS {
            let t = i as f32 / Self::SEGMENTS as f32;
            let outer = self.span.point_at(t, self.outer_radius);
            let inner = self.span.point_at(t, self.inner_radius);
            pos.put2(outer.x, outer.y);
            col.put4(c[0], c[1], c[2], c[3]);
            pos.put2(inner.x, inner.y);
            col.put4(c[0], c[1], c[2], c[3]);
        }

        let last = self.span.point_at(1.0, self.inner_radius);
        pos.put2(last.x, last.y);
        col.put4(c[0], c[1], c[2], c[3]);
    }
}

impl Identify for Ring {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{AttributeBuffer, AttributeDescriptor, PackBatch};

    fn strip_positions(ring: &Ring) -> Vec<[f32; 2]> {
        let mut buffer = AttributeBuffer::new(
            Ring::STRIP_VERTICES,
            &[
                AttributeDescriptor::vec2("position", [0.0, 0.0]),
                AttributeDescriptor::vec4("color", [0.0, 0.0, 0.0, 0.0]),
            ],
        );
        let mut batch = PackBatch::new();
        batch.begin();
        let shapes = [ring.clone()];
        batch.update_buffer(
            &shapes,
            &mut buffer,
            Ring::STRIP_VERTICES,
            1,
            |_, r, cursors: &mut [AttrCursor<'_>; 2]| {
                let [pos, col] = cursors;
                r.write_strip(pos, col);
            },
        );
        buffer
            .values(0)
            .chunks_exact(2)
            .map(|p| [p[0], p[1]])
            .collect()
    }

    #[test]
    fn emits_declared_vertex_count() {
        let ring = Ring::new(
            1,
            ArcSpan::new(0.0, 1.0),
            80.0,
            100.0,
            Color::from_premul(1.0, 0.0, 0.0, 1.0),
        );
        assert_eq!(strip_positions(&ring).len(), Ring::STRIP_VERTICES);
    }

    #[test]
    fn vertices_alternate_between_edge_radii() {
        let ring = Ring::new(
            1,
            ArcSpan::new(0.3, 2.1),
            80.0,
            100.0,
            Color::from_premul(0.0, 1.0, 0.0, 1.0),
        );
        let positions = strip_positions(&ring);

        // Interior vertices (between the stitch duplicates) alternate
        // outer/inner.
        for (i, p) in positions[1..positions.len() - 1].iter().enumerate() {
            let radius = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let expected = if i % 2 == 0 { 100.0 } else { 80.0 };
            assert!(
                (radius - expected).abs() < 1e-3,
                "vertex {i} at radius {radius}, expected {expected}"
            );
        }
    }

    #[test]
    fn first_and_last_vertices_are_duplicated() {
        let ring = Ring::new(
            1,
            ArcSpan::new(0.0, 1.5),
            50.0,
            60.0,
            Color::from_premul(0.0, 0.0, 1.0, 1.0),
        );
        let positions = strip_positions(&ring);
        let n = positions.len();

        assert_eq!(positions[0], positions[1]);
        assert_eq!(positions[n - 2], positions[n - 1]);
    }
}
