use crate::cache::Identify;
use crate::coords::{ArcSpan, Vec2};
use crate::pack::AttrCursor;
use crate::paint::Color;

/// Ribbon connecting two arc spans across the diagram circle.
///
/// Both ribbon edges are quadratic beziers with their control point at the
/// diagram center, which pulls the ribbon inward the way chord diagrams
/// conventionally render relationships.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    pub id: u64,
    pub source: ArcSpan,
    pub target: ArcSpan,
    pub radius: f32,
    pub color: Color,
}

impl Chord {
    /// Curve subdivisions per ribbon edge. Fixed so every chord occupies the
    /// same vertex batch in a packed buffer.
    pub const STEPS: usize = 16;

    /// Strip vertices per chord, including the degenerate stitch duplicates.
    pub const STRIP_VERTICES: usize = (Self::STEPS + 1) * 2 + 2;

    #[inline]
    pub fn new(id: u64, source: ArcSpan, target: ArcSpan, radius: f32, color: Color) -> Self {
        Self { id, source, target, radius, color }
    }

    /// Emits [`STRIP_VERTICES`](Self::STRIP_VERTICES) vertices: position
    /// (2 components) and color (4 components).
    ///
    /// Edge A runs source.start → target.end, edge B runs
    /// source.end → target.start; the strip alternates between them.
    pub fn write_strip(&self, pos: &mut AttrCursor<'_>, col: &mut AttrCursor<'_>) {
        let c = self.color.to_array();

        let a0 = self.source.point_at(0.0, self.radius);
        let a1 = self.target.point_at(1.0, self.radius);
        let b0 = self.source.point_at(1.0, self.radius);
        let b1 = self.target.point_at(0.0, self.radius);

        let first = center_bezier(a0, a1, 0.0);
        pos.put2(first.x, first.y);
        col.put4(c[0], c[1], c[2], c[3]);

        for i in 0..=Self::STEPS {
            let t = i as f32 / Self::STEPS as f32;
            let a = center_bezier(a0, a1, t);
            let b = center_bezier(b0, b1, t);
            pos.put2(a.x, a.y);
            col.put4(c[0], c[1], c[2], c[3]);
            pos.put2(b.x, b.y);
            col.put4(c[0], c[1], c[2], c[3]);
        }

        let last = center_bezier(b0, b1, 1.0);
        pos.put2(last.x, last.y);
        col.put4(c[0], c[1], c[2], c[3]);
    }
}

impl Identify for Chord {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

/// Quadratic bezier from `p` to `q` with the control point at the origin.
#[inline]
fn center_bezier(p: Vec2, q: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p * (u * u) + q * (t * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAU: f32 = core::f32::consts::TAU;

    fn chord() -> Chord {
        Chord::new(
            1,
            ArcSpan::new(0.0, 0.4),
            ArcSpan::new(TAU / 2.0, TAU / 2.0 + 0.4),
            100.0,
            Color::from_premul(0.2, 0.2, 0.8, 0.8),
        )
    }

    #[test]
    fn edge_endpoints_lie_on_the_circle() {
        let c = chord();
        let a0 = c.source.point_at(0.0, c.radius);
        let a1 = c.target.point_at(1.0, c.radius);
        assert!((center_bezier(a0, a1, 0.0).length() - 100.0).abs() < 1e-3);
        assert!((center_bezier(a0, a1, 1.0).length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn midpoint_is_pulled_toward_the_center() {
        let c = chord();
        let a0 = c.source.point_at(0.0, c.radius);
        let a1 = c.target.point_at(1.0, c.radius);
        let mid = center_bezier(a0, a1, 0.5);
        assert!(mid.length() < 100.0 * 0.75);
    }

    #[test]
    fn strip_vertex_count_matches_constant() {
        // (STEPS + 1) edge pairs plus the two stitch duplicates.
        assert_eq!(Chord::STRIP_VERTICES, (Chord::STEPS + 1) * 2 + 2);
    }
}
