use crate::cache::Identify;
use crate::coords::{polar, Vec2};
use crate::pack::AttrCursor;
use crate::paint::Color;

/// Anchor quad for a text label placed around the diagram.
///
/// Glyph rasterization and atlas lookup are the host's concern; the quad
/// carries position and color only, sized by `extent` in logical pixels and
/// centered on the polar anchor point.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: u64,
    pub angle: f32,
    pub radius: f32,
    pub extent: Vec2,
    pub color: Color,
}

impl Label {
    /// Strip vertices per label: a 4-corner quad plus the duplicated first
    /// and last vertex for the degenerate stitch.
    pub const STRIP_VERTICES: usize = 6;

    #[inline]
    pub fn new(id: u64, angle: f32, radius: f32, extent: Vec2, color: Color) -> Self {
        Self { id, angle, radius, extent, color }
    }

    /// The quad's center point.
    #[inline]
    pub fn anchor(&self) -> Vec2 {
        polar(self.angle, self.radius)
    }

    /// Emits [`STRIP_VERTICES`](Self::STRIP_VERTICES) vertices: position
    /// (2 components) and color (4 components).
    pub fn write_strip(&self, pos: &mut AttrCursor<'_>, col: &mut AttrCursor<'_>) {
        let c = self.color.to_array();
        let center = self.anchor();
        let half = self.extent * 0.5;

        let corners = [
            Vec2::new(center.x - half.x, center.y - half.y),
            Vec2::new(center.x - half.x, center.y + half.y),
            Vec2::new(center.x + half.x, center.y - half.y),
            Vec2::new(center.x + half.x, center.y + half.y),
        ];

        pos.put2(corners[0].x, corners[0].y);
        col.put4(c[0], c[1], c[2], c[3]);
        for corner in corners {
            pos.put2(corner.x, corner.y);
            col.put4(c[0], c[1], c[2], c[3]);
        }
        pos.put2(corners[3].x, corners[3].y);
        col.put4(c[0], c[1], c[2], c[3]);
    }
}

impl Identify for Label {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}
