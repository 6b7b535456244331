use super::Vec2;

/// Converts polar coordinates (angle in radians, radius in logical px) to a
/// point around the diagram origin.
#[inline]
pub fn polar(angle: f32, radius: f32) -> Vec2 {
    Vec2::new(angle.cos() * radius, angle.sin() * radius)
}

/// Angular span on the diagram circle, in radians.
///
/// Spans are directed: `start` to `end`, clockwise in pixel space when
/// `end > start`. Shape emitters sample the span with [`lerp`](Self::lerp),
/// so a reversed span simply tessellates in the opposite direction.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ArcSpan {
    pub start: f32,
    pub end: f32,
}

impl ArcSpan {
    #[inline]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Signed angular extent.
    #[inline]
    pub fn sweep(self) -> f32 {
        self.end - self.start
    }

    /// Angle at the middle of the span.
    #[inline]
    pub fn mid(self) -> f32 {
        self.start + self.sweep() * 0.5
    }

    /// Angle at parameter `t` in `[0, 1]` along the span.
    #[inline]
    pub fn lerp(self, t: f32) -> f32 {
        self.start + self.sweep() * t
    }

    /// Point on the span at parameter `t`, at the given radius.
    #[inline]
    pub fn point_at(self, t: f32, radius: f32) -> Vec2 {
        polar(self.lerp(t), radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAU: f32 = core::f32::consts::TAU;

    #[test]
    fn sweep_and_mid() {
        let s = ArcSpan::new(0.0, TAU / 2.0);
        assert_eq!(s.sweep(), TAU / 2.0);
        assert_eq!(s.mid(), TAU / 4.0);
    }

    #[test]
    fn lerp_endpoints() {
        let s = ArcSpan::new(1.0, 3.0);
        assert_eq!(s.lerp(0.0), 1.0);
        assert_eq!(s.lerp(1.0), 3.0);
    }

    #[test]
    fn polar_axes() {
        let p = polar(0.0, 10.0);
        assert!((p.x - 10.0).abs() < 1e-4);
        assert!(p.y.abs() < 1e-4);

        let q = polar(TAU / 4.0, 10.0);
        assert!(q.x.abs() < 1e-4);
        assert!((q.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn reversed_span_sweeps_negative() {
        let s = ArcSpan::new(2.0, 1.0);
        assert_eq!(s.sweep(), -1.0);
        assert_eq!(s.lerp(0.5), 1.5);
    }
}
