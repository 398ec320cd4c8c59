/// Orthographic projection from logical space to clip space.
///
/// `left`/`right` map to clip x = -1/+1 and `bottom`/`top` to clip y = -1/+1, so a
/// top-left pixel space is `Ortho::new(0.0, w, h, 0.0)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ortho {
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
}

impl Default for Ortho {
    /// Identity: logical coordinates are already clip coordinates.
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
        }
    }
}

impl Ortho {
    /// Returns `None` for degenerate (zero-extent) or non-finite bounds.
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Option<Self> {
        let finite = [left, right, bottom, top].iter().all(|v| v.is_finite());
        let w = right - left;
        let h = top - bottom;
        if !finite || w == 0.0 || h == 0.0 || !w.is_finite() || !h.is_finite() {
            return None;
        }
        Some(Self {
            left,
            right,
            bottom,
            top,
        })
    }

    /// Top-left origin, +Y down, one unit per pixel.
    pub fn pixels(width: u32, height: u32) -> Option<Self> {
        Self::new(0.0, width as f32, height as f32, 0.0)
    }

    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (self.left, self.right, self.bottom, self.top)
    }

    #[inline]
    pub fn to_ndc(&self, p: [f32; 2]) -> [f32; 2] {
        [
            (p[0] - self.left) / (self.right - self.left) * 2.0 - 1.0,
            (p[1] - self.bottom) / (self.top - self.bottom) * 2.0 - 1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_projection_maps_corners() {
        let o = Ortho::pixels(200, 100).unwrap();
        assert_eq!(o.to_ndc([0.0, 0.0]), [-1.0, 1.0]);
        assert_eq!(o.to_ndc([200.0, 100.0]), [1.0, -1.0]);
        assert_eq!(o.to_ndc([100.0, 50.0]), [0.0, 0.0]);
    }

    #[test]
    fn default_is_identity() {
        let o = Ortho::default();
        assert_eq!(o.to_ndc([0.25, -0.5]), [0.25, -0.5]);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        assert!(Ortho::new(1.0, 1.0, 0.0, 1.0).is_none());
        assert!(Ortho::new(0.0, 1.0, 2.0, 2.0).is_none());
        assert!(Ortho::new(f32::NAN, 1.0, 0.0, 1.0).is_none());
        assert!(Ortho::pixels(0, 10).is_none());
    }
}
