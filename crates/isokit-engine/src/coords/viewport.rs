/// Framebuffer-space viewport in physical pixels (top-left origin).
///
/// This is the rectangle clip space is mapped onto by `set_viewport`. Both backends use
/// the same mapping: NDC `(-1, 1)` lands on the top-left corner, `(1, -1)` on the
/// bottom-right corner.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PixelViewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelViewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Full-target viewport.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Clips the viewport against a `target_w` x `target_h` framebuffer.
    ///
    /// Returns `None` when nothing of the viewport remains on the target.
    pub fn clipped_to(self, target_w: u32, target_h: u32) -> Option<PixelViewport> {
        if self.x >= target_w || self.y >= target_h {
            return None;
        }
        let w = self.width.min(target_w - self.x);
        let h = self.height.min(target_h - self.y);
        let v = PixelViewport::new(self.x, self.y, w, h);
        v.is_valid().then_some(v)
    }

    /// Maps normalized device coordinates to framebuffer pixel coordinates.
    #[inline]
    pub fn ndc_to_pixels(self, ndc: [f32; 2]) -> [f32; 2] {
        [
            self.x as f32 + (ndc[0] + 1.0) * 0.5 * self.width as f32,
            self.y as f32 + (1.0 - ndc[1]) * 0.5 * self.height as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let vp = PixelViewport::new(10, 20, 100, 50);
        assert_eq!(vp.ndc_to_pixels([-1.0, 1.0]), [10.0, 20.0]);
        assert_eq!(vp.ndc_to_pixels([1.0, -1.0]), [110.0, 70.0]);
        assert_eq!(vp.ndc_to_pixels([0.0, 0.0]), [60.0, 45.0]);
    }

    #[test]
    fn clipping_against_target() {
        let vp = PixelViewport::new(50, 50, 100, 100);
        assert_eq!(vp.clipped_to(80, 60), Some(PixelViewport::new(50, 50, 30, 10)));
        assert_eq!(vp.clipped_to(50, 200), None);
        assert_eq!(PixelViewport::new(0, 0, 0, 10).clipped_to(10, 10), None);
    }
}
