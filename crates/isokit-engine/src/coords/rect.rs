use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
///
/// Used for viewports handed to the tile map and for screen-space culling footprints.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Builds a rectangle from two opposite corners in any order.
    #[inline]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vec2::new(a.x.max(b.x), a.y.max(b.y));
        Self::from_origin_size(min, max - min)
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        Self::from_corners(self.min(), self.max())
    }

    /// Corners in order: top-left, top-right, bottom-left, bottom-right.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let r = self.normalized();
        let (min, max) = (r.min(), r.max());
        [
            min,
            Vec2::new(max.x, min.y),
            Vec2::new(min.x, max.y),
            max,
        ]
    }

    /// Grows the rectangle by `dx` on the left and right and `dy` on the top and bottom.
    #[inline]
    pub fn expanded(self, dx: f32, dy: f32) -> Self {
        let r = self.normalized();
        Rect::new(
            r.origin.x - dx,
            r.origin.y - dy,
            r.size.x + 2.0 * dx,
            r.size.y + 2.0 * dy,
        )
    }

    /// Closed-interval overlap test: rectangles sharing only an edge still overlap.
    ///
    /// Culling uses this so that cells touching the viewport border are kept.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.origin.x <= b.max().x
            && b.origin.x <= a.max().x
            && a.origin.y <= b.max().y
            && b.origin.y <= a.max().y
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < r.max().x && p.y < r.max().y
    }
}
