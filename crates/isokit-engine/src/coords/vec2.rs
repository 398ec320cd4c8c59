use core::ops::{Add, Div, Mul, Neg, Sub};

/// 2D vector in logical pixels (or tile units, depending on context).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotates the vector by the angle whose cosine and sine are given.
    ///
    /// Positive angles turn +X towards +Y, which reads as clockwise in +Y down pixel space.
    #[inline]
    pub fn rotated(self, cos: f32, sin: f32) -> Vec2 {
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_points_down_in_pixel_space() {
        let v = Vec2::new(1.0, 0.0).rotated(0.0, 1.0);
        assert_eq!(v, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn arithmetic() {
        let a = Vec2::new(3.0, -2.0);
        assert_eq!(a + Vec2::new(1.0, 1.0), Vec2::new(4.0, -1.0));
        assert_eq!(a - a, Vec2::zero());
        assert_eq!(-a * 2.0, Vec2::new(-6.0, 4.0));
        assert_eq!(a / 2.0, Vec2::new(1.5, -1.0));
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
    }
}
