use crate::coords::Vec2;

pub const DEFAULT_TILE_WIDTH: f32 = 64.0;
pub const DEFAULT_TILE_HEIGHT: f32 = 32.0;

/// Tile grid <-> screen pixel transform under a camera offset.
///
/// Forward: `screen = ((x - y) * w/2, (x + y) * h/2) - camera`; the inverse is exact
/// up to rounding. Both directions compute in f64.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IsoMapper {
    tile_width: f32,
    tile_height: f32,
    camera: Vec2,
}

impl Default for IsoMapper {
    fn default() -> Self {
        Self {
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            camera: Vec2::zero(),
        }
    }
}

impl IsoMapper {
    /// Mapper with the given tile size; invalid sizes fall back to the default.
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        let mut m = Self::default();
        m.set_tile_size(tile_width, tile_height);
        m
    }

    /// Sets the tile footprint in pixels. Non-positive or non-finite sizes are ignored
    /// with a warning; returns whether the size was applied.
    pub fn set_tile_size(&mut self, tile_width: f32, tile_height: f32) -> bool {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if !ok(tile_width) || !ok(tile_height) {
            log::warn!("ignoring invalid tile size {tile_width}x{tile_height}");
            return false;
        }
        self.tile_width = tile_width;
        self.tile_height = tile_height;
        true
    }

    #[inline]
    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Scroll offset subtracted from every projected position.
    #[inline]
    pub fn set_camera(&mut self, camera: Vec2) {
        self.camera = camera;
    }

    #[inline]
    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    /// Screen position of a (fractional) tile coordinate; integer coordinates give the
    /// tile's center.
    pub fn tile_to_screen(&self, tile: Vec2) -> Vec2 {
        let (x, y) = self.forward(f64::from(tile.x), f64::from(tile.y));
        Vec2::new(x as f32, y as f32)
    }

    pub fn tile_to_screen_i(&self, x: i32, y: i32) -> Vec2 {
        let (x, y) = self.forward(f64::from(x), f64::from(y));
        Vec2::new(x as f32, y as f32)
    }

    /// Fractional tile coordinate under a screen point.
    pub fn screen_to_tile(&self, screen: Vec2) -> Vec2 {
        let half_w = f64::from(self.tile_width) * 0.5;
        let half_h = f64::from(self.tile_height) * 0.5;
        let sx = (f64::from(screen.x) + f64::from(self.camera.x)) / half_w;
        let sy = (f64::from(screen.y) + f64::from(self.camera.y)) / half_h;
        Vec2::new(((sx + sy) * 0.5) as f32, ((sy - sx) * 0.5) as f32)
    }

    /// Tile containing a screen point (floor of the inverse). Saturates at the i32 range;
    /// NaN maps to 0.
    pub fn screen_to_tile_int(&self, screen: Vec2) -> (i32, i32) {
        let t = self.screen_to_tile(screen);
        (t.x.floor() as i32, t.y.floor() as i32)
    }

    /// Draw order of a cell: larger values are drawn later.
    #[inline]
    pub fn depth(x: i32, y: i32) -> i64 {
        i64::from(x) + i64::from(y)
    }

    fn forward(&self, x: f64, y: f64) -> (f64, f64) {
        let half_w = f64::from(self.tile_width) * 0.5;
        let half_h = f64::from(self.tile_height) * 0.5;
        (
            (x - y) * half_w - f64::from(self.camera.x),
            (x + y) * half_h - f64::from(self.camera.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_matches_the_diamond_layout() {
        let m = IsoMapper::default();
        assert_eq!(m.tile_to_screen_i(0, 0), Vec2::new(0.0, 0.0));
        assert_eq!(m.tile_to_screen_i(1, 0), Vec2::new(32.0, 16.0));
        assert_eq!(m.tile_to_screen_i(0, 1), Vec2::new(-32.0, 16.0));
        assert_eq!(m.tile_to_screen_i(1, 1), Vec2::new(0.0, 32.0));
    }

    #[test]
    fn camera_shifts_screen_positions() {
        let mut m = IsoMapper::default();
        m.set_camera(Vec2::new(100.0, -50.0));
        assert_eq!(m.tile_to_screen_i(0, 0), Vec2::new(-100.0, 50.0));
        assert_eq!(m.screen_to_tile(Vec2::new(-100.0, 50.0)), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn round_trip_sweep() {
        let cameras = [
            Vec2::new(0.0, 0.0),
            Vec2::new(123.5, -77.25),
            Vec2::new(-4096.0, 2048.0),
        ];
        let sizes = [(64.0, 32.0), (48.0, 24.0), (100.0, 37.0)];
        for &(w, h) in &sizes {
            for &cam in &cameras {
                let mut m = IsoMapper::new(w, h);
                m.set_camera(cam);
                for ix in -20..=20 {
                    for iy in -20..=20 {
                        let t = Vec2::new(ix as f32 * 1.37, iy as f32 * 0.91);
                        let back = m.screen_to_tile(m.tile_to_screen(t));
                        let tol = 1e-4 * (1.0 + t.x.abs().max(t.y.abs()) + cam.x.abs().max(cam.y.abs()) / h);
                        assert!(
                            (back.x - t.x).abs() <= tol && (back.y - t.y).abs() <= tol,
                            "{t:?} -> {back:?} (tile {w}x{h}, camera {cam:?})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn screen_to_tile_int_floors() {
        let m = IsoMapper::default();
        // Just inside the top vertex of tile (0,0)'s lower half.
        assert_eq!(m.screen_to_tile_int(Vec2::new(0.0, 1.0)), (0, 0));
        assert_eq!(m.screen_to_tile_int(Vec2::new(0.0, -1.0)), (-1, -1));
        assert_eq!(m.screen_to_tile_int(Vec2::new(f32::NAN, 0.0)), (0, 0));
    }

    #[test]
    fn invalid_tile_sizes_are_ignored() {
        let mut m = IsoMapper::default();
        assert!(!m.set_tile_size(0.0, 32.0));
        assert!(!m.set_tile_size(64.0, -1.0));
        assert!(!m.set_tile_size(f32::INFINITY, 32.0));
        assert!(!m.set_tile_size(f32::NAN, 32.0));
        assert_eq!((m.tile_width(), m.tile_height()), (64.0, 32.0));
        assert!(m.set_tile_size(128.0, 64.0));
        assert_eq!(m.tile_to_screen_i(1, 0), Vec2::new(64.0, 32.0));
    }

    #[test]
    fn depth_is_x_plus_y() {
        assert_eq!(IsoMapper::depth(1, 2), 3);
        assert_eq!(IsoMapper::depth(2, 1), 3);
        assert_eq!(IsoMapper::depth(i32::MAX, i32::MAX), 2 * i32::MAX as i64);
    }
}
