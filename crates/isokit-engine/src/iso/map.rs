use std::rc::Rc;

use crate::coords::{Color, Rect, Vec2};
use crate::render::{Renderer, Sprite};
use crate::sprite::SpriteSheet;

use super::visible::{self, VisibleTile};
use super::{IsoMapper, Tile};

/// Largest accepted edge; keeps every index representable as `i32`.
const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Largest accepted cell count (16M cells).
pub const MAX_CELLS: usize = 1 << 24;

static EMPTY_TILE: Tile = Tile::EMPTY;

/// What one [`TileMap::render`] call did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TileRenderStats {
    /// Cells that passed culling.
    pub visible: usize,
    /// Sprites submitted to the batch.
    pub drawn: usize,
    /// Visible cells whose `tile_id` has no frame in the tileset.
    pub missing_frames: usize,
}

/// Row-major grid of [`Tile`]s drawn from a shared tileset.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    tileset: Option<Rc<SpriteSheet>>,
}

impl TileMap {
    /// An empty `width` x `height` map; out-of-range sizes give a 0x0 map.
    pub fn new(width: u32, height: u32) -> Self {
        let mut map = Self::default();
        map.resize(width, height);
        map
    }

    /// Reallocates the grid; every cell becomes empty.
    ///
    /// Sizes with an edge beyond the `i32` index range or more than [`MAX_CELLS`] cells
    /// are rejected: the map is left untouched and `false` is returned.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let cells = (width as usize)
            .checked_mul(height as usize)
            .filter(|n| *n <= MAX_CELLS && width <= MAX_DIMENSION && height <= MAX_DIMENSION);
        let Some(cells) = cells else {
            log::warn!("tile map size {width}x{height} out of range; resize ignored");
            return false;
        };
        self.width = width;
        self.height = height;
        self.tiles.clear();
        self.tiles.resize(cells, Tile::EMPTY);
        true
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Cell at `(x, y)`; out-of-range reads return the empty tile.
    pub fn at(&self, x: i32, y: i32) -> &Tile {
        match self.index(x, y) {
            Some(i) => &self.tiles[i],
            None => &EMPTY_TILE,
        }
    }

    pub fn at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        let i = self.index(x, y)?;
        self.tiles.get_mut(i)
    }

    /// Writes one cell; out-of-range writes are ignored and return `false`.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.at_mut(x, y) {
            Some(t) => {
                *t = tile;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Empties every cell; the dimensions and tileset are kept.
    pub fn clear(&mut self) {
        self.fill(Tile::EMPTY);
    }

    /// Cells in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn set_tileset(&mut self, tileset: Option<Rc<SpriteSheet>>) {
        self.tileset = tileset;
    }

    pub fn tileset(&self) -> Option<&Rc<SpriteSheet>> {
        self.tileset.as_ref()
    }

    /// Largest sprite a cell can draw: the tileset's biggest frame, zero without one.
    fn sprite_reach(&self) -> Vec2 {
        self.tileset.as_ref().map_or(Vec2::zero(), |sheet| {
            let (w, h) = sheet.max_frame_size();
            Vec2::new(w as f32, h as f32)
        })
    }

    /// Visits the cells whose tile or sprite overlaps `viewport`, back to front.
    pub fn for_each_visible(
        &self,
        mapper: &IsoMapper,
        viewport: Rect,
        mut f: impl FnMut(&VisibleTile),
    ) {
        for v in visible::collect(self, mapper, viewport, self.sprite_reach()) {
            f(&v);
        }
    }

    /// The cells whose tile or sprite overlaps `viewport`, back to front.
    pub fn visible_tiles(&self, mapper: &IsoMapper, viewport: Rect) -> Vec<VisibleTile> {
        visible::collect(self, mapper, viewport, self.sprite_reach())
    }

    /// Streams the visible cells into one sprite batch.
    ///
    /// Each cell draws tileset frame `tile_id - 1` with its bottom-center at the cell
    /// center, lifted by `height` tile heights. Without a tileset nothing is drawn.
    pub fn render(
        &self,
        renderer: &mut dyn Renderer,
        mapper: &IsoMapper,
        viewport: Rect,
    ) -> TileRenderStats {
        let mut stats = TileRenderStats::default();
        let Some(tileset) = self.tileset.as_ref() else {
            log::debug!("tile map has no tileset; nothing rendered");
            return stats;
        };

        renderer.begin_batch();
        self.for_each_visible(mapper, viewport, |v| {
            stats.visible += 1;
            let frame = (v.tile.tile_id as usize)
                .checked_sub(1)
                .and_then(|i| tileset.frame(i));
            let Some(frame) = frame else {
                stats.missing_frames += 1;
                return;
            };

            let lift = v.tile.height as f32 * mapper.tile_height();
            let sprite = Sprite {
                position: Vec2::new(v.screen.x, v.screen.y - lift),
                size: Vec2::new(frame.width as f32, frame.height as f32),
                region: frame.region,
                tint: Color::white(),
                rotation: 0.0,
                origin: Vec2::new(0.5, 1.0),
            };
            renderer.draw_sprite(&sprite);
            stats.drawn += 1;
        });
        renderer.end_batch();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RendererConfig, SoftwareRenderer};
    use crate::texture::{TextureFilter, TextureWrap};

    #[test]
    fn resize_clears_cells() {
        let mut map = TileMap::new(3, 2);
        map.fill(Tile::new(5));
        map.resize(2, 2);
        assert_eq!(map.tiles().len(), 4);
        assert!(map.tiles().iter().all(Tile::is_empty));
    }

    #[test]
    fn out_of_range_access_is_safe() {
        let mut map = TileMap::new(2, 2);
        assert!(map.at(-1, 0).is_empty());
        assert!(map.at(2, 0).is_empty());
        assert!(map.at(i32::MIN, i32::MAX).is_empty());
        assert!(map.at_mut(0, 2).is_none());
        assert!(!map.set(5, 5, Tile::new(1)));
    }

    #[test]
    fn set_then_at() {
        let mut map = TileMap::new(4, 3);
        assert!(map.set(3, 2, Tile::new(7).with_height(2).with_flags(1)));
        let t = map.at(3, 2);
        assert_eq!((t.tile_id, t.height, t.flags), (7, 2, 1));
        assert_eq!(map.tiles()[2 * 4 + 3], *t);
        map.clear();
        assert!(map.at(3, 2).is_empty());
        assert_eq!((map.width(), map.height()), (4, 3));
    }

    #[test]
    fn oversized_resize_is_rejected() {
        let mut map = TileMap::new(2, 2);
        map.set(1, 1, Tile::new(3));
        assert!(!map.resize(u32::MAX, 2));
        assert!(!map.resize(70_000, 70_000));
        assert!(!map.resize(MAX_CELLS as u32 + 1, 1));
        assert_eq!((map.width(), map.height()), (2, 2));
        assert_eq!(map.at(1, 1).tile_id, 3);

        assert!(map.resize(3, 3));
        assert_eq!(map.tiles().len(), 9);
        assert_eq!(TileMap::new(70_000, 70_000).tiles().len(), 0);
    }

    #[test]
    fn render_batches_visible_cells() {
        let mut r = SoftwareRenderer::new(RendererConfig::default(), 640, 480);
        assert!(r.initialize());
        r.set_projection(0.0, 640.0, 480.0, 0.0);
        let tex = r.create_texture(&[255; 64 * 32 * 4], 64, 32, TextureFilter::Nearest, TextureWrap::Clamp);

        let mut sheet = SpriteSheet::new();
        sheet.set_texture(tex, 64, 32);
        sheet.define_grid(64, 32, None, None, 0, 0);

        let mut map = TileMap::new(4, 4);
        map.fill(Tile::new(1));
        map.set(1, 1, Tile::new(9));
        map.set_tileset(Some(Rc::new(sheet)));

        r.begin_frame();
        let stats = map.render(&mut r, &IsoMapper::default(), Rect::new(0.0, 0.0, 640.0, 480.0));
        r.end_frame();

        assert_eq!(stats.visible, 16);
        assert_eq!(stats.missing_frames, 1);
        assert_eq!(stats.drawn, 15);
        // One texture throughout: a single flush.
        assert_eq!(r.frame_stats().batch_flushes, 1);
        assert_eq!(r.frame_stats().vertices, 15 * 6);
    }

    #[test]
    fn tall_sprite_below_the_viewport_still_draws() {
        let (w, h) = (640, 480);
        let mut r = SoftwareRenderer::new(RendererConfig::default(), w, h);
        assert!(r.initialize());
        r.set_clear_color(Color::black());
        r.set_projection(0.0, w as f32, h as f32, 0.0);
        let tex = r.create_texture(&[255; 64 * 64 * 4], 64, 64, TextureFilter::Nearest, TextureWrap::Clamp);

        let mut sheet = SpriteSheet::new();
        sheet.set_texture(tex, 64, 64);
        sheet.define_frame("tower", 0, 0, 64, 64);

        let mut map = TileMap::new(24, 24);
        map.set(20, 14, Tile::new(1));
        map.set_tileset(Some(Rc::new(sheet)));
        let mut mapper = IsoMapper::default();
        mapper.set_camera(Vec2::new(0.0, 10.0));

        // Cell center lands at y = 534; the 64 px sprite covers y 470..534.
        r.begin_frame();
        r.clear();
        let stats = map.render(&mut r, &mapper, Rect::new(0.0, 0.0, w as f32, h as f32));
        r.end_frame();

        assert_eq!((stats.visible, stats.drawn), (1, 1));
        let px = r.read_pixels().unwrap();
        let i = ((475 * w + 192) * 4) as usize;
        assert_eq!(&px[i..i + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn render_without_tileset_draws_nothing() {
        let mut r = SoftwareRenderer::new(RendererConfig::default(), 64, 64);
        assert!(r.initialize());
        let map = TileMap::new(2, 2);
        r.begin_frame();
        let stats = map.render(&mut r, &IsoMapper::default(), Rect::new(0.0, 0.0, 64.0, 64.0));
        r.end_frame();
        assert_eq!(stats, TileRenderStats::default());
        assert_eq!(r.frame_stats().draw_calls, 0);
    }
}
