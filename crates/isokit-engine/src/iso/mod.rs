//! Isometric projection and tile maps.
//!
//! Tile space: `x` grows right-down, `y` grows left-down; tile `(0, 0)` is the top of the
//! diamond. Screen space is camera-relative pixels, +Y down.

mod map;
mod mapper;
mod tile;
mod visible;

pub use map::{TileMap, TileRenderStats};
pub use mapper::{IsoMapper, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH};
pub use tile::Tile;
pub use visible::{depth_key, VisibleTile, CULL_MARGIN_TILES, HEIGHT_LAYER_STRIDE, MAX_VISIBLE_RESERVE};
