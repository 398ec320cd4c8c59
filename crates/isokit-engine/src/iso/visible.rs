use crate::coords::{Rect, Vec2};

use super::{IsoMapper, Tile, TileMap};

/// Weight of one height level in the depth key.
///
/// Larger than any in-bounds `x + y` (indices are below 2^31), so a higher level always
/// sorts after every cell of a lower one.
pub const HEIGHT_LAYER_STRIDE: i64 = 1 << 32;

/// Whole tiles added around the inverse-mapped viewport before clamping.
pub const CULL_MARGIN_TILES: i64 = 2;

/// Upper bound on the speculative reservation for the visible set.
pub const MAX_VISIBLE_RESERVE: usize = 10_000;

/// A cell that passed culling, in draw order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VisibleTile {
    pub x: i32,
    pub y: i32,
    pub tile: Tile,
    /// Camera-relative center of the cell's base diamond.
    pub screen: Vec2,
    pub key: i64,
}

/// Combined sort key `depth(x, y) + height * HEIGHT_LAYER_STRIDE`, saturating.
#[inline]
pub fn depth_key(x: i32, y: i32, height: i32) -> i64 {
    i64::from(height)
        .saturating_mul(HEIGHT_LAYER_STRIDE)
        .saturating_add(IsoMapper::depth(x, y))
}

/// Index range `[lo, hi]` on one axis, or `None` when empty after clamping.
fn clamp_axis(min: f32, max: f32, len: u32) -> Option<(i64, i64)> {
    // Float to int casts saturate, so huge coordinates stay ordered.
    let lo = (min.floor() as i64).saturating_sub(CULL_MARGIN_TILES).max(0);
    let hi = (max.ceil() as i64)
        .saturating_add(CULL_MARGIN_TILES)
        .min(i64::from(len) - 1);
    (lo <= hi).then_some((lo, hi))
}

/// Screen rectangle a cell can paint into: its base diamond raised by `height` levels,
/// unioned with a `reach`-sized sprite standing bottom-center on the raised cell, then
/// grown by one tile on every side.
fn footprint(mapper: &IsoMapper, screen: Vec2, height: i32, reach: Vec2) -> Rect {
    let tw = mapper.tile_width();
    let th = mapper.tile_height();
    let lift = height as f32 * th;
    let half_w = tw.max(reach.x) * 0.5;
    let top = (screen.y - th * 0.5)
        .min(screen.y - th * 0.5 - lift)
        .min(screen.y - lift - reach.y);
    let bottom = (screen.y + th * 0.5).max(screen.y + th * 0.5 - lift);
    Rect::from_corners(
        Vec2::new(screen.x - half_w, top),
        Vec2::new(screen.x + half_w, bottom),
    )
    .expanded(tw, th)
}

/// Non-empty cells overlapping `viewport`, sorted back to front.
///
/// `viewport` is in camera-relative screen pixels. `reach` is the largest sprite size
/// (width, height) drawn on a cell; cells below or beside the viewport whose sprite still
/// reaches into it are kept. Non-finite input yields an empty set.
pub(crate) fn collect(
    map: &TileMap,
    mapper: &IsoMapper,
    viewport: Rect,
    reach: Vec2,
) -> Vec<VisibleTile> {
    let viewport = viewport.normalized();
    if !viewport.is_finite() || !reach.is_finite() {
        return Vec::new();
    }
    let reach = Vec2::new(reach.x.max(0.0), reach.y.max(0.0));

    // Sprites grow upward from their cell, so search further down and to the sides.
    let search = Rect::from_corners(
        Vec2::new(viewport.min().x - reach.x * 0.5, viewport.min().y),
        Vec2::new(viewport.max().x + reach.x * 0.5, viewport.max().y + reach.y),
    );
    let corners = search.corners().map(|c| mapper.screen_to_tile(c));
    if corners.iter().any(|c| !c.is_finite()) {
        return Vec::new();
    }

    let fold = |f: fn(f32, f32) -> f32, init: f32, pick: fn(&Vec2) -> f32| {
        corners.iter().map(pick).fold(init, f)
    };
    let min_x = fold(f32::min, f32::INFINITY, |c| c.x);
    let max_x = fold(f32::max, f32::NEG_INFINITY, |c| c.x);
    let min_y = fold(f32::min, f32::INFINITY, |c| c.y);
    let max_y = fold(f32::max, f32::NEG_INFINITY, |c| c.y);

    let (Some((x0, x1)), Some((y0, y1))) = (
        clamp_axis(min_x, max_x, map.width()),
        clamp_axis(min_y, max_y, map.height()),
    ) else {
        return Vec::new();
    };

    let span = ((x1 - x0 + 1) as u64).saturating_mul((y1 - y0 + 1) as u64);
    let mut out = Vec::with_capacity(span.min(MAX_VISIBLE_RESERVE as u64) as usize);

    // Bounds are clamped into [0, len - 1] with len <= i32::MAX, so the casts hold.
    for ty in y0 as i32..=y1 as i32 {
        for tx in x0 as i32..=x1 as i32 {
            let tile = *map.at(tx, ty);
            if tile.is_empty() {
                continue;
            }
            let screen = mapper.tile_to_screen_i(tx, ty);
            if !footprint(mapper, screen, tile.height, reach).overlaps(viewport) {
                continue;
            }
            out.push(VisibleTile {
                x: tx,
                y: ty,
                tile,
                screen,
                key: depth_key(tx, ty, tile.height),
            });
        }
    }

    // Stable: equal keys keep row-major scan order.
    out.sort_by_key(|v| v.key);
    out
}
