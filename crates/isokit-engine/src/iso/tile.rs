/// One map cell.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    /// 1-based tileset frame; 0 is empty.
    pub tile_id: u32,
    /// Stacking level; each level lifts the tile by one tile height on screen.
    pub height: i32,
    /// Free for game rules (walkable, blocked, ...).
    pub flags: u8,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        tile_id: 0,
        height: 0,
        flags: 0,
    };

    #[inline]
    pub const fn new(tile_id: u32) -> Self {
        Self {
            tile_id,
            height: 0,
            flags: 0,
        }
    }

    #[inline]
    pub const fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    #[inline]
    pub const fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tile_id == 0
    }
}
