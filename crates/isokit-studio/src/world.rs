use std::rc::Rc;

use anyhow::Result;
use isokit_engine::coords::{Color, Rect, Vec2};
use isokit_engine::iso::{IsoMapper, Tile, TileMap, TileRenderStats};
use isokit_engine::render::{Renderer, Sprite};
use isokit_engine::sprite::{AnimationPlayer, Image, SpriteSheet};
use isokit_engine::texture::TextureFilter;

pub const MAP_SIZE: u32 = 32;

const TILE_W: u32 = 64;
const TILE_H: u32 = 32;
const BEACON: u32 = 32;
const BEACON_FRAMES: u32 = 4;

/// Pixels per second.
const CAMERA_SPEED: f32 = 400.0;

const TILE_COLORS: [[u8; 4]; 4] = [
    [96, 160, 72, 255],  // grass
    [150, 112, 70, 255], // dirt
    [60, 110, 190, 255], // water
    [140, 140, 150, 255], // stone
];

const GRASS: u32 = 1;
const DIRT: u32 = 2;
const WATER: u32 = 3;
const STONE: u32 = 4;

/// Which arrow keys are held.
#[derive(Debug, Default, Copy, Clone)]
pub struct Pan {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Pan {
    fn direction(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The demo scene: a procedural island with an animated beacon on the hill.
pub struct World {
    sheet: Rc<SpriteSheet>,
    map: TileMap,
    mapper: IsoMapper,
    beacon: AnimationPlayer,
    pub pan: Pan,
    last_stats: TileRenderStats,
}

impl World {
    /// Builds the atlas, uploads it to `renderer` and lays out the map.
    pub fn new(renderer: &mut dyn Renderer) -> Result<Self> {
        let atlas = build_atlas();
        let mut sheet = SpriteSheet::new();
        sheet.load_image(renderer, &atlas, TextureFilter::Nearest)?;

        for (i, name) in ["grass", "dirt", "water", "stone"].iter().enumerate() {
            sheet.define_frame(name, i as u32 * TILE_W, 0, TILE_W, TILE_H);
        }
        let first_beacon = sheet.frame_count();
        for i in 0..BEACON_FRAMES {
            sheet.define_frame(&format!("beacon_{i}"), i * BEACON, TILE_H, BEACON, BEACON);
        }
        sheet.define_animation(
            "pulse",
            first_beacon,
            first_beacon + BEACON_FRAMES as usize - 1,
            0.15,
            true,
        );
        let sheet = Rc::new(sheet);

        let mut map = build_map();
        map.set_tileset(Some(Rc::clone(&sheet)));

        let mut beacon = AnimationPlayer::new(Rc::clone(&sheet));
        beacon.play("pulse", false);

        Ok(Self {
            sheet,
            map,
            mapper: IsoMapper::new(TILE_W as f32, TILE_H as f32),
            beacon,
            pan: Pan::default(),
            last_stats: TileRenderStats::default(),
        })
    }

    /// Puts the map center in the middle of a `width` x `height` view.
    pub fn center_camera(&mut self, width: u32, height: u32) {
        let mid = (MAP_SIZE / 2) as i32;
        let center = IsoMapper::new(TILE_W as f32, TILE_H as f32).tile_to_screen_i(mid, mid);
        self.mapper
            .set_camera(center - Vec2::new(width as f32 * 0.5, height as f32 * 0.5));
    }

    pub fn update(&mut self, dt: f32) {
        let step = self.pan.direction() * (CAMERA_SPEED * dt);
        self.mapper.set_camera(self.mapper.camera() + step);
        self.beacon.update(dt);
    }

    /// Draws the map and beacon into an already begun frame.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let (w, h) = renderer.target_size();
        renderer.set_projection(0.0, w as f32, h as f32, 0.0);
        renderer.clear();

        let view = Rect::new(0.0, 0.0, w as f32, h as f32);
        self.last_stats = self.map.render(renderer, &self.mapper, view);

        let mid = (MAP_SIZE / 2) as i32;
        let lift = self.map.at(mid, mid).height as f32 * self.mapper.tile_height();
        let base = self.mapper.tile_to_screen_i(mid, mid) - Vec2::new(0.0, lift);
        renderer.begin_batch();
        renderer.draw_sprite(
            &Sprite::new(base, Vec2::new(BEACON as f32, BEACON as f32), self.beacon.current_region())
                .with_origin(Vec2::new(0.5, 1.0)),
        );
        renderer.end_batch();

        // Shadow strip along the top edge, drawn untextured.
        renderer.draw_quad(
            Vec2::new(w as f32 * 0.5, 8.0),
            Vec2::new(w as f32, 16.0),
            Color::new(0.0, 0.0, 0.0, 0.35),
        );
    }

    pub fn last_stats(&self) -> TileRenderStats {
        self.last_stats
    }

    /// Releases the atlas texture.
    pub fn unload(&mut self, renderer: &mut dyn Renderer) {
        renderer.destroy_texture(self.sheet.texture());
    }
}

fn build_atlas() -> Image {
    let mut img = Image::create(TILE_W * 4, TILE_H + BEACON);

    for (i, color) in TILE_COLORS.iter().enumerate() {
        let ox = i as u32 * TILE_W;
        let (hw, hh) = (TILE_W as f32 * 0.5, TILE_H as f32 * 0.5);
        for y in 0..TILE_H {
            for x in 0..TILE_W {
                let dx = (x as f32 + 0.5 - hw).abs() / hw;
                let dy = (y as f32 + 0.5 - hh).abs() / hh;
                let d = dx + dy;
                if d <= 1.0 {
                    let rgba = if d > 0.9 { darken(*color) } else { *color };
                    img.set_pixel(ox + x, y, rgba);
                }
            }
        }
    }

    for i in 0..BEACON_FRAMES {
        let ox = i * BEACON;
        let glow = 120 + 45 * i as u8;
        img.fill_rect(ox + 12, TILE_H + 8, 8, 24, [70, 70, 80, 255]);
        img.fill_rect(ox + 10, TILE_H + 2, 12, 8, [glow, glow / 2, 30, 255]);
    }

    img
}

fn darken([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    [r / 2, g / 2, b / 2, a]
}

fn build_map() -> TileMap {
    let mut map = TileMap::new(MAP_SIZE, MAP_SIZE);
    let c = (MAP_SIZE / 2) as i32;
    for y in 0..MAP_SIZE as i32 {
        for x in 0..MAP_SIZE as i32 {
            let d2 = (x - c).pow(2) + (y - c).pow(2);
            let tile = match d2 {
                0..=8 => Tile::new(STONE).with_height(2),
                9..=30 => Tile::new(STONE).with_height(1),
                31..=120 => Tile::new(GRASS),
                121..=170 => Tile::new(DIRT),
                _ => Tile::new(WATER),
            };
            map.set(x, y, tile);
        }
    }
    // A road across the island.
    for x in 4..(MAP_SIZE as i32 - 4) {
        if map.at(x, c + 6).tile_id == GRASS {
            map.set(x, c + 6, Tile::new(DIRT));
        }
    }
    map
}
