use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, bail};

use crate::render::Renderer;
use crate::texture::{TextureFilter, TextureHandle, TextureRegion, TextureWrap};

use super::Image;

/// A named sub-rectangle of the sheet's texture.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    pub name: String,
    pub region: TextureRegion,
    pub width: u32,
    pub height: u32,
}

/// A sequence of frame indices played at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub frames: Vec<usize>,
    /// Seconds per frame.
    pub frame_duration: f32,
    pub looping: bool,
}

impl Animation {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration
    }
}

/// Keeps the last frame of a finished one-shot animation selected.
const CLAMP_EPSILON: f32 = 1e-4;

/// Texture atlas with indexed/named frames and animations.
///
/// The sheet does not own the texture's lifetime; call [`SpriteSheet::unload`] with the
/// renderer that created it.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    texture: TextureHandle,
    texture_width: u32,
    texture_height: u32,
    frames: Vec<SpriteFrame>,
    frame_by_name: HashMap<String, usize>,
    animations: HashMap<String, Animation>,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an image file and uploads it as the sheet texture (clamped wrap).
    pub fn load(
        &mut self,
        renderer: &mut dyn Renderer,
        path: impl AsRef<Path>,
        filter: TextureFilter,
    ) -> Result<()> {
        let image = Image::load_from_file(path)?;
        self.load_image(renderer, &image, filter)
    }

    /// Uploads an in-memory image as the sheet texture.
    pub fn load_image(
        &mut self,
        renderer: &mut dyn Renderer,
        image: &Image,
        filter: TextureFilter,
    ) -> Result<()> {
        let texture = image.upload(renderer, filter, TextureWrap::Clamp);
        if !texture.is_valid() {
            bail!(
                "renderer rejected {}x{} sprite sheet texture",
                image.width(),
                image.height()
            );
        }
        self.set_texture(texture, image.width(), image.height());
        Ok(())
    }

    /// Uses an existing texture of the given pixel size.
    pub fn set_texture(&mut self, texture: TextureHandle, width: u32, height: u32) {
        self.texture = texture;
        self.texture_width = width;
        self.texture_height = height;
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    #[inline]
    pub fn texture_size(&self) -> (u32, u32) {
        (self.texture_width, self.texture_height)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.texture.is_valid()
    }

    // ── frames ───────────────────────────────────────────────────────────────

    /// Replaces all frames with a uniform grid named `frame_0`, `frame_1`, ... in row-major
    /// order.
    ///
    /// `columns`/`rows` default to as many cells as fit. `padding` separates cells,
    /// `margin` surrounds the grid.
    pub fn define_grid(
        &mut self,
        cell_width: u32,
        cell_height: u32,
        columns: Option<u32>,
        rows: Option<u32>,
        padding: u32,
        margin: u32,
    ) {
        if !self.texture.is_valid() {
            log::warn!("define_grid on a sheet without texture; ignored");
            return;
        }
        if cell_width == 0 || cell_height == 0 {
            log::warn!("define_grid with zero cell size; ignored");
            return;
        }

        let fit = |usable: u32, cell: u32| {
            usable.saturating_add(padding) / cell.saturating_add(padding)
        };
        let usable_w = self.texture_width.saturating_sub(margin.saturating_mul(2));
        let usable_h = self.texture_height.saturating_sub(margin.saturating_mul(2));
        let columns = columns.unwrap_or_else(|| fit(usable_w, cell_width));
        let rows = rows.unwrap_or_else(|| fit(usable_h, cell_height));

        self.frames.clear();
        self.frame_by_name.clear();

        // Cells are laid out in increasing order, so the first one past the edge ends
        // its row (or the whole grid).
        for row in 0..rows {
            let Some(y) = cell_origin(margin, row, cell_height, padding, self.texture_height)
            else {
                break;
            };
            for col in 0..columns {
                let Some(x) = cell_origin(margin, col, cell_width, padding, self.texture_width)
                else {
                    break;
                };
                let name = format!("frame_{}", self.frames.len());
                self.push_frame(name, x, y, cell_width, cell_height);
            }
        }
        if self.frames.is_empty() {
            log::warn!("define_grid produced no frames inside the texture");
        }
    }

    /// Adds a named frame at a pixel rectangle. Reusing a name repoints it.
    pub fn define_frame(&mut self, name: &str, x: u32, y: u32, width: u32, height: u32) {
        if !self.texture.is_valid() {
            log::warn!("define_frame `{name}` on a sheet without texture; ignored");
            return;
        }
        self.push_frame(name.to_owned(), x, y, width, height);
    }

    fn push_frame(&mut self, name: String, x: u32, y: u32, width: u32, height: u32) {
        let region = TextureRegion::from_pixels(
            self.texture,
            self.texture_width,
            self.texture_height,
            x,
            y,
            width,
            height,
        );
        self.frame_by_name.insert(name.clone(), self.frames.len());
        self.frames.push(SpriteFrame {
            name,
            region,
            width,
            height,
        });
    }

    #[inline]
    pub fn frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.frames.get(index)
    }

    pub fn frame_named(&self, name: &str) -> Option<&SpriteFrame> {
        self.frame_index(name).and_then(|i| self.frames.get(i))
    }

    #[inline]
    pub fn frame_index(&self, name: &str) -> Option<usize> {
        self.frame_by_name.get(name).copied()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Largest frame width and height over all frames; `(0, 0)` when there are none.
    pub fn max_frame_size(&self) -> (u32, u32) {
        self.frames
            .iter()
            .fold((0, 0), |(w, h), f| (w.max(f.width), h.max(f.height)))
    }

    // ── animations ───────────────────────────────────────────────────────────

    /// Defines an animation over the inclusive frame range `start..=end`; indices past
    /// the last frame are skipped.
    pub fn define_animation(
        &mut self,
        name: &str,
        start: usize,
        end: usize,
        frame_duration: f32,
        looping: bool,
    ) {
        let frames = match self.frames.len().checked_sub(1) {
            Some(last) if start <= last && start <= end => (start..=end.min(last)).collect(),
            _ => Vec::new(),
        };
        self.insert_animation(name, frames, frame_duration, looping);
    }

    /// Defines an animation from frame names; unknown names are skipped.
    pub fn define_animation_named(
        &mut self,
        name: &str,
        frame_names: &[&str],
        frame_duration: f32,
        looping: bool,
    ) {
        let frames = frame_names
            .iter()
            .filter_map(|n| self.frame_index(n))
            .collect();
        self.insert_animation(name, frames, frame_duration, looping);
    }

    fn insert_animation(&mut self, name: &str, frames: Vec<usize>, frame_duration: f32, looping: bool) {
        if frames.is_empty() {
            log::debug!("animation `{name}` has no frames");
        }
        self.animations.insert(
            name.to_owned(),
            Animation {
                name: name.to_owned(),
                frames,
                frame_duration,
                looping,
            },
        );
    }

    #[inline]
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Frame index shown by animation `name` at `time` seconds.
    ///
    /// Looping animations wrap (negative times included); one-shots clamp to their last
    /// frame. Unknown or empty animations yield 0.
    pub fn animation_frame_index(&self, name: &str, time: f32) -> usize {
        let Some(anim) = self.animation(name) else { return 0 };
        let Some(&first) = anim.frames.first() else { return 0 };

        let total = anim.total_duration();
        if total.is_nan() || total <= 0.0 || !time.is_finite() {
            return first;
        }

        let t = if anim.looping {
            time.rem_euclid(total)
        } else {
            time.min(total - CLAMP_EPSILON).max(0.0)
        };

        let n = ((t / anim.frame_duration) as usize).min(anim.frames.len() - 1);
        anim.frames[n]
    }

    /// Region shown by animation `name` at `time`, or the whole texture when the
    /// resolved frame does not exist.
    pub fn animation_frame(&self, name: &str, time: f32) -> TextureRegion {
        let index = self.animation_frame_index(name, time);
        self.frame(index)
            .map(|f| f.region)
            .unwrap_or_else(|| TextureRegion::full(self.texture))
    }

    /// Destroys the texture through `renderer` and forgets every frame and animation.
    pub fn unload(&mut self, renderer: &mut dyn Renderer) {
        if self.texture.is_valid() {
            renderer.destroy_texture(self.texture);
        }
        *self = Self::default();
    }
}

/// Pixel origin of grid cell `index`, or `None` once the cell leaves `extent`.
fn cell_origin(margin: u32, index: u32, cell: u32, padding: u32, extent: u32) -> Option<u32> {
    let stride = u64::from(cell) + u64::from(padding);
    let origin = u64::from(margin).checked_add(stride.checked_mul(u64::from(index))?)?;
    if origin.checked_add(u64::from(cell))? > u64::from(extent) {
        return None;
    }
    u32::try_from(origin).ok()
}
