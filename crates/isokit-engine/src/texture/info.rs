use super::TextureHandle;

/// Sampling filter used for both minification and magnification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureFilter {
    /// Pixel-art friendly; the default for sprite sheets.
    #[default]
    Nearest,
    Linear,
}

/// Addressing mode for UVs outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    Clamp,
    Repeat,
}

/// Texture description. `TextureInfo::default()` is the zeroed "not found" value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

impl TextureInfo {
    #[inline]
    pub const fn new(width: u32, height: u32, filter: TextureFilter, wrap: TextureWrap) -> Self {
        Self { width, height, filter, wrap }
    }

    /// True for the zeroed value returned for unknown handles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A sub-image of a texture, addressed with normalized UVs.
///
/// `v` grows downward: `v0` is the top row of the region, matching the row order of
/// uploaded pixel data.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureRegion {
    pub texture: TextureHandle,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl Default for TextureRegion {
    fn default() -> Self {
        Self::full(TextureHandle::INVALID)
    }
}

impl TextureRegion {
    #[inline]
    pub const fn new(texture: TextureHandle, u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { texture, u0, v0, u1, v1 }
    }

    /// The whole texture.
    #[inline]
    pub const fn full(texture: TextureHandle) -> Self {
        Self::new(texture, 0.0, 0.0, 1.0, 1.0)
    }

    /// Region covering the pixel rectangle `(x, y, w, h)` of a `tex_w` x `tex_h` texture.
    ///
    /// A zero-sized texture yields a degenerate region at the origin.
    pub fn from_pixels(
        texture: TextureHandle,
        tex_w: u32,
        tex_h: u32,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    ) -> Self {
        if tex_w == 0 || tex_h == 0 {
            return Self::new(texture, 0.0, 0.0, 0.0, 0.0);
        }
        let tw = tex_w as f32;
        let th = tex_h as f32;
        Self::new(
            texture,
            x as f32 / tw,
            y as f32 / th,
            (x as f32 + w as f32) / tw,
            (y as f32 + h as f32) / th,
        )
    }
}

/// Checks an RGBA8 upload: non-zero size within `max_size`, exactly `w * h * 4` bytes.
pub fn validate_pixels(pixels: &[u8], width: u32, height: u32, max_size: u32) -> bool {
    if width == 0 || height == 0 || width > max_size || height > max_size {
        return false;
    }
    let Some(expected) = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
    else {
        return false;
    };
    pixels.len() == expected
}
