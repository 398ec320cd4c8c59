use std::path::Path;

use anyhow::{Context, Result};

use crate::render::Renderer;
use crate::texture::{TextureFilter, TextureHandle, TextureWrap};

/// RGBA8 image in CPU memory, rows top to bottom.
///
/// Everything is converted to four channels on load, which is the layout
/// `Renderer::create_texture` expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    inner: image::RgbaImage,
}

impl Image {
    /// Decodes a file; the format is guessed from its contents and extension.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("failed to load image {}", path.display()))?;
        Ok(Self {
            inner: decoded.to_rgba8(),
        })
    }

    pub fn load_from_memory(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).context("failed to decode image bytes")?;
        Ok(Self {
            inner: decoded.to_rgba8(),
        })
    }

    /// Transparent black image for procedural content.
    pub fn create(width: u32, height: u32) -> Self {
        Self {
            inner: image::RgbaImage::new(width, height),
        }
    }

    /// Wraps tightly packed RGBA8 rows; `None` if the length does not match.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        image::RgbaImage::from_raw(width, height, pixels).map(|inner| Self { inner })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        self.inner.as_raw()
    }

    /// `None` out of bounds.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.inner.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Writes one pixel; out-of-bounds writes are ignored and return `false`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        match self.inner.get_pixel_mut_checked(x, y) {
            Some(p) => {
                p.0 = rgba;
                true
            }
            None => false,
        }
    }

    /// Fills the intersection of `(x, y, w, h)` with the image.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) {
        let x1 = x.saturating_add(w).min(self.width());
        let y1 = y.saturating_add(h).min(self.height());
        for py in y..y1 {
            for px in x..x1 {
                self.inner.put_pixel(px, py, image::Rgba(rgba));
            }
        }
    }

    /// Encodes the image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.inner
            .save(path)
            .with_context(|| format!("failed to write image {}", path.display()))
    }

    /// Uploads the image as a texture. Invalid handle on failure.
    pub fn upload(
        &self,
        renderer: &mut dyn Renderer,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> TextureHandle {
        renderer.create_texture(self.data(), self.width(), self.height(), filter, wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_transparent() {
        let img = Image::create(3, 2);
        assert_eq!(img.data().len(), 3 * 2 * 4);
        assert_eq!(img.pixel_at(2, 1), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel_at(3, 0), None);
    }

    #[test]
    fn set_pixel_respects_bounds() {
        let mut img = Image::create(2, 2);
        assert!(img.set_pixel(1, 0, [1, 2, 3, 4]));
        assert!(!img.set_pixel(2, 0, [9; 4]));
        // Row-major, top row first.
        assert_eq!(&img.data()[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn fill_rect_clips() {
        let mut img = Image::create(4, 4);
        img.fill_rect(2, 2, 10, 10, [255; 4]);
        assert_eq!(img.pixel_at(3, 3), Some([255; 4]));
        assert_eq!(img.pixel_at(1, 3), Some([0; 4]));
    }

    #[test]
    fn png_round_trip_through_memory() {
        let mut img = Image::create(2, 1);
        img.set_pixel(0, 0, [10, 20, 30, 255]);
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img.inner.clone())
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let back = Image::load_from_memory(bytes.get_ref()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(Image::load_from_memory(b"not an image").is_err());
    }

    #[test]
    fn from_rgba8_checks_length() {
        assert!(Image::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(Image::from_rgba8(2, 2, vec![0; 12]).is_none());
    }
}
