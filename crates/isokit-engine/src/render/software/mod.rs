//! CPU reference backend.
//!
//! Replays the recorded passes through [`raster`] into an in-memory RGBA8 framebuffer.
//! It needs no device, which makes it the default for headless rendering and tests.

mod raster;

use crate::coords::{Color, PixelViewport, Vec2};
use crate::texture::{validate_pixels, TextureFilter, TextureHandle, TextureInfo, TextureRegion, TextureWrap};

use self::raster::{Framebuffer, SoftTexture};
use super::session::DrawSession;
use super::{FrameState, FrameStats, Renderer, RendererConfig, Sprite};

/// Largest texture edge the software backend accepts.
pub const SOFTWARE_MAX_TEXTURE_SIZE: u32 = 8192;

pub struct SoftwareRenderer {
    size: (u32, u32),
    framebuffer: Option<Framebuffer>,
    session: DrawSession<SoftTexture>,
}

impl SoftwareRenderer {
    pub fn new(config: RendererConfig, width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            framebuffer: None,
            session: DrawSession::new(&config, width, height),
        }
    }

    fn replay(&mut self) {
        let Some(fb) = self.framebuffer.as_mut() else { return };
        let recorder = &self.session.recorder;
        let textures = &self.session.textures;
        let vertices = recorder.vertices();

        for pass in recorder.passes() {
            if let Some(color) = pass.clear {
                fb.clear(color);
            }
            for draw in &pass.draws {
                let texture = match draw.texture {
                    None => None,
                    Some(handle) => match textures.resolve(handle) {
                        Some(t) => Some(t),
                        None => continue,
                    },
                };
                let first = draw.first_vertex as usize;
                let range = first..first + draw.vertex_count as usize;
                fb.draw_triangles(&vertices[range], draw.scissor, texture);
            }
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn backend_name(&self) -> &'static str {
        "software"
    }

    fn initialize(&mut self) -> bool {
        if self.framebuffer.is_some() {
            return true;
        }
        self.framebuffer = Some(Framebuffer::new(self.size.0, self.size.1));
        log::info!("software renderer ready: {}x{}", self.size.0, self.size.1);
        true
    }

    fn shutdown(&mut self) {
        if self.framebuffer.take().is_none() {
            return;
        }
        self.session.reset();
        log::info!("software renderer shut down");
    }

    fn is_initialized(&self) -> bool {
        self.framebuffer.is_some()
    }

    fn max_texture_size(&self) -> u32 {
        if self.is_initialized() {
            SOFTWARE_MAX_TEXTURE_SIZE
        } else {
            0
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.session.recorder.resize(width, height);
        if let Some(fb) = self.framebuffer.as_mut() {
            fb.resize(width, height);
        }
    }

    fn target_size(&self) -> (u32, u32) {
        self.size
    }

    fn begin_frame(&mut self) {
        let valid = self.framebuffer.is_some() && self.size.0 > 0 && self.size.1 > 0;
        self.session.begin_frame(valid);
    }

    fn end_frame(&mut self) {
        self.session.close_batch();
        if self.session.recorder.is_recording() {
            self.replay();
        }
        self.session.finish_frame();
    }

    fn frame_state(&self) -> FrameState {
        self.session.recorder.state()
    }

    fn frame_stats(&self) -> FrameStats {
        self.session.recorder.stats()
    }

    fn set_clear_color(&mut self, color: Color) {
        self.session.recorder.set_clear_color(color);
    }

    fn clear(&mut self) {
        self.session.recorder.clear();
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.session
            .recorder
            .set_viewport(PixelViewport::new(x, y, width, height));
    }

    fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.session.recorder.set_projection(left, right, bottom, top);
    }

    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> TextureHandle {
        if !self.is_initialized() {
            log::warn!("create_texture before initialize");
            return TextureHandle::INVALID;
        }
        if !validate_pixels(pixels, width, height, SOFTWARE_MAX_TEXTURE_SIZE) {
            log::warn!(
                "create_texture: rejected {width}x{height} upload of {} bytes",
                pixels.len()
            );
            return TextureHandle::INVALID;
        }
        let texture = SoftTexture {
            width,
            height,
            filter,
            wrap,
            texels: pixels.to_vec(),
        };
        self.session
            .textures
            .insert(TextureInfo::new(width, height, filter, wrap), texture)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.session.destroy_texture(texture);
    }

    fn texture_info(&self, texture: TextureHandle) -> TextureInfo {
        self.session.texture_info(texture)
    }

    fn draw_quad(&mut self, position: Vec2, size: Vec2, color: Color) {
        self.session.draw_quad(position, size, color);
    }

    fn draw_textured_quad(&mut self, position: Vec2, size: Vec2, region: TextureRegion, tint: Color) {
        self.session.draw_textured_quad(position, size, region, tint);
    }

    fn begin_batch(&mut self) {
        self.session.begin_batch();
    }

    fn draw_sprite(&mut self, sprite: &Sprite) {
        self.session.draw_sprite(sprite);
    }

    fn end_batch(&mut self) {
        self.session.end_batch();
    }

    fn read_pixels(&mut self) -> Option<Vec<u8>> {
        self.framebuffer.as_ref().map(|fb| fb.pixels().to_vec())
    }
}

impl Drop for SoftwareRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(w: u32, h: u32) -> SoftwareRenderer {
        let mut r = SoftwareRenderer::new(RendererConfig::default(), w, h);
        assert!(r.initialize());
        r.set_projection(0.0, w as f32, h as f32, 0.0);
        r
    }

    fn pixel(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * w + x) * 4) as usize;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    #[test]
    fn clear_then_quad() {
        let mut r = renderer(8, 8);
        r.set_clear_color(Color::black());
        r.begin_frame();
        r.clear();
        r.draw_quad(Vec2::new(4.0, 4.0), Vec2::new(4.0, 4.0), Color::red());
        r.end_frame();

        let px = r.read_pixels().unwrap();
        assert_eq!(pixel(&px, 8, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&px, 8, 2, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 8, 5, 5), [255, 0, 0, 255]);
        assert_eq!(pixel(&px, 8, 6, 6), [0, 0, 0, 255]);
    }

    #[test]
    fn textured_quad_samples_top_row_first() {
        let mut r = renderer(2, 2);
        #[rustfmt::skip]
        let texels = [
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   255, 255, 255, 255,
        ];
        let tex = r.create_texture(&texels, 2, 2, TextureFilter::Nearest, TextureWrap::Clamp);
        assert!(tex.is_valid());

        r.begin_frame();
        r.draw_textured_quad(
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
            TextureRegion::full(tex),
            Color::white(),
        );
        r.end_frame();

        assert_eq!(r.read_pixels().unwrap(), texels.to_vec());
    }

    #[test]
    fn rejected_uploads_return_invalid() {
        let mut r = renderer(2, 2);
        let bad = r.create_texture(&[0; 15], 2, 2, TextureFilter::Nearest, TextureWrap::Clamp);
        assert_eq!(bad, TextureHandle::INVALID);
        let zero = r.create_texture(&[], 0, 0, TextureFilter::Nearest, TextureWrap::Clamp);
        assert_eq!(zero, TextureHandle::INVALID);
    }

    #[test]
    fn uninitialized_renderer_reports_nothing() {
        let mut r = SoftwareRenderer::new(RendererConfig::default(), 4, 4);
        assert_eq!(r.max_texture_size(), 0);
        let t = r.create_texture(&[0; 4], 1, 1, TextureFilter::Nearest, TextureWrap::Clamp);
        assert!(!t.is_valid());
        r.begin_frame();
        assert_eq!(r.frame_state(), FrameState::Invalid);
        r.draw_quad(Vec2::zero(), Vec2::new(1.0, 1.0), Color::red());
        r.end_frame();
        assert_eq!(r.frame_stats().dropped_draws, 1);
        assert!(r.read_pixels().is_none());
    }

    #[test]
    fn zero_sized_target_yields_invalid_frames() {
        let mut r = renderer(4, 4);
        r.resize(0, 0);
        r.begin_frame();
        assert_eq!(r.frame_state(), FrameState::Invalid);
        r.end_frame();
        assert_eq!(r.frame_state(), FrameState::Idle);
    }

    #[test]
    fn shutdown_is_idempotent_and_burns_handles() {
        let mut r = renderer(2, 2);
        let a = r.create_texture(&[255; 4], 1, 1, TextureFilter::Nearest, TextureWrap::Clamp);
        r.shutdown();
        r.shutdown();
        assert_eq!(r.texture_info(a), TextureInfo::default());
        assert!(r.initialize());
        let b = r.create_texture(&[255; 4], 1, 1, TextureFilter::Nearest, TextureWrap::Clamp);
        assert_ne!(a, b);
    }
}
