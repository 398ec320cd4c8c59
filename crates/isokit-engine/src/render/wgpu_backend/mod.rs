//! GPU backend on wgpu (Vulkan, Metal, D3D12, GL).
//!
//! Replays the recorded passes with one sprite pipeline. Untextured quads sample a 1x1
//! white texture so every draw goes through the same shader.

mod pipeline;

use crate::coords::{Color, PixelViewport, Vec2};
use crate::device::{Gpu, GpuFrame, SurfaceErrorAction, SurfaceTarget};
use crate::texture::{validate_pixels, TextureFilter, TextureHandle, TextureInfo, TextureRegion, TextureWrap};

use self::pipeline::{GpuTexture, SpritePipeline};
use super::session::DrawSession;
use super::{FrameState, FrameStats, RenderTarget, Renderer, RendererConfig, Sprite};

pub struct WgpuRenderer<'w> {
    config: RendererConfig,
    target: RenderTarget<'w>,
    size: (u32, u32),

    gpu: Option<Gpu<'w>>,
    pipeline: SpritePipeline,
    white: Option<GpuTexture>,
    session: DrawSession<GpuTexture>,

    frame: Option<GpuFrame>,
    last_surface_error: Option<SurfaceErrorAction>,
}

impl<'w> WgpuRenderer<'w> {
    pub fn new(config: RendererConfig, target: RenderTarget<'w>) -> Self {
        let size = target.size();
        Self {
            session: DrawSession::new(&config, size.0, size.1),
            config,
            target,
            size,
            gpu: None,
            pipeline: SpritePipeline::default(),
            white: None,
            frame: None,
            last_surface_error: None,
        }
    }

    /// Outcome of the last failed frame acquisition, if any. `Fatal` means the host
    /// should shut down.
    pub fn last_surface_error(&self) -> Option<SurfaceErrorAction> {
        self.last_surface_error
    }

    fn init_gpu(&mut self) -> anyhow::Result<()> {
        let mut init = self.config.gpu.clone();
        if let Some(backends) = self.config.api.wgpu_backends() {
            init.backends = backends;
        }
        let target = match self.target {
            RenderTarget::Window(w) => SurfaceTarget::Window(w),
            RenderTarget::Offscreen { width, height } => SurfaceTarget::Offscreen { width, height },
        };

        let gpu = pollster::block_on(Gpu::new(target, init))?;
        self.pipeline.ensure(gpu.device(), gpu.target_format());
        self.white = self.pipeline.create_texture(
            gpu.device(),
            gpu.queue(),
            &[255; 4],
            1,
            1,
            TextureFilter::Nearest,
            TextureWrap::Clamp,
        );
        anyhow::ensure!(self.white.is_some(), "sprite pipeline not ready");
        self.size = gpu.size();
        self.gpu = Some(gpu);
        Ok(())
    }

    fn replay(&mut self, frame: &mut GpuFrame) {
        let Some(gpu) = self.gpu.as_ref() else { return };
        let Some(white) = self.white.as_ref() else { return };
        let recorder = &self.session.recorder;
        let textures = &self.session.textures;

        self.pipeline
            .upload(gpu.device(), gpu.queue(), gpu.size(), recorder.vertices());

        for pass in recorder.passes() {
            if pass.clear.is_none() && pass.draws.is_empty() {
                continue;
            }
            let clear = pass.clear.map(|c| wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            });
            self.pipeline
                .encode_pass(&mut frame.encoder, &frame.view, clear, &pass.draws, |d| {
                    match d.texture {
                        None => Some(white),
                        Some(h) => textures.resolve(h),
                    }
                });
        }
    }
}

impl Renderer for WgpuRenderer<'_> {
    fn backend_name(&self) -> &'static str {
        "wgpu"
    }

    fn initialize(&mut self) -> bool {
        if self.gpu.is_some() {
            return true;
        }
        match self.init_gpu() {
            Ok(()) => true,
            Err(e) => {
                log::error!("wgpu renderer failed to initialize: {e:#}");
                self.pipeline = SpritePipeline::default();
                self.white = None;
                false
            }
        }
    }

    fn shutdown(&mut self) {
        if self.gpu.is_none() {
            return;
        }
        self.frame = None;
        self.session.reset();
        self.white = None;
        self.pipeline = SpritePipeline::default();
        self.gpu = None;
        log::info!("wgpu renderer shut down");
    }

    fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    fn max_texture_size(&self) -> u32 {
        self.gpu
            .as_ref()
            .map(|g| g.device().limits().max_texture_dimension_2d)
            .unwrap_or(0)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.session.recorder.resize(width, height);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(width, height);
        }
    }

    fn target_size(&self) -> (u32, u32) {
        self.size
    }

    fn begin_frame(&mut self) {
        if self.frame.take().is_some() {
            log::warn!("begin_frame with an acquired frame pending; dropping it");
        }
        let acquired = match self.gpu.as_mut() {
            None => None,
            Some(gpu) => match gpu.begin_frame() {
                Ok(frame) => Some(frame),
                Err(e) => {
                    let action = gpu.handle_surface_error(e);
                    log::debug!("frame acquisition failed: {action:?}");
                    if action == SurfaceErrorAction::Fatal {
                        log::error!("surface out of memory");
                    }
                    self.last_surface_error = Some(action);
                    None
                }
            },
        };
        if acquired.is_some() {
            self.last_surface_error = None;
        }
        self.session.begin_frame(acquired.is_some());
        self.frame = acquired;
    }

    fn end_frame(&mut self) {
        self.session.close_batch();
        if let Some(mut frame) = self.frame.take() {
            if self.session.recorder.is_recording() {
                self.replay(&mut frame);
            }
            if let Some(gpu) = self.gpu.as_ref() {
                gpu.submit(frame);
            }
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
        let Some(gpu) = self.gpu.as_ref() else {
            log::warn!("create_texture before initialize");
            return TextureHandle::INVALID;
        };
        let max = gpu.device().limits().max_texture_dimension_2d;
        if !validate_pixels(pixels, width, height, max) {
            log::warn!(
                "create_texture: rejected {width}x{height} upload of {} bytes",
                pixels.len()
            );
            return TextureHandle::INVALID;
        }
        let Some(texture) = self.pipeline.create_texture(
            gpu.device(),
            gpu.queue(),
            pixels,
            width,
            height,
            filter,
            wrap,
        ) else {
            return TextureHandle::INVALID;
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
        let gpu = self.gpu.as_ref()?;
        match gpu.read_offscreen() {
            Ok(pixels) => pixels,
            Err(e) => {
                log::warn!("readback failed: {e:#}");
                None
            }
        }
    }
}

impl Drop for WgpuRenderer<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
