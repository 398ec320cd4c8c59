//! Renderer contract and backends.
//!
//! Every backend implements [`Renderer`]. Recording is shared (see `FrameRecorder`): draws
//! are transformed to framebuffer pixels on the CPU, then each backend replays the same
//! passes. The wgpu backend rasterizes on the GPU, the software backend on the CPU with
//! matching fill and blend rules, so both produce the same pixels for the same input.

mod batch;
mod factory;
mod frame;
mod projection;
mod session;
pub mod software;
mod vertex;
pub mod wgpu_backend;

pub use batch::{BatchSink, BatchStats, SpriteBatch, DEFAULT_MAX_QUADS};
pub use factory::{create_renderer, GraphicsApi, RenderTarget, RendererConfig, BACKEND_ENV};
pub use frame::{DrawCall, FrameRecorder, FrameState, FrameStats, RenderPassRecord};
pub use projection::Ortho;
pub use software::SoftwareRenderer;
pub use vertex::{Sprite, Vertex, VERTICES_PER_QUAD};
pub use wgpu_backend::WgpuRenderer;

use crate::coords::{Color, Vec2};
use crate::texture::{TextureFilter, TextureHandle, TextureInfo, TextureRegion, TextureWrap};

/// The renderer contract.
///
/// Failure never surfaces as a panic or an error value on the draw path: invalid input is
/// dropped and counted in [`FrameStats::dropped_draws`]. Frame acquisition failures mark
/// the frame invalid; its draws are dropped silently.
pub trait Renderer {
    /// Short backend identifier (`"wgpu"`, `"software"`).
    fn backend_name(&self) -> &'static str;

    /// Acquires the device and target. Returns `false` on failure; calling it again after
    /// success is a no-op returning `true`.
    fn initialize(&mut self) -> bool;

    /// Releases every texture and the device. Idempotent.
    fn shutdown(&mut self);

    fn is_initialized(&self) -> bool;

    /// Largest accepted texture edge in pixels (0 before initialization).
    fn max_texture_size(&self) -> u32;

    /// Resizes the target; the viewport is reset to cover it.
    fn resize(&mut self, width: u32, height: u32);

    fn target_size(&self) -> (u32, u32);

    // ── frame ────────────────────────────────────────────────────────────────

    fn begin_frame(&mut self);

    /// Flushes any open batch, submits and presents.
    fn end_frame(&mut self);

    fn frame_state(&self) -> FrameState;

    /// Counters of the current frame, or of the last one while idle.
    fn frame_stats(&self) -> FrameStats;

    // ── state ────────────────────────────────────────────────────────────────

    fn set_clear_color(&mut self, color: Color);

    /// Clears the whole target with the clear color.
    fn clear(&mut self);

    /// Maps clip space onto the pixel rectangle `(x, y, width, height)`, top-left origin.
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Orthographic projection for subsequent draws; degenerate bounds are ignored.
    fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32);

    // ── resources ────────────────────────────────────────────────────────────

    /// Uploads tightly packed RGBA8 rows (top row first).
    ///
    /// Returns [`TextureHandle::INVALID`] for a size/length mismatch, a zero or oversize
    /// dimension, or a backend allocation failure.
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> TextureHandle;

    /// Unknown or already destroyed handles are ignored.
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Zeroed info for unknown handles.
    fn texture_info(&self, texture: TextureHandle) -> TextureInfo;

    // ── immediate draws ──────────────────────────────────────────────────────

    /// Solid quad centered on `position`.
    fn draw_quad(&mut self, position: Vec2, size: Vec2, color: Color);

    /// Textured quad centered on `position`, modulated by `tint`.
    fn draw_textured_quad(&mut self, position: Vec2, size: Vec2, region: TextureRegion, tint: Color);

    // ── batching ─────────────────────────────────────────────────────────────

    fn begin_batch(&mut self);

    /// Only valid between `begin_batch` and `end_batch`; dropped otherwise, and for
    /// invalid or destroyed textures.
    fn draw_sprite(&mut self, sprite: &Sprite);

    fn end_batch(&mut self);

    // ── readback ─────────────────────────────────────────────────────────────

    /// RGBA8 contents of the target as of the last completed frame, when the target
    /// supports readback (offscreen and software targets).
    fn read_pixels(&mut self) -> Option<Vec<u8>>;
}
