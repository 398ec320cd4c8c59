use crate::coords::{Color, Vec2};
use crate::texture::{TextureHandle, TextureInfo, TextureRegion, TextureRegistry};

use super::batch::{BatchSink, SpriteBatch};
use super::frame::FrameRecorder;
use super::{RendererConfig, Sprite, Vertex};

/// Backend-independent half of a renderer: texture table, recorder and batcher.
///
/// Backends own one of these and delegate every recording operation to it; only
/// resource creation and replay differ per backend.
pub(crate) struct DrawSession<T> {
    pub textures: TextureRegistry<T>,
    pub recorder: FrameRecorder,
    pub batch: SpriteBatch,
}

/// Forwards batch flushes into the recorder, dropping runs whose texture was released.
///
/// Sprites queued before a `destroy_texture` still flush while the texture is parked.
struct RecordingSink<'a, T> {
    recorder: &'a mut FrameRecorder,
    textures: &'a TextureRegistry<T>,
}

impl<T> BatchSink for RecordingSink<'_, T> {
    fn submit(&mut self, texture: TextureHandle, vertices: &[Vertex]) {
        if self.textures.resolve(texture).is_none() {
            self.recorder.drop_draw("batch flush with released texture");
            return;
        }
        self.recorder.record_flush(texture, vertices);
    }
}

impl<T> DrawSession<T> {
    pub fn new(config: &RendererConfig, width: u32, height: u32) -> Self {
        Self {
            textures: TextureRegistry::new(config.retire_latency_frames),
            recorder: FrameRecorder::new(width, height, config.clear_color),
            batch: SpriteBatch::new(config.max_batch_quads),
        }
    }

    pub fn begin_frame(&mut self, valid: bool) {
        if self.batch.is_active() {
            log::warn!("batch left open across frames; discarded");
            self.batch.discard();
        }
        self.recorder.begin(valid);
    }

    /// Closes any open batch so its sprites land in the frame being finished.
    pub fn close_batch(&mut self) {
        if self.batch.is_active() {
            log::debug!("end_frame with an open batch; flushing");
            self.end_batch();
        }
    }

    /// Finishes the frame and advances the deferred-destruction clock.
    pub fn finish_frame(&mut self) {
        self.recorder.finish();
        let released = self.textures.complete_frame();
        if released > 0 {
            log::trace!("released {released} retired textures");
        }
    }

    pub fn texture_info(&self, texture: TextureHandle) -> TextureInfo {
        self.textures.info(texture)
    }

    pub fn destroy_texture(&mut self, texture: TextureHandle) {
        if !self.textures.remove(texture) {
            log::debug!("destroy_texture: unknown handle {texture:?}; ignored");
        }
    }

    pub fn draw_quad(&mut self, position: Vec2, size: Vec2, color: Color) {
        let sprite = Sprite::new(position, size, TextureRegion::default()).with_tint(color);
        self.recorder.record(None, &sprite.vertices());
    }

    pub fn draw_textured_quad(
        &mut self,
        position: Vec2,
        size: Vec2,
        region: TextureRegion,
        tint: Color,
    ) {
        if !self.textures.contains(region.texture) {
            self.recorder.drop_draw("textured quad with unknown texture");
            return;
        }
        let sprite = Sprite::new(position, size, region).with_tint(tint);
        self.recorder.record(Some(region.texture), &sprite.vertices());
    }

    pub fn begin_batch(&mut self) {
        self.batch.begin();
    }

    /// Queues a sprite; unknown or destroyed textures are dropped at the call.
    pub fn draw_sprite(&mut self, sprite: &Sprite) {
        if !self.textures.contains(sprite.texture()) {
            self.recorder.drop_draw("sprite with unknown texture");
            return;
        }
        let Self {
            textures,
            recorder,
            batch,
        } = self;
        let mut sink = RecordingSink { recorder, textures };
        if !batch.push(sprite, &mut sink) {
            sink.recorder.drop_draw("sprite outside a batch");
        }
    }

    pub fn end_batch(&mut self) {
        let Self {
            textures,
            recorder,
            batch,
        } = self;
        batch.end(&mut RecordingSink { recorder, textures });
    }

    /// Drops every texture and pending command; handles stay burned.
    pub fn reset(&mut self) {
        self.batch.discard();
        if self.recorder.state() != super::FrameState::Idle {
            self.recorder.finish();
        }
        self.textures.clear();
    }
}
