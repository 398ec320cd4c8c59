use crate::coords::{Color, PixelViewport};
use crate::texture::TextureHandle;

use super::{Ortho, Vertex};

/// Lifecycle of the frame being recorded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FrameState {
    /// Between `end_frame` and the next `begin_frame`.
    #[default]
    Idle,
    /// Draws are accepted.
    Recording,
    /// The target could not be acquired; draws are dropped until `end_frame`.
    Invalid,
}

/// Per-frame counters, reset at `begin_frame`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub batch_flushes: u32,
    pub vertices: u32,
    pub clears: u32,
    pub dropped_draws: u32,
}

/// One recorded draw: a vertex range drawn with one texture, clipped to `scissor`.
///
/// `texture == None` means the backend's built-in white texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: Option<TextureHandle>,
    pub scissor: PixelViewport,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// A run of draws sharing one load operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPassRecord {
    /// `Some` clears the whole target before the draws.
    pub clear: Option<Color>,
    pub draws: Vec<DrawCall>,
}

/// Backend-neutral command recording shared by every renderer.
///
/// The recorder owns the vertex stage: logical positions go through the active
/// projection and viewport once, here, so every backend rasterizes the same
/// framebuffer-space triangles.
pub struct FrameRecorder {
    state: FrameState,
    target: (u32, u32),
    clear_color: Color,
    viewport: PixelViewport,
    projection: Ortho,

    vertices: Vec<Vertex>,
    passes: Vec<RenderPassRecord>,

    stats: FrameStats,
    last_stats: FrameStats,
    warned_idle_draw: bool,
}

impl FrameRecorder {
    pub fn new(width: u32, height: u32, clear_color: Color) -> Self {
        Self {
            state: FrameState::Idle,
            target: (width, height),
            clear_color,
            viewport: PixelViewport::full(width, height),
            projection: Ortho::default(),
            vertices: Vec::new(),
            passes: Vec::new(),
            stats: FrameStats::default(),
            last_stats: FrameStats::default(),
            warned_idle_draw: false,
        }
    }

    // ── state ────────────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.state == FrameState::Recording
    }

    #[inline]
    pub fn target_size(&self) -> (u32, u32) {
        self.target
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    #[inline]
    pub fn viewport(&self) -> PixelViewport {
        self.viewport
    }

    #[inline]
    pub fn projection(&self) -> Ortho {
        self.projection
    }

    /// Resizes the target and resets the viewport to cover it.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target = (width, height);
        self.viewport = PixelViewport::full(width, height);
    }

    pub fn set_clear_color(&mut self, color: Color) {
        if !color.is_finite() {
            log::warn!("ignoring non-finite clear color {color:?}");
            return;
        }
        self.clear_color = color;
    }

    pub fn set_viewport(&mut self, viewport: PixelViewport) {
        self.viewport = viewport;
    }

    /// Installs a projection; degenerate bounds are ignored.
    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        match Ortho::new(left, right, bottom, top) {
            Some(p) => self.projection = p,
            None => log::warn!(
                "ignoring degenerate projection l={left} r={right} b={bottom} t={top}"
            ),
        }
    }

    // ── frame bracket ────────────────────────────────────────────────────────

    /// Starts a frame. `valid == false` records an invalid frame that drops every draw.
    pub fn begin(&mut self, valid: bool) {
        if self.state != FrameState::Idle {
            log::warn!("begin_frame without end_frame; abandoning the previous frame");
        }
        self.vertices.clear();
        self.passes.clear();
        self.passes.push(RenderPassRecord::default());
        self.stats = FrameStats::default();
        self.state = if valid {
            FrameState::Recording
        } else {
            FrameState::Invalid
        };
    }

    /// Ends the frame, publishing its counters. Recorded commands are discarded.
    pub fn finish(&mut self) {
        if self.state == FrameState::Idle {
            log::debug!("end_frame without begin_frame; ignored");
            return;
        }
        self.last_stats = self.stats;
        self.vertices.clear();
        self.passes.clear();
        self.state = FrameState::Idle;
    }

    /// Counters of the frame in progress (or the last completed one while idle).
    pub fn stats(&self) -> FrameStats {
        if self.state == FrameState::Idle {
            self.last_stats
        } else {
            self.stats
        }
    }

    // ── recording ────────────────────────────────────────────────────────────

    /// Clears the whole target with the current clear color.
    pub fn clear(&mut self) {
        if !self.is_recording() {
            self.note_dropped("clear");
            return;
        }
        self.stats.clears += 1;
        let color = self.clear_color;
        match self.passes.last_mut() {
            // Nothing drawn yet: the clear replaces the pending load op.
            Some(pass) if pass.draws.is_empty() => pass.clear = Some(color),
            _ => self.passes.push(RenderPassRecord {
                clear: Some(color),
                draws: Vec::new(),
            }),
        }
    }

    /// Records a draw of logical-space triangles.
    ///
    /// Returns `false` when the draw was dropped (no frame, or viewport off target).
    pub fn record(&mut self, texture: Option<TextureHandle>, vertices: &[Vertex]) -> bool {
        if !self.is_recording() {
            self.note_dropped("draw");
            return false;
        }
        if vertices.is_empty() {
            return true;
        }
        let Some(scissor) = self.viewport.clipped_to(self.target.0, self.target.1) else {
            self.stats.dropped_draws += 1;
            return false;
        };
        let (Ok(first_vertex), Ok(vertex_count)) = (
            u32::try_from(self.vertices.len()),
            u32::try_from(vertices.len()),
        ) else {
            self.stats.dropped_draws += 1;
            return false;
        };

        let projection = self.projection;
        let viewport = self.viewport;
        self.vertices.extend(vertices.iter().map(|v| Vertex {
            position: viewport.ndc_to_pixels(projection.to_ndc(v.position)),
            ..*v
        }));

        let draw = DrawCall {
            texture,
            scissor,
            first_vertex,
            vertex_count,
        };
        if let Some(pass) = self.passes.last_mut() {
            pass.draws.push(draw);
        }
        self.stats.draw_calls += 1;
        self.stats.vertices = self.stats.vertices.saturating_add(vertex_count);
        true
    }

    /// Records a batch flush; counted separately from immediate draws.
    pub fn record_flush(&mut self, texture: TextureHandle, vertices: &[Vertex]) -> bool {
        let ok = self.record(Some(texture), vertices);
        if ok {
            self.stats.batch_flushes += 1;
        }
        ok
    }

    /// Counts a draw rejected by the caller (e.g. unknown texture).
    pub fn drop_draw(&mut self, what: &str) {
        self.stats.dropped_draws += 1;
        log::trace!("dropped {what}");
    }

    fn note_dropped(&mut self, what: &str) {
        if self.state == FrameState::Invalid {
            self.stats.dropped_draws += 1;
            return;
        }
        if !self.warned_idle_draw {
            log::warn!("{what} outside begin_frame/end_frame; dropped");
            self.warned_idle_draw = true;
        }
    }

    // ── replay ───────────────────────────────────────────────────────────────

    /// Framebuffer-space vertices of the current frame.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn passes(&self) -> &[RenderPassRecord] {
        &self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> [Vertex; 3] {
        let v = |x: f32, y: f32| Vertex {
            position: [x, y],
            texcoord: [0.0, 0.0],
            color: [1.0; 4],
        };
        [v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)]
    }

    #[test]
    fn draws_outside_a_frame_are_dropped() {
        let mut rec = FrameRecorder::new(4, 4, Color::black());
        assert!(!rec.record(None, &tri()));
        rec.begin(true);
        assert!(rec.passes()[0].draws.is_empty());
    }

    #[test]
    fn invalid_frame_drops_and_counts() {
        let mut rec = FrameRecorder::new(4, 4, Color::black());
        rec.begin(false);
        assert!(!rec.record(None, &tri()));
        rec.clear();
        rec.finish();
        let s = rec.stats();
        assert_eq!(s.dropped_draws, 2);
        assert_eq!(s.draw_calls, 0);
    }

    #[test]
    fn vertices_go_through_projection_and_viewport() {
        let mut rec = FrameRecorder::new(100, 50, Color::black());
        rec.set_projection(0.0, 10.0, 10.0, 0.0);
        rec.set_viewport(PixelViewport::new(0, 0, 100, 50));
        rec.begin(true);
        rec.record(None, &tri());
        let close = |a: [f32; 2], b: [f32; 2]| (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3;
        let v = rec.vertices();
        assert!(close(v[0].position, [0.0, 0.0]));
        assert!(close(v[1].position, [10.0, 0.0]));
        assert!(close(v[2].position, [0.0, 5.0]));
    }

    #[test]
    fn clear_after_draws_starts_a_new_pass() {
        let mut rec = FrameRecorder::new(4, 4, Color::red());
        rec.begin(true);
        rec.clear();
        rec.record(None, &tri());
        rec.set_clear_color(Color::blue());
        rec.clear();
        let passes = rec.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].clear, Some(Color::red()));
        assert_eq!(passes[0].draws.len(), 1);
        assert_eq!(passes[1].clear, Some(Color::blue()));
    }

    #[test]
    fn offscreen_viewport_drops_draws() {
        let mut rec = FrameRecorder::new(4, 4, Color::black());
        rec.set_viewport(PixelViewport::new(10, 10, 4, 4));
        rec.begin(true);
        assert!(!rec.record(None, &tri()));
        assert_eq!(rec.stats().dropped_draws, 1);
    }

    #[test]
    fn degenerate_projection_keeps_previous() {
        let mut rec = FrameRecorder::new(4, 4, Color::black());
        rec.set_projection(0.0, 4.0, 4.0, 0.0);
        let before = rec.projection();
        rec.set_projection(1.0, 1.0, 0.0, 4.0);
        assert_eq!(rec.projection(), before);
    }

    #[test]
    fn stats_survive_until_next_frame() {
        let mut rec = FrameRecorder::new(4, 4, Color::black());
        rec.begin(true);
        rec.record(None, &tri());
        rec.finish();
        assert_eq!(rec.stats().draw_calls, 1);
        assert_eq!(rec.stats().vertices, 3);
        rec.begin(true);
        assert_eq!(rec.stats().draw_calls, 0);
    }
}
