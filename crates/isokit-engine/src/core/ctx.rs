use winit::window::{Window, WindowId};

use crate::render::{FrameState, Renderer};
use crate::time::FrameTime;

/// The window a frame is drawn into.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Physical size in pixels; the renderer target uses the same units.
    pub fn size(&self) -> (u32, u32) {
        let s = self.window.inner_size();
        (s.width, s.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Per-frame context passed to [`crate::core::App::on_frame`].
///
/// `'a` is the callback; `'w` is the window borrow held by the renderer.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut (dyn Renderer + 'w),
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Runs `draw` between `begin_frame` and `end_frame`.
    ///
    /// Returns `false` when the frame could not be acquired (minimized window, lost
    /// surface); `draw` still runs and its draws are dropped.
    pub fn render<F>(&mut self, draw: F) -> bool
    where
        F: FnOnce(&mut dyn Renderer),
    {
        self.renderer.begin_frame();
        let valid = self.renderer.frame_state() == FrameState::Recording;
        draw(&mut *self.renderer);
        self.window.window.pre_present_notify();
        self.renderer.end_frame();
        valid
    }
}
