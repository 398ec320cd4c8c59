/// Classification of a failed frame acquisition.
///
/// None of these is surfaced to draw callers: the renderer marks the frame invalid and
/// drops its draws. Only the runtime looks at `Fatal`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error (timeout, minimized window); skip the current frame.
    SkipFrame,
    /// Out of memory; the host should shut down.
    Fatal,
}
