//! Frame timing.
//!
//! One [`FrameClock`] per render loop; call `tick()` once per frame and feed the resulting
//! `dt` to animation players and camera motion.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
