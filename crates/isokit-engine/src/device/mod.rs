//! GPU device + presentation target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for the selected graphics API
//! - creating & configuring the window Surface, or an offscreen color target
//! - acquiring frames, presenting them, and reading offscreen pixels back

mod context;
mod error;
mod frame;
mod init;
mod readback;
mod surface;

pub use context::{Gpu, SurfaceTarget};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
