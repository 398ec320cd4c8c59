//! isokit engine: a 2D rendering core for isometric games.
//!
//! - [`texture`]: opaque texture handles and the registry behind them.
//! - [`render`]: the [`render::Renderer`] trait with wgpu and software backends, sprite
//!   batching and per-frame statistics. Both backends rasterize the same triangles the
//!   same way, so nearest-sampled output is pixel-identical.
//! - [`sprite`]: images, sprite sheets and animation playback.
//! - [`iso`]: isometric projection and tile maps with culling and back-to-front order.
//! - [`window`] and [`core`]: a winit runtime driving an [`core::App`].

pub mod coords;
pub mod core;
pub mod device;
pub mod iso;
pub mod logging;
pub mod render;
pub mod sprite;
pub mod texture;
pub mod time;
pub mod window;
