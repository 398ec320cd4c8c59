//! Coordinate and geometry types shared by the renderers and the isometric layer.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Backends map logical coordinates to clip space through the active orthographic
//! projection (`render::Ortho`) and then to framebuffer pixels through a [`PixelViewport`].

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::Color;
pub(crate) use color::unorm8;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::PixelViewport;
