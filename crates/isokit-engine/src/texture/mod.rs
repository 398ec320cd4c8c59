//! Texture handles and the handle registry.
//!
//! Callers only ever see [`TextureHandle`]; the backend object behind it lives in a
//! [`TextureRegistry`] side table owned by the backend. Stale handles resolve to nothing,
//! which makes every use of them a no-op instead of undefined behavior.

mod handle;
mod info;
mod registry;

pub use handle::TextureHandle;
pub use info::{validate_pixels, TextureFilter, TextureInfo, TextureRegion, TextureWrap};
pub use registry::TextureRegistry;
