//! Window and event loop.
//!
//! Owns the `winit` event loop and window and binds a renderer to it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
