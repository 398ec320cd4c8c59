//! CPU images, sprite sheets and frame animation.

mod animation;
mod image;
mod sheet;

pub use animation::AnimationPlayer;
pub use image::Image;
pub use sheet::{Animation, SpriteFrame, SpriteSheet};
