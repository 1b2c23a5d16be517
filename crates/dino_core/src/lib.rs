pub mod animation;
pub mod assets;
pub mod geometry;
pub mod input;
pub mod time;

pub use geometry::{Color, Rect};
