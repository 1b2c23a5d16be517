pub mod camera;
pub mod gpu_context;
pub mod sprite_batch;
pub mod sprite_pipeline;
pub mod texture;
pub mod vertex;

pub use camera::{CameraUniform, ScreenCamera};
pub use gpu_context::GpuContext;
pub use sprite_batch::{GpuSpriteBatch, ScreenMapping, SlotId, SpriteBatch, SpriteQuad, MAX_SPRITES};
pub use sprite_pipeline::SpritePipeline;
pub use texture::{decode_rgba, DecodedImage, Texture};
pub use vertex::SpriteVertex;
