//! Software sprite renderer over an in-memory RGBA buffer.
//!
//! [`Graphics`] is the entry point: it owns the display buffer, the sprite
//! store and the drawing state. Coordinates are y-up with `(0, 0)` at the
//! bottom-left of the target.

pub mod assets;
pub mod collision;
pub mod compositor;
pub mod config;
#[cfg(feature = "display")]
pub mod display;
pub mod graphics;
pub mod math2d;
pub mod pixel;
pub mod pixel_buffer;
pub mod sprite;
pub mod text;
pub mod timing;

pub use config::GraphicsConfig;
pub use graphics::Graphics;
pub use math2d::{Matrix2D, Point2f, Vector2f};
pub use pixel::{BlendColour, BlendMode, Pixel};
pub use pixel_buffer::PixelBuffer;
pub use sprite::{PremultState, Sprite, SpriteId, SpriteStore};
pub use timing::{FpsCounter, TimingBar, TimingSegment};
