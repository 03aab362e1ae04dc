//! Falling-snow particle engine.
//!
//! A seven-layer struct-of-arrays particle field drifts down a software
//! surface; far layers are small, slow and faint, near layers large, fast
//! and bright. Each flake is drawn by stamping a pre-rendered radial sprite.

mod atlas;
mod debounce;
mod field;
mod layers;
pub mod motion;
mod overlay;
pub mod paint;
mod surface;

pub use atlas::{Sprite, SpriteAtlas, SpriteError, MAX_SPRITE_RADIUS};
pub use debounce::Debounce;
pub use field::{particle_count, Flake, ParticleField, MAX_DENSITY_SCALE, REFERENCE_AREA};
pub use layers::{Depth, LayerSpec, LayerTable, Spread, WobbleBand, LAYER_COUNT};
pub use motion::{render_x, wobble_offset, RECYCLE_Y};
pub use overlay::{OverlayStats, RunState, SnowConfig, SnowOverlay};
pub use surface::{effective_scale, PixelSurface, Viewport};
