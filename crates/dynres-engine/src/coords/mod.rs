//! Coordinate and geometry types shared by the resolution model, the temporal
//! resolve state machine and the renderer.
//!
//! Conventions:
//! - Viewports are in physical pixels of the dynamic render target
//! - Jitter offsets are in normalized units (pixels divided by viewport size)
//! - Matrices are column-major, `v' = M * v`

mod mat4;
mod vec2;
mod viewport;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use viewport::Viewport;
