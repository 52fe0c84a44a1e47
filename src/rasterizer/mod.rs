//! Software rasterizer
//!
//! Features:
//! - Planar projection onto a camera render plane (no matrices)
//! - Painter's algorithm with persistent, incrementally repaired draw order
//! - Solid scanline fill, flat two-tone lighting, quadratic distance fog

mod camera;
mod lighting;
mod math;
mod render;
mod types;

pub use camera::*;
pub use lighting::*;
pub use math::*;
pub use render::*;
pub use types::*;

/// Default window / framebuffer dimensions
pub const WIDTH: usize = 960;
pub const HEIGHT: usize = 540;
