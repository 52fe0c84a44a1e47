//! Flight model: pilot input, the integrator, and the airplane that ties
//! them together. Nothing here knows about rendering or cameras.

mod airplane;
mod controls;
mod physics;

pub use airplane::*;
pub use controls::*;
pub use physics::*;
