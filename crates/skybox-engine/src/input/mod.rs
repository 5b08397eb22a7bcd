//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform events.

mod orbit;
pub(crate) mod platform;
mod types;

pub use orbit::{orbit_direction, orbit_step};
pub use types::{Key, KeyState};
