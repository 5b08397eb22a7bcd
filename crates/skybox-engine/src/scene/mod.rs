//! Scene state and transform derivation.
//!
//! Two fixed objects: a tumbling foreground cube and an orbiting camera
//! looking at it from inside a sky sphere. All tuning constants live in
//! [`SceneConfig`].

mod config;
mod state;

pub use config::{CameraConfig, MotionConfig, SceneConfig, SkySphere, SpinRate};
pub use state::{SceneMatrices, SceneState};
