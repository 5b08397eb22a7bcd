//! Skybox engine crate.
//!
//! A two-pass forward renderer: a cube-mapped sky drawn behind everything,
//! then a textured spinning cube, presented to a winit window through wgpu.

pub mod asset;
pub mod device;
pub mod error;
pub mod frame;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod time;
pub mod window;

pub use error::{RenderError, RenderResult};
