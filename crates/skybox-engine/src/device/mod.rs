//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface and the depth target
//! - acquiring frames and presenting them

mod context;
mod error;
mod frame;
mod init;
mod surface;
mod viewport;

pub use context::DeviceContext;
pub use error::{classify_surface_error, scoped, settle, ErrorScopes, SurfaceErrorAction};
pub use frame::Frame;
pub use init::GpuInit;
pub use viewport::{
    plan_resize, DepthTarget, ResizeOutcome, TargetExtents, Viewport, DEPTH_FORMAT,
};
