//! Frame orchestration: the per-frame state machine, the pass plan, and the
//! renderer that drives both.

mod config;
mod plan;
mod renderer;
mod state;
mod stats;
mod uploads;

pub use config::{AssetPaths, Layers, RendererConfig};
pub use plan::{ClearValues, Draw, FramePlan, Layer, PassDescriptor, StandardDraws};
pub use renderer::{FrameOutcome, Renderer};
pub use state::{FrameCycle, FrameState};
pub use stats::FrameStats;
pub use uploads::{MatrixSlot, MatrixUploads, MATRIX_BYTES};
