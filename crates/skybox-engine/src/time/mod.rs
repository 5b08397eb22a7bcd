//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per redraw, `reset()`
//! when drawing resumes after a minimise.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
