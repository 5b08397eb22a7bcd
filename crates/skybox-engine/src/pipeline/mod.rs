//! Fixed-function state: the two depth configurations, the single rasterizer
//! configuration, and the pipeline objects that bake them per program.

mod depth;
mod raster;
mod states;

pub use depth::DepthMode;
pub use raster::primitive_state;
pub use states::PipelineStates;
