//! Pre-baked texture assets.
//!
//! Textures arrive as DDS containers holding GPU-native (mostly
//! block-compressed) data with the full mip chain. Nothing is decoded or
//! transcoded; the payload is uploaded as-is.

mod dds;

pub use dds::{load_dds, parse_dds, DdsError, PixelFormat, TextureAsset};

#[cfg(test)]
pub(crate) use dds::tests;
