use std::path::PathBuf;

use crate::device::GpuInit;
use crate::scene::SceneConfig;

/// Which layers the frame draws.
///
/// Turning layers off gives the progressively simpler variants: foreground
/// only draws the spinning cube over the clear colour, and with neither the
/// frame only clears.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Layers {
    pub background: bool,
    pub foreground: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            background: true,
            foreground: true,
        }
    }
}

/// Texture containers the standard scene loads.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    /// Flat texture for the cube faces.
    pub cube_texture: PathBuf,
    /// Six-face cube map for the sky.
    pub sky_texture: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            cube_texture: PathBuf::from("assets/cube.dds"),
            sky_texture: PathBuf::from("assets/skybox.dds"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    pub scene: SceneConfig,
    pub gpu: GpuInit,
    pub assets: AssetPaths,
    pub layers: Layers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_draw_everything() {
        let config = RendererConfig::default();
        assert_eq!(config.layers, Layers::default());
        assert!(config.layers.background && config.layers.foreground);
        assert_eq!(config.assets.sky_texture, PathBuf::from("assets/skybox.dds"));
    }
}
