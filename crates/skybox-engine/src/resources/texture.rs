//! Texture and sampler creation.

use std::path::Path;

use wgpu::util::DeviceExt;

use crate::asset::{self, TextureAsset};
use crate::device::scoped;
use crate::error::{RenderError, RenderResult};

/// Shape of texture a program samples.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureKind {
    /// Single 2D image with mips.
    Flat,
    /// Six square faces addressed by direction.
    Cube,
}

impl TextureKind {
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            TextureKind::Flat => wgpu::TextureViewDimension::D2,
            TextureKind::Cube => wgpu::TextureViewDimension::Cube,
        }
    }

    fn layers(self) -> u32 {
        match self {
            TextureKind::Flat => 1,
            TextureKind::Cube => 6,
        }
    }
}

/// Checks the parsed container against the requested kind and against what
/// the device can sample.
pub fn check_asset(
    asset: &TextureAsset,
    kind: TextureKind,
    features: wgpu::Features,
) -> Result<(), String> {
    let is_cube = kind == TextureKind::Cube;
    if asset.cube != is_cube || asset.layers != kind.layers() {
        return Err(format!(
            "expected a {kind:?} texture, file holds {} layer(s){}",
            asset.layers,
            if asset.cube { " as a cube map" } else { "" }
        ));
    }
    if is_cube && asset.width != asset.height {
        return Err(format!(
            "cube faces must be square, got {}x{}",
            asset.width, asset.height
        ));
    }
    if asset.format.is_block_compressed() {
        if !features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
            return Err(format!(
                "{:?} needs BC texture compression, which this device lacks",
                asset.format
            ));
        }
        if asset.width % 4 != 0 || asset.height % 4 != 0 {
            return Err(format!(
                "block-compressed size {}x{} is not a multiple of 4",
                asset.width, asset.height
            ));
        }
    }
    let expected = asset
        .expected_len()
        .ok_or_else(|| "payload size overflows".to_string())?;
    if asset.data.len() != expected {
        return Err(format!(
            "payload is {} bytes, header implies {expected}",
            asset.data.len()
        ));
    }
    Ok(())
}

/// Sampled texture resident on the GPU.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub kind: TextureKind,
}

/// Loads a pre-baked container and uploads every mip of every layer.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    kind: TextureKind,
) -> RenderResult<GpuTexture> {
    let asset = asset::load_dds(path)?;
    check_asset(&asset, kind, device.features())
        .map_err(|reason| RenderError::asset(path, reason))?;

    let label = path.display().to_string();
    let upload = || {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&label),
                size: wgpu::Extent3d {
                    width: asset.width,
                    height: asset.height,
                    depth_or_array_layers: asset.layers,
                },
                mip_level_count: asset.mip_levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: asset.format.to_wgpu(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &asset.data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&label),
            dimension: Some(kind.view_dimension()),
            ..Default::default()
        });
        Ok((texture, view))
    };
    let (texture, view) = scoped(device, upload, |err| {
        RenderError::asset(path, format!("upload rejected: {err}"))
    })?;

    Ok(GpuTexture {
        texture,
        view,
        kind,
    })
}

/// Filtering and addressing for one sampler object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerConfig {
    pub address_mode: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

impl SamplerConfig {
    /// Trilinear, repeating. Used for the cube faces.
    pub const WRAP: Self = Self {
        address_mode: wgpu::AddressMode::Repeat,
        filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
    };

    /// Trilinear, clamped. Keeps cube-map face seams from bleeding.
    pub const CLAMP: Self = Self {
        address_mode: wgpu::AddressMode::ClampToEdge,
        filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
    };
}

pub fn create_sampler(device: &wgpu::Device, label: &str, config: SamplerConfig) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: config.address_mode,
        address_mode_v: config.address_mode,
        address_mode_w: config.address_mode,
        mag_filter: config.filter,
        min_filter: config.filter,
        mipmap_filter: config.mipmap_filter,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::parse_dds;
    use crate::asset::tests::bc7;

    fn bc() -> wgpu::Features {
        wgpu::Features::TEXTURE_COMPRESSION_BC
    }

    #[test]
    fn flat_asset_accepted_as_flat() {
        let asset = parse_dds(&bc7(8, 8, 4, false)).unwrap();
        assert_eq!(check_asset(&asset, TextureKind::Flat, bc()), Ok(()));
    }

    #[test]
    fn cube_asset_accepted_as_cube() {
        let asset = parse_dds(&bc7(8, 8, 1, true)).unwrap();
        assert_eq!(check_asset(&asset, TextureKind::Cube, bc()), Ok(()));
    }

    #[test]
    fn kind_mismatch_rejected() {
        let flat = parse_dds(&bc7(8, 8, 1, false)).unwrap();
        let cube = parse_dds(&bc7(8, 8, 1, true)).unwrap();
        assert!(check_asset(&flat, TextureKind::Cube, bc()).is_err());
        assert!(check_asset(&cube, TextureKind::Flat, bc()).is_err());
    }

    #[test]
    fn compressed_needs_device_feature() {
        let asset = parse_dds(&bc7(8, 8, 1, false)).unwrap();
        let err = check_asset(&asset, TextureKind::Flat, wgpu::Features::empty()).unwrap_err();
        assert!(err.contains("BC"));
    }

    #[test]
    fn trimmed_payload_rejected() {
        let mut asset = parse_dds(&bc7(8, 8, 1, false)).unwrap();
        asset.data.pop();
        assert!(check_asset(&asset, TextureKind::Flat, bc()).is_err());
    }

    #[test]
    fn cube_view_dimension() {
        assert_eq!(TextureKind::Cube.view_dimension(), wgpu::TextureViewDimension::Cube);
        assert_eq!(TextureKind::Flat.view_dimension(), wgpu::TextureViewDimension::D2);
    }
}
