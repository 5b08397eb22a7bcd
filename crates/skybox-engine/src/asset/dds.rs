use std::path::Path;

use thiserror::Error;

use crate::error::{RenderError, RenderResult};

const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_SIZE: u32 = 124;
const PIXEL_FORMAT_SIZE: u32 = 32;
const DX10_HEADER_LEN: usize = 20;
const DATA_OFFSET: usize = 4 + HEADER_SIZE as usize;

const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_CUBEMAP_ALL_FACES: u32 = 0xFC00;
const DDSCAPS2_VOLUME: u32 = 0x20_0000;
const DX10_MISC_TEXTURECUBE: u32 = 0x4;
const DX10_DIMENSION_TEXTURE2D: u32 = 3;

/// GPU-native pixel formats accepted from DDS files.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Bc1Unorm,
    Bc1UnormSrgb,
    Bc2Unorm,
    Bc2UnormSrgb,
    Bc3Unorm,
    Bc3UnormSrgb,
    Bc4Unorm,
    Bc5Unorm,
    Bc7Unorm,
    Bc7UnormSrgb,
}

impl PixelFormat {
    fn from_dxgi(code: u32) -> Option<Self> {
        Some(match code {
            28 => Self::Rgba8Unorm,
            29 => Self::Rgba8UnormSrgb,
            87 => Self::Bgra8Unorm,
            91 => Self::Bgra8UnormSrgb,
            71 => Self::Bc1Unorm,
            72 => Self::Bc1UnormSrgb,
            74 => Self::Bc2Unorm,
            75 => Self::Bc2UnormSrgb,
            77 => Self::Bc3Unorm,
            78 => Self::Bc3UnormSrgb,
            80 => Self::Bc4Unorm,
            83 => Self::Bc5Unorm,
            98 => Self::Bc7Unorm,
            99 => Self::Bc7UnormSrgb,
            _ => return None,
        })
    }

    fn from_four_cc(code: &[u8; 4]) -> Option<Self> {
        Some(match code {
            b"DXT1" => Self::Bc1Unorm,
            b"DXT2" | b"DXT3" => Self::Bc2Unorm,
            b"DXT4" | b"DXT5" => Self::Bc3Unorm,
            b"ATI1" | b"BC4U" => Self::Bc4Unorm,
            b"ATI2" | b"BC5U" => Self::Bc5Unorm,
            _ => return None,
        })
    }

    /// True for block-compressed formats (4×4 texel blocks).
    pub fn is_block_compressed(self) -> bool {
        !matches!(
            self,
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb | Self::Bgra8Unorm | Self::Bgra8UnormSrgb
        )
    }

    /// Bytes per 4×4 block, or per texel for uncompressed formats.
    pub fn unit_bytes(self) -> usize {
        match self {
            Self::Bc1Unorm | Self::Bc1UnormSrgb | Self::Bc4Unorm => 8,
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb | Self::Bgra8Unorm | Self::Bgra8UnormSrgb => 4,
            _ => 16,
        }
    }

    /// Byte size of one `width`×`height` surface, or `None` if it does not
    /// fit in `usize`.
    pub fn surface_bytes(self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width.max(1) as usize, height.max(1) as usize);
        let (w, h) = if self.is_block_compressed() {
            (w.div_ceil(4), h.div_ceil(4))
        } else {
            (w, h)
        };
        w.checked_mul(h)?.checked_mul(self.unit_bytes())
    }

    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        use wgpu::TextureFormat as F;
        match self {
            Self::Rgba8Unorm => F::Rgba8Unorm,
            Self::Rgba8UnormSrgb => F::Rgba8UnormSrgb,
            Self::Bgra8Unorm => F::Bgra8Unorm,
            Self::Bgra8UnormSrgb => F::Bgra8UnormSrgb,
            Self::Bc1Unorm => F::Bc1RgbaUnorm,
            Self::Bc1UnormSrgb => F::Bc1RgbaUnormSrgb,
            Self::Bc2Unorm => F::Bc2RgbaUnorm,
            Self::Bc2UnormSrgb => F::Bc2RgbaUnormSrgb,
            Self::Bc3Unorm => F::Bc3RgbaUnorm,
            Self::Bc3UnormSrgb => F::Bc3RgbaUnormSrgb,
            Self::Bc4Unorm => F::Bc4RUnorm,
            Self::Bc5Unorm => F::Bc5RgUnorm,
            Self::Bc7Unorm => F::Bc7RgbaUnorm,
            Self::Bc7UnormSrgb => F::Bc7RgbaUnormSrgb,
        }
    }
}

/// A parsed texture container, ready for upload.
///
/// `data` is layer-major: every mip of layer 0, then every mip of layer 1, ...
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    /// Array layers; 6 per cube for cube maps.
    pub layers: u32,
    pub cube: bool,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl TextureAsset {
    /// Total payload size implied by the header fields, or `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        let mut per_layer = 0usize;
        for mip in 0..self.mip_levels {
            let surface = self
                .format
                .surface_bytes(self.width >> mip, self.height >> mip)?;
            per_layer = per_layer.checked_add(surface)?;
        }
        per_layer.checked_mul(self.layers as usize)
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum DdsError {
    #[error("not a DDS file (bad magic)")]
    BadMagic,
    #[error("file truncated: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },
    #[error("malformed header: {0}")]
    BadHeader(&'static str),
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),
    #[error("volume textures are not supported")]
    Volume,
    #[error("cube map does not contain all six faces")]
    PartialCube,
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

/// Parses a DDS container from memory.
pub fn parse_dds(bytes: &[u8]) -> Result<TextureAsset, DdsError> {
    if bytes.len() < 4 || &bytes[..4] != MAGIC {
        return Err(DdsError::BadMagic);
    }
    if bytes.len() < DATA_OFFSET {
        return Err(DdsError::Truncated {
            needed: DATA_OFFSET,
            have: bytes.len(),
        });
    }

    if read_u32(bytes, 4) != HEADER_SIZE {
        return Err(DdsError::BadHeader("header size is not 124"));
    }
    if read_u32(bytes, 76) != PIXEL_FORMAT_SIZE {
        return Err(DdsError::BadHeader("pixel format size is not 32"));
    }

    let flags = read_u32(bytes, 8);
    let height = read_u32(bytes, 12);
    let width = read_u32(bytes, 16);
    let header_mips = read_u32(bytes, 28);
    let pf_flags = read_u32(bytes, 80);
    let mut four_cc = [0u8; 4];
    four_cc.copy_from_slice(&bytes[84..88]);
    let caps2 = read_u32(bytes, 112);

    if width == 0 || height == 0 {
        return Err(DdsError::BadHeader("zero-sized texture"));
    }
    if caps2 & DDSCAPS2_VOLUME != 0 {
        return Err(DdsError::Volume);
    }

    let mip_levels = if flags & DDSD_MIPMAPCOUNT != 0 && header_mips > 0 {
        header_mips
    } else {
        1
    };
    let max_mips = 32 - width.max(height).leading_zeros();
    if mip_levels > max_mips {
        return Err(DdsError::BadHeader("mip count exceeds the full chain"));
    }

    let dx10 = pf_flags & DDPF_FOURCC != 0 && &four_cc == b"DX10";
    let (format, cube, layers, data_offset) = if dx10 {
        if bytes.len() < DATA_OFFSET + DX10_HEADER_LEN {
            return Err(DdsError::Truncated {
                needed: DATA_OFFSET + DX10_HEADER_LEN,
                have: bytes.len(),
            });
        }
        let dxgi = read_u32(bytes, DATA_OFFSET);
        let dimension = read_u32(bytes, DATA_OFFSET + 4);
        let misc = read_u32(bytes, DATA_OFFSET + 8);
        let array_size = read_u32(bytes, DATA_OFFSET + 12).max(1);

        if dimension != DX10_DIMENSION_TEXTURE2D {
            return Err(DdsError::UnsupportedFormat(format!(
                "resource dimension {dimension}"
            )));
        }
        let format = PixelFormat::from_dxgi(dxgi)
            .ok_or_else(|| DdsError::UnsupportedFormat(format!("DXGI format {dxgi}")))?;
        let cube = misc & DX10_MISC_TEXTURECUBE != 0;
        let layers = if cube {
            array_size
                .checked_mul(6)
                .ok_or(DdsError::BadHeader("cube array size overflows"))?
        } else {
            array_size
        };
        (format, cube, layers, DATA_OFFSET + DX10_HEADER_LEN)
    } else {
        let format = if pf_flags & DDPF_FOURCC != 0 {
            PixelFormat::from_four_cc(&four_cc).ok_or_else(|| {
                DdsError::UnsupportedFormat(format!(
                    "FourCC {}",
                    String::from_utf8_lossy(&four_cc)
                ))
            })?
        } else if pf_flags & DDPF_RGB != 0 {
            legacy_rgb_format(bytes, pf_flags)?
        } else {
            return Err(DdsError::UnsupportedFormat(format!(
                "pixel format flags {pf_flags:#x}"
            )));
        };

        let cube = caps2 & DDSCAPS2_CUBEMAP != 0;
        if cube && caps2 & DDSCAPS2_CUBEMAP_ALL_FACES != DDSCAPS2_CUBEMAP_ALL_FACES {
            return Err(DdsError::PartialCube);
        }
        (format, cube, if cube { 6 } else { 1 }, DATA_OFFSET)
    };

    if cube && width != height {
        return Err(DdsError::BadHeader("cube faces are not square"));
    }

    let mut asset = TextureAsset {
        width,
        height,
        mip_levels,
        layers,
        cube,
        format,
        data: Vec::new(),
    };

    let needed = asset
        .expected_len()
        .and_then(|len| len.checked_add(data_offset))
        .ok_or(DdsError::BadHeader("payload size overflows"))?;
    if bytes.len() < needed {
        return Err(DdsError::Truncated {
            needed,
            have: bytes.len(),
        });
    }
    asset.data = bytes[data_offset..needed].to_vec();
    Ok(asset)
}

fn legacy_rgb_format(bytes: &[u8], pf_flags: u32) -> Result<PixelFormat, DdsError> {
    let bit_count = read_u32(bytes, 88);
    let masks = (
        read_u32(bytes, 92),
        read_u32(bytes, 96),
        read_u32(bytes, 100),
        if pf_flags & DDPF_ALPHAPIXELS != 0 { read_u32(bytes, 104) } else { 0 },
    );

    match (bit_count, masks) {
        (32, (0xFF, 0xFF00, 0xFF_0000, 0xFF00_0000)) => Ok(PixelFormat::Rgba8Unorm),
        (32, (0xFF_0000, 0xFF00, 0xFF, 0xFF00_0000)) => Ok(PixelFormat::Bgra8Unorm),
        _ => Err(DdsError::UnsupportedFormat(format!(
            "{bit_count}-bit RGB with masks {:#x}/{:#x}/{:#x}/{:#x}",
            masks.0, masks.1, masks.2, masks.3
        ))),
    }
}

/// Reads and parses a DDS file. Missing or malformed files are fatal.
pub fn load_dds(path: impl AsRef<Path>) -> RenderResult<TextureAsset> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| RenderError::asset(path, e.to_string()))?;
    let asset = parse_dds(&bytes).map_err(|e| RenderError::asset(path, e.to_string()))?;

    log::debug!(
        "loaded {}: {}x{} {:?}, {} mips, {} layers{}",
        path.display(),
        asset.width,
        asset.height,
        asset.format,
        asset.mip_levels,
        asset.layers,
        if asset.cube { " (cube)" } else { "" },
    );
    Ok(asset)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal DDS header; `dx10` appends the extended header.
    pub(crate) fn header(
        width: u32,
        height: u32,
        mips: u32,
        four_cc: &[u8; 4],
        caps2: u32,
        dx10: Option<(u32, u32, u32)>,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        let mut put = |v: u32| out.extend_from_slice(&v.to_le_bytes());
        put(u32::from_le_bytes(*MAGIC));
        put(HEADER_SIZE);
        put(0x1007 | if mips > 1 { DDSD_MIPMAPCOUNT } else { 0 });
        put(height);
        put(width);
        put(0); // pitch
        put(0); // depth
        put(mips);
        for _ in 0..11 {
            put(0);
        }
        put(PIXEL_FORMAT_SIZE);
        put(DDPF_FOURCC);
        put(u32::from_le_bytes(*four_cc));
        for _ in 0..5 {
            put(0);
        }
        put(0x1000); // caps
        put(caps2);
        for _ in 0..3 {
            put(0);
        }
        if let Some((dxgi, misc, array_size)) = dx10 {
            put(dxgi);
            put(DX10_DIMENSION_TEXTURE2D);
            put(misc);
            put(array_size);
            put(0);
        }
        out
    }

    /// A valid DX10 container of `layers` cubes/2D layers with zeroed payload.
    pub(crate) fn bc7(width: u32, height: u32, mips: u32, cube: bool) -> Vec<u8> {
        let misc = if cube { DX10_MISC_TEXTURECUBE } else { 0 };
        let mut bytes = header(width, height, mips, b"DX10", 0, Some((98, misc, 1)));
        let layers = if cube { 6 } else { 1 };
        let per_layer: usize = (0..mips)
            .filter_map(|m| PixelFormat::Bc7Unorm.surface_bytes(width >> m, height >> m))
            .sum();
        bytes.resize(bytes.len() + per_layer * layers, 0);
        bytes
    }

    // ── legacy headers ────────────────────────────────────────────────────

    #[test]
    fn dxt1_with_full_mip_chain() {
        let mut bytes = header(4, 4, 3, b"DXT1", 0, None);
        bytes.extend(std::iter::repeat_n(0xAB, 24));
        let asset = parse_dds(&bytes).unwrap();
        assert_eq!(asset.format, PixelFormat::Bc1Unorm);
        assert_eq!((asset.width, asset.height, asset.mip_levels), (4, 4, 3));
        assert_eq!(asset.layers, 1);
        assert!(!asset.cube);
        assert_eq!(asset.data.len(), 24);
    }

    #[test]
    fn legacy_cube_map_has_six_layers() {
        let caps2 = DDSCAPS2_CUBEMAP | DDSCAPS2_CUBEMAP_ALL_FACES;
        let mut bytes = header(8, 8, 1, b"DXT5", caps2, None);
        bytes.resize(bytes.len() + 6 * 64, 0);
        let asset = parse_dds(&bytes).unwrap();
        assert!(asset.cube);
        assert_eq!(asset.layers, 6);
        assert_eq!(asset.format, PixelFormat::Bc3Unorm);
    }

    #[test]
    fn legacy_cube_missing_faces_is_rejected() {
        let mut bytes = header(8, 8, 1, b"DXT1", DDSCAPS2_CUBEMAP | 0x400, None);
        bytes.resize(bytes.len() + 6 * 32, 0);
        assert_eq!(parse_dds(&bytes), Err(DdsError::PartialCube));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = header(4, 4, 1, b"DXT1", 0, None);
        bytes.resize(bytes.len() + 8 + 100, 0);
        assert_eq!(parse_dds(&bytes).unwrap().data.len(), 8);
    }

    // ── DX10 headers ──────────────────────────────────────────────────────

    #[test]
    fn dx10_bc7_cube() {
        let asset = parse_dds(&bc7(16, 16, 5, true)).unwrap();
        assert_eq!(asset.format, PixelFormat::Bc7Unorm);
        assert!(asset.cube);
        assert_eq!(asset.layers, 6);
        assert_eq!(asset.mip_levels, 5);
        // 16x16 + 8x8 + 4x4 + 2x2 + 1x1 → 16 + 4 + 1 + 1 + 1 blocks of 16 bytes.
        assert_eq!(asset.data.len(), 6 * 23 * 16);
    }

    #[test]
    fn dx10_unknown_dxgi_format() {
        let bytes = header(4, 4, 1, b"DX10", 0, Some((2, 0, 1)));
        assert!(matches!(
            parse_dds(&bytes),
            Err(DdsError::UnsupportedFormat(_))
        ));
    }

    // ── malformed input ───────────────────────────────────────────────────

    #[test]
    fn bad_magic() {
        assert_eq!(parse_dds(b"PNG\0rest"), Err(DdsError::BadMagic));
    }

    #[test]
    fn truncated_payload() {
        let mut bytes = header(8, 8, 1, b"DXT1", 0, None);
        bytes.resize(bytes.len() + 10, 0);
        assert!(matches!(parse_dds(&bytes), Err(DdsError::Truncated { .. })));
    }

    #[test]
    fn volume_texture_rejected() {
        let bytes = header(4, 4, 1, b"DXT1", DDSCAPS2_VOLUME, None);
        assert_eq!(parse_dds(&bytes), Err(DdsError::Volume));
    }

    #[test]
    fn mip_count_beyond_chain_rejected() {
        let bytes = header(4, 4, 5, b"DXT1", 0, None);
        assert!(matches!(parse_dds(&bytes), Err(DdsError::BadHeader(_))));
    }

    #[test]
    fn cube_array_size_overflow_rejected() {
        let bytes = header(
            4,
            4,
            1,
            b"DX10",
            0,
            Some((98, DX10_MISC_TEXTURECUBE, 0x3000_0000)),
        );
        assert!(matches!(parse_dds(&bytes), Err(DdsError::BadHeader(_))));
    }

    #[test]
    fn huge_dimensions_rejected() {
        let bytes = header(u32::MAX, u32::MAX, 1, b"DXT5", 0, None);
        assert!(matches!(parse_dds(&bytes), Err(DdsError::BadHeader(_))));
    }

    #[test]
    fn payload_size_overflow_rejected() {
        // Each 2D layer fits, the array of them does not.
        let bytes = header(
            1 << 16,
            1 << 16,
            1,
            b"DX10",
            0,
            Some((28, 0, u32::MAX)),
        );
        assert!(matches!(parse_dds(&bytes), Err(DdsError::BadHeader(_))));
    }

    #[test]
    fn corrupt_header_file_is_asset_error() {
        let path = std::env::temp_dir().join("skybox-overflowing-header.dds");
        std::fs::write(&path, header(u32::MAX, u32::MAX, 1, b"DXT5", 0, None)).unwrap();
        let err = load_dds(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, RenderError::AssetLoad { path: p, .. } if p == path));
    }

    #[test]
    fn missing_file_is_asset_error_with_path() {
        let err = load_dds("definitely/not/here.dds").unwrap_err();
        match err {
            RenderError::AssetLoad { path, .. } => {
                assert_eq!(path, Path::new("definitely/not/here.dds"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── sizes ─────────────────────────────────────────────────────────────

    #[test]
    fn surface_bytes_round_up_to_blocks() {
        assert_eq!(PixelFormat::Bc1Unorm.surface_bytes(1, 1), Some(8));
        assert_eq!(PixelFormat::Bc1Unorm.surface_bytes(5, 5), Some(32));
        assert_eq!(PixelFormat::Bc3Unorm.surface_bytes(0, 0), Some(16));
        assert_eq!(PixelFormat::Rgba8Unorm.surface_bytes(3, 2), Some(24));
    }

    #[test]
    fn surface_bytes_overflow_is_none() {
        assert_eq!(PixelFormat::Rgba8Unorm.surface_bytes(u32::MAX, u32::MAX), None);
    }
}
