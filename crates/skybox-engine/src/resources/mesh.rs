//! CPU-side mesh definitions and their validation.

use bytemuck::{Pod, Zeroable};

use crate::error::{RenderError, RenderResult};

use super::layout::{InputLayout, VertexAttribute, VertexFormat};

/// Foreground vertex: position + texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub fn layout() -> InputLayout {
        InputLayout::new(
            std::mem::size_of::<Self>() as u64,
            vec![
                VertexAttribute::new("position", 0, VertexFormat::Float32x3, 0),
                VertexAttribute::new("uv", 1, VertexFormat::Float32x2, 12),
            ],
        )
    }
}

/// Background vertex: position only.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

impl PositionVertex {
    pub fn layout() -> InputLayout {
        InputLayout::new(
            std::mem::size_of::<Self>() as u64,
            vec![VertexAttribute::new("position", 0, VertexFormat::Float32x3, 0)],
        )
    }
}

/// Immutable triangle-list mesh with 32-bit source indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> MeshData<V> {
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Every index must reference an existing vertex, and indices must form
    /// whole triangles.
    pub fn validate(&self) -> RenderResult<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(RenderError::InvalidMesh("mesh has no vertices or indices".into()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            )));
        }
        let count = self.vertex_count();
        if let Some(bad) = self.indices.iter().find(|&&i| i >= count) {
            return Err(RenderError::InvalidMesh(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        Ok(())
    }

    /// Index width for the GPU copy: 16-bit whenever every index fits.
    pub fn index_format(&self) -> wgpu::IndexFormat {
        if self.vertices.len() <= u16::MAX as usize + 1 {
            wgpu::IndexFormat::Uint16
        } else {
            wgpu::IndexFormat::Uint32
        }
    }

    /// Index bytes in the width chosen by [`index_format`](Self::index_format).
    pub fn index_bytes(&self) -> Vec<u8> {
        match self.index_format() {
            wgpu::IndexFormat::Uint16 => {
                let narrow: Vec<u16> = self.indices.iter().map(|&i| i as u16).collect();
                bytemuck::cast_slice(&narrow).to_vec()
            }
            wgpu::IndexFormat::Uint32 => bytemuck::cast_slice(&self.indices).to_vec(),
        }
    }
}

/// Unit-style cube with four vertices per face.
///
/// Faces do not share vertices so every face gets its own full `[0,1]`
/// texture square.
pub fn cube(half_extent: f32) -> MeshData<TexturedVertex> {
    let s = half_extent;
    let v = |x: f32, y: f32, z: f32, u: f32, w: f32| TexturedVertex {
        position: [x * s, y * s, z * s],
        uv: [u, w],
    };

    let vertices = vec![
        // -Z
        v(-1.0, -1.0, -1.0, 0.0, 1.0),
        v(-1.0, 1.0, -1.0, 0.0, 0.0),
        v(1.0, 1.0, -1.0, 1.0, 0.0),
        v(1.0, -1.0, -1.0, 1.0, 1.0),
        // +Z
        v(1.0, -1.0, 1.0, 0.0, 1.0),
        v(1.0, 1.0, 1.0, 0.0, 0.0),
        v(-1.0, 1.0, 1.0, 1.0, 0.0),
        v(-1.0, -1.0, 1.0, 1.0, 1.0),
        // -X
        v(-1.0, -1.0, 1.0, 0.0, 1.0),
        v(-1.0, 1.0, 1.0, 0.0, 0.0),
        v(-1.0, 1.0, -1.0, 1.0, 0.0),
        v(-1.0, -1.0, -1.0, 1.0, 1.0),
        // +X
        v(1.0, -1.0, -1.0, 0.0, 1.0),
        v(1.0, 1.0, -1.0, 0.0, 0.0),
        v(1.0, 1.0, 1.0, 1.0, 0.0),
        v(1.0, -1.0, 1.0, 1.0, 1.0),
        // +Y
        v(-1.0, 1.0, -1.0, 0.0, 1.0),
        v(-1.0, 1.0, 1.0, 0.0, 0.0),
        v(1.0, 1.0, 1.0, 1.0, 0.0),
        v(1.0, 1.0, -1.0, 1.0, 1.0),
        // -Y
        v(-1.0, -1.0, 1.0, 0.0, 1.0),
        v(-1.0, -1.0, -1.0, 0.0, 0.0),
        v(1.0, -1.0, -1.0, 1.0, 0.0),
        v(1.0, -1.0, 1.0, 1.0, 1.0),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect();

    MeshData::new(vertices, indices)
}

/// Upper bound on sky sphere slices and stacks.
pub const MAX_SKY_SEGMENTS: u32 = 1024;

/// Latitude/longitude sphere, rows running from the +Y pole to the -Y pole.
///
/// The seam column is duplicated so each row has `slices + 1` vertices.
/// Slices are clamped to `3..=MAX_SKY_SEGMENTS` and stacks to
/// `2..=MAX_SKY_SEGMENTS`.
pub fn sky_sphere(slices: u32, stacks: u32, radius: f32) -> MeshData<PositionVertex> {
    let slices = slices.clamp(3, MAX_SKY_SEGMENTS);
    let stacks = stacks.clamp(2, MAX_SKY_SEGMENTS);

    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for i in 0..=stacks {
        let phi = i as f32 * std::f32::consts::PI / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..=slices {
            let theta = j as f32 * std::f32::consts::TAU / slices as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            vertices.push(PositionVertex {
                position: [
                    radius * sin_phi * cos_theta,
                    radius * cos_phi,
                    radius * sin_phi * sin_theta,
                ],
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── cube ──────────────────────────────────────────────────────────────

    #[test]
    fn cube_has_per_face_vertices() {
        let mesh = cube(0.5);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        mesh.validate().unwrap();
    }

    #[test]
    fn cube_vertices_sit_on_the_half_extent() {
        for v in cube(0.5).vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
            assert!(v.uv.iter().all(|&c| c == 0.0 || c == 1.0));
        }
    }

    #[test]
    fn cube_uses_narrow_indices() {
        let mesh = cube(1.0);
        assert_eq!(mesh.index_format(), wgpu::IndexFormat::Uint16);
        assert_eq!(mesh.index_bytes().len(), 36 * 2);
    }

    // ── sky sphere ────────────────────────────────────────────────────────

    #[test]
    fn default_sky_counts() {
        let mesh = sky_sphere(48, 24, 50.0);
        assert_eq!(mesh.vertex_count(), 49 * 25);
        assert_eq!(mesh.index_count(), 48 * 24 * 6);
        mesh.validate().unwrap();
    }

    #[test]
    fn sky_vertices_lie_on_the_sphere() {
        for v in sky_sphere(12, 6, 50.0).vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn sky_rows_run_pole_to_pole() {
        let mesh = sky_sphere(8, 4, 1.0);
        assert!((mesh.vertices[0].position[1] - 1.0).abs() < 1e-6);
        assert!((mesh.vertices.last().unwrap().position[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_tessellation_is_clamped() {
        let mesh = sky_sphere(0, 0, 1.0);
        mesh.validate().unwrap();
        assert_eq!(mesh.index_count(), 3 * 2 * 6);
    }

    #[test]
    fn huge_tessellation_is_clamped() {
        let mesh = sky_sphere(u32::MAX, 2, 1.0);
        assert_eq!(mesh.vertex_count(), (MAX_SKY_SEGMENTS + 1) * 3);
        assert_eq!(mesh.index_count(), MAX_SKY_SEGMENTS * 2 * 6);
        mesh.validate().unwrap();
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn out_of_range_index_rejected() {
        let mesh = MeshData::new(vec![PositionVertex::zeroed(); 3], vec![0, 1, 3]);
        assert!(matches!(mesh.validate(), Err(RenderError::InvalidMesh(_))));
    }

    #[test]
    fn partial_triangle_rejected() {
        let mesh = MeshData::new(vec![PositionVertex::zeroed(); 3], vec![0, 1]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn empty_mesh_rejected() {
        let mesh: MeshData<PositionVertex> = MeshData::new(vec![], vec![]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn wide_indices_past_u16_range() {
        let mesh = MeshData::new(vec![PositionVertex::zeroed(); 70_000], vec![0, 1, 69_999]);
        assert_eq!(mesh.index_format(), wgpu::IndexFormat::Uint32);
        assert_eq!(mesh.index_bytes().len(), 12);
    }

    // ── layouts ───────────────────────────────────────────────────────────

    #[test]
    fn layouts_match_vertex_structs() {
        assert_eq!(TexturedVertex::layout().stride, 20);
        assert_eq!(PositionVertex::layout().stride, 12);
        assert_eq!(TexturedVertex::layout().attributes[1].offset, 12);
    }
}
