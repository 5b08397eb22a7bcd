//! Input-layout descriptors: how vertex buffer bytes feed shader inputs.

/// Vertex attribute component formats used by the meshes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }

    pub fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// One named vertex input bound to a shader `@location`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Debug name; matched against nothing, shown in diagnostics.
    pub name: &'static str,
    pub location: u32,
    pub format: VertexFormat,
    /// Byte offset inside one vertex.
    pub offset: u64,
}

impl VertexAttribute {
    pub const fn new(name: &'static str, location: u32, format: VertexFormat, offset: u64) -> Self {
        Self {
            name,
            location,
            format,
            offset,
        }
    }
}

/// Single interleaved vertex buffer layout.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InputLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl InputLayout {
    pub fn new(stride: u64, attributes: Vec<VertexAttribute>) -> Self {
        Self { stride, attributes }
    }

    pub fn has_location(&self, location: u32) -> bool {
        self.attributes.iter().any(|a| a.location == location)
    }

    /// Attributes must fit in the stride and must not share locations.
    pub fn check(&self) -> Result<(), String> {
        for (i, a) in self.attributes.iter().enumerate() {
            if a.offset + a.format.size() > self.stride {
                return Err(format!(
                    "attribute `{}` ends at byte {} past stride {}",
                    a.name,
                    a.offset + a.format.size(),
                    self.stride
                ));
            }
            if self.attributes[..i].iter().any(|b| b.location == a.location) {
                return Err(format!("location {} bound twice", a.location));
            }
        }
        Ok(())
    }

    pub(crate) fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format.to_wgpu(),
                offset: a.offset,
                shader_location: a.location,
            })
            .collect()
    }
}
