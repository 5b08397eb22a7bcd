/// Depth-stencil configuration for a pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthMode {
    /// Pass when nearer, write depth.
    Default,
    /// Pass when nearer or equal, never write depth.
    ///
    /// Background geometry sits exactly on the far plane; `LessEqual` lets it
    /// through on a cleared buffer while leaving the buffer untouched.
    Background,
}

impl DepthMode {
    pub fn compare(self) -> wgpu::CompareFunction {
        match self {
            DepthMode::Default => wgpu::CompareFunction::Less,
            DepthMode::Background => wgpu::CompareFunction::LessEqual,
        }
    }

    pub fn writes_depth(self) -> bool {
        matches!(self, DepthMode::Default)
    }

    pub fn state(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.writes_depth(),
            depth_compare: self.compare(),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// CPU mirror of the comparison the GPU performs for one fragment.
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self.compare() {
            wgpu::CompareFunction::Less => incoming < stored,
            wgpu::CompareFunction::LessEqual => incoming <= stored,
            _ => false,
        }
    }
}
