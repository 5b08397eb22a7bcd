//! Render-target bookkeeping: depth target, viewport, resize rules.

use crate::error::{RenderError, RenderResult};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Rasterization rectangle in physical pixels with a full `[0, 1]` depth range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Whole-target viewport.
    pub fn covering(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}

/// What a resize request turns into.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResizeOutcome {
    /// Minimised: keep the old targets, draw nothing until a real size arrives.
    Suspend,
    /// Reconfigure the surface and rebuild the depth target at this size.
    Apply { width: u32, height: u32 },
}

pub fn plan_resize(width: u32, height: u32, max_dimension: u32) -> RenderResult<ResizeOutcome> {
    if width == 0 || height == 0 {
        return Ok(ResizeOutcome::Suspend);
    }
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::Resize {
            width,
            height,
            reason: format!("exceeds the device limit of {max_dimension} pixels"),
        });
    }
    Ok(ResizeOutcome::Apply { width, height })
}

/// Sizes the surface back buffers, the depth target and the viewport were
/// last built at, plus the size last requested by the window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetExtents {
    /// May be zero while minimised.
    pub requested: (u32, u32),
    pub render_target: (u32, u32),
    pub depth_target: (u32, u32),
    pub viewport: Viewport,
}

impl TargetExtents {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            requested: (width, height),
            render_target: (width, height),
            depth_target: (width, height),
            viewport: Viewport::covering(width, height),
        }
    }

    /// Records a resize request and, when it applies, moves every target to
    /// the new size. The caller rebuilds the GPU objects on `Apply`.
    ///
    /// A rejected size leaves everything untouched.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        max_dimension: u32,
    ) -> RenderResult<ResizeOutcome> {
        let outcome = plan_resize(width, height, max_dimension)?;
        self.requested = (width, height);
        if let ResizeOutcome::Apply { width, height } = outcome {
            self.render_target = (width, height);
            self.depth_target = (width, height);
            self.viewport = Viewport::covering(width, height);
        }
        Ok(outcome)
    }

    pub fn is_suspended(&self) -> bool {
        self.requested.0 == 0 || self.requested.1 == 0
    }
}

/// Depth/stencil attachment matching the surface size.
pub struct DepthTarget {
    // Kept alive alongside its view.
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
