//! The ordered pass list a frame executes.

use crate::error::{RenderError, RenderResult};
use crate::pipeline::DepthMode;
use crate::resources::{BindingSetHandle, MeshHandle, ProgramHandle};

use super::config::Layers;

/// Which phase of the frame a pass runs in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Layer {
    Background,
    Foreground,
}

/// Values the first pass of a frame clears to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearValues {
    pub color: [f64; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl ClearValues {
    pub fn new(color: [f64; 4]) -> Self {
        Self {
            color,
            depth: 1.0,
            stencil: 0,
        }
    }

    pub fn wgpu_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.color;
        wgpu::Color { r, g, b, a }
    }
}

/// One indexed draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Draw {
    pub mesh: MeshHandle,
    pub program: ProgramHandle,
    pub bindings: BindingSetHandle,
    pub index_count: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassDescriptor {
    pub label: &'static str,
    pub layer: Layer,
    pub depth: DepthMode,
    /// `None` for a clear-only pass.
    pub draw: Option<Draw>,
    pub clear: Option<ClearValues>,
}

/// The draws the standard scene can issue.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StandardDraws {
    pub sky: Option<Draw>,
    pub cube: Option<Draw>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramePlan {
    passes: Vec<PassDescriptor>,
}

impl FramePlan {
    pub fn new(passes: Vec<PassDescriptor>) -> Self {
        Self { passes }
    }

    /// Sky, then cube, with the clear on whichever comes first. With both
    /// layers off the plan is a single clear-only pass.
    pub fn standard(layers: Layers, draws: StandardDraws, clear: ClearValues) -> Self {
        let mut passes = Vec::new();

        if layers.background {
            if let Some(sky) = draws.sky {
                passes.push(PassDescriptor {
                    label: "sky pass",
                    layer: Layer::Background,
                    depth: DepthMode::Background,
                    draw: Some(sky),
                    clear: None,
                });
            }
        }
        if layers.foreground {
            if let Some(cube) = draws.cube {
                passes.push(PassDescriptor {
                    label: "cube pass",
                    layer: Layer::Foreground,
                    depth: DepthMode::Default,
                    draw: Some(cube),
                    clear: None,
                });
            }
        }

        match passes.first_mut() {
            Some(first) => first.clear = Some(clear),
            None => passes.push(PassDescriptor {
                label: "clear pass",
                layer: Layer::Background,
                depth: DepthMode::Default,
                draw: None,
                clear: Some(clear),
            }),
        }

        Self { passes }
    }

    pub fn passes(&self) -> &[PassDescriptor] {
        &self.passes
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &PassDescriptor> {
        self.passes.iter().filter(move |p| p.layer == layer)
    }

    /// Index total across every draw.
    pub fn index_total(&self) -> u32 {
        self.passes
            .iter()
            .filter_map(|p| p.draw)
            .map(|d| d.index_count)
            .sum()
    }

    /// Ordering and range rules. `mesh_indices` resolves a mesh's index count.
    pub fn validate(
        &self,
        mesh_indices: impl Fn(MeshHandle) -> Option<u32>,
    ) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidPlan(msg));

        let clearing: Vec<usize> = self
            .passes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.clear.is_some())
            .map(|(i, _)| i)
            .collect();
        match clearing.as_slice() {
            [] => return invalid("no pass clears the targets".into()),
            [0] => {}
            [i] => {
                return invalid(format!(
                    "clearing pass `{}` is not first",
                    self.passes[*i].label
                ))
            }
            _ => return invalid(format!("{} passes clear the targets", clearing.len())),
        }

        let mut seen_foreground = false;
        for pass in &self.passes {
            match pass.layer {
                Layer::Foreground => seen_foreground = true,
                Layer::Background if seen_foreground => {
                    return invalid(format!(
                        "background pass `{}` follows a foreground pass",
                        pass.label
                    ));
                }
                Layer::Background => {}
            }

            if let Some(draw) = pass.draw {
                let available =
                    mesh_indices(draw.mesh).ok_or(RenderError::UnknownHandle("mesh"))?;
                if draw.index_count > available {
                    return invalid(format!(
                        "pass `{}` draws {} indices from a mesh with {available}",
                        pass.label, draw.index_count
                    ));
                }
            }
        }
        Ok(())
    }
}
