use std::collections::HashMap;

use crate::device::{scoped, DEPTH_FORMAT};
use crate::error::{RenderError, RenderResult};
use crate::resources::{ProgramHandle, ResourceStore};

use super::{primitive_state, DepthMode};

/// Render pipelines keyed by program and depth configuration.
///
/// Selecting a configuration is `set_pipeline` on the matching entry and has
/// no effect beyond subsequent draws in that pass.
pub struct PipelineStates {
    color_format: wgpu::TextureFormat,
    pipelines: HashMap<(ProgramHandle, DepthMode), wgpu::RenderPipeline>,
}

impl PipelineStates {
    pub fn new(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            pipelines: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn contains(&self, program: ProgramHandle, mode: DepthMode) -> bool {
        self.pipelines.contains_key(&(program, mode))
    }

    /// Builds the pipeline for `(program, mode)` unless it already exists.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        store: &ResourceStore,
        program: ProgramHandle,
        mode: DepthMode,
    ) -> RenderResult<()> {
        if self.contains(program, mode) {
            return Ok(());
        }
        let prog = store.program(program)?;
        let label = format!("{} {:?} pipeline", prog.label, mode);

        let build = || {
            Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&prog.pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &prog.vertex,
                    entry_point: Some(prog.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[prog.vertex_buffer_layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &prog.fragment,
                    entry_point: Some(prog.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: primitive_state(),
                depth_stencil: Some(mode.state(DEPTH_FORMAT)),
                multisample: wgpu::MultisampleState::default(),

                multiview_mask: None,
                cache: None,
            }))
        };
        let pipeline = scoped(device, build, |err| RenderError::creation(&label, err))?;

        log::debug!("built {label}");
        self.pipelines.insert((program, mode), pipeline);
        Ok(())
    }

    pub fn select(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        program: ProgramHandle,
        mode: DepthMode,
    ) -> RenderResult<()> {
        let pipeline = self
            .pipelines
            .get(&(program, mode))
            .ok_or(RenderError::UnknownHandle("pipeline"))?;
        pass.set_pipeline(pipeline);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pipelines.clear();
    }
}
