//! Handle-based store for every GPU resource the renderer creates.
//!
//! Resources live in per-kind slot arenas addressed by index handles. The
//! store records creation order and releases in exact reverse.

use std::path::Path;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::device::scoped;
use crate::error::{RenderError, RenderResult};

use super::constant::{ConstantBuffer, UpdateFrequency};
use super::ledger::{CreationLedger, ResourceId};
use super::mesh::MeshData;
use super::shader::{self, ProgramBindings, ShaderPairDesc};
use super::texture::{self, GpuTexture, SamplerConfig, TextureKind};

macro_rules! handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub(crate) usize);

            impl $name {
                /// Wraps a raw slot index. Handles not issued by a store fail
                /// to resolve with `UnknownHandle`.
                pub fn from_raw(index: usize) -> Self {
                    Self(index)
                }

                pub fn index(self) -> usize {
                    self.0
                }
            }
        )*
    };
}

handle!(
    MeshHandle,
    ProgramHandle,
    TextureHandle,
    SamplerHandle,
    BufferHandle,
    BindingSetHandle,
);

/// Counts a draw needs without touching the GPU objects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeshInfo {
    pub vertex_count: u32,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

/// Immutable vertex + index buffers. Neither buffer allows later writes.
pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub info: MeshInfo,
}

/// A compiled vertex + fragment pair and the layouts derived from its slots.
pub(crate) struct Program {
    pub label: &'static str,
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    stride: u64,
    attributes: Vec<wgpu::VertexAttribute>,
    pub bindings: ProgramBindings,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl Program {
    pub(crate) fn vertex_buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Resources bound for one draw: group 0 uniforms, group 1 texture + sampler.
pub(crate) struct BindingSet {
    pub program: ProgramHandle,
    pub uniforms: wgpu::BindGroup,
    pub material: wgpu::BindGroup,
}

fn slot<'a, T>(arena: &'a [Option<T>], index: usize, kind: &'static str) -> RenderResult<&'a T> {
    arena
        .get(index)
        .and_then(Option::as_ref)
        .ok_or(RenderError::UnknownHandle(kind))
}

pub struct ResourceStore {
    device: wgpu::Device,
    queue: wgpu::Queue,

    meshes: Vec<Option<GpuMesh>>,
    programs: Vec<Option<Program>>,
    textures: Vec<Option<GpuTexture>>,
    samplers: Vec<Option<wgpu::Sampler>>,
    buffers: Vec<Option<ConstantBuffer>>,
    binding_sets: Vec<Option<BindingSet>>,

    ledger: CreationLedger,
}

impl ResourceStore {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            meshes: Vec::new(),
            programs: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            buffers: Vec::new(),
            binding_sets: Vec::new(),
            ledger: CreationLedger::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Runs creation work under GPU error scopes. Anything the device rejects
    /// is a fatal `ResourceCreation` error naming `label`.
    fn created<T>(&self, label: &str, work: impl FnOnce() -> RenderResult<T>) -> RenderResult<T> {
        scoped(&self.device, work, |err| RenderError::creation(label, err))
    }

    /// Validates and uploads a mesh. The buffers are never written again.
    pub fn create_static_mesh<V: Pod>(
        &mut self,
        label: &str,
        mesh: &MeshData<V>,
    ) -> RenderResult<MeshHandle> {
        mesh.validate()?;

        let (vertex_buffer, index_buffer) = self.created(&format!("mesh {label}"), || {
            let vertices = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} vertices")),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let indices = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} indices")),
                    contents: &mesh.index_bytes(),
                    usage: wgpu::BufferUsages::INDEX,
                });
            Ok((vertices, indices))
        })?;

        let info = MeshInfo {
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
            index_format: mesh.index_format(),
        };
        log::debug!(
            "mesh {label}: {} vertices, {} indices ({:?})",
            info.vertex_count,
            info.index_count,
            info.index_format
        );

        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            info,
        }));
        self.ledger.record(ResourceId::Mesh(handle.0));
        Ok(handle)
    }

    /// Compiles both stages and builds the program's binding layouts.
    pub fn create_shader_pair(&mut self, desc: &ShaderPairDesc) -> RenderResult<ProgramHandle> {
        shader::compile_pair(desc)?;
        let program = self.created(&format!("program {}", desc.label), || {
            Ok(self.build_program(desc))
        })?;
        log::debug!("program {} compiled", desc.label);

        let handle = ProgramHandle(self.programs.len());
        self.programs.push(Some(program));
        self.ledger.record(ResourceId::Program(handle.0));
        Ok(handle)
    }

    fn build_program(&self, desc: &ShaderPairDesc) -> Program {

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", desc.label)),
            source: wgpu::ShaderSource::Wgsl(desc.vertex.source.clone()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", desc.label)),
            source: wgpu::ShaderSource::Wgsl(desc.fragment.source.clone()),
        });

        let uniform_entries: Vec<_> = (0..desc.bindings.uniform_slots)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        let uniform_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{} uniforms layout", desc.label)),
                entries: &uniform_entries,
            });

        let texture_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{} texture layout", desc.label)),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: desc.bindings.texture.view_dimension(),
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} pipeline layout", desc.label)),
                bind_group_layouts: &[&uniform_layout, &texture_layout],
                immediate_size: 0,
            });

        Program {
            label: desc.label,
            vertex,
            fragment,
            vertex_entry: desc.vertex.entry_point,
            fragment_entry: desc.fragment.entry_point,
            stride: desc.input_layout.stride,
            attributes: desc.input_layout.wgpu_attributes(),
            bindings: desc.bindings,
            uniform_layout,
            texture_layout,
            pipeline_layout,
        }
    }

    pub fn create_texture(
        &mut self,
        path: &Path,
        kind: TextureKind,
    ) -> RenderResult<TextureHandle> {
        let texture = texture::load_texture(&self.device, &self.queue, path, kind)?;
        let handle = TextureHandle(self.textures.len());
        self.textures.push(Some(texture));
        self.ledger.record(ResourceId::Texture(handle.0));
        Ok(handle)
    }

    pub fn create_sampler(
        &mut self,
        label: &str,
        config: SamplerConfig,
    ) -> RenderResult<SamplerHandle> {
        let sampler = self.created(label, || {
            Ok(texture::create_sampler(&self.device, label, config))
        })?;
        let handle = SamplerHandle(self.samplers.len());
        self.samplers.push(Some(sampler));
        self.ledger.record(ResourceId::Sampler(handle.0));
        Ok(handle)
    }

    /// `initial` fills the buffer at creation. Static buffers require it and
    /// are never written again.
    pub fn create_constant_buffer(
        &mut self,
        label: &str,
        size: u64,
        frequency: UpdateFrequency,
        initial: Option<&[u8]>,
    ) -> RenderResult<BufferHandle> {
        let buffer = self.created(label, || {
            ConstantBuffer::new(&self.device, label, size, frequency, initial)
        })?;
        let handle = BufferHandle(self.buffers.len());
        self.buffers.push(Some(buffer));
        self.ledger.record(ResourceId::Buffer(handle.0));
        Ok(handle)
    }

    /// Full overwrite of a constant buffer's contents.
    pub fn update_constant_buffer(&self, handle: BufferHandle, data: &[u8]) -> RenderResult<()> {
        slot(&self.buffers, handle.0, "buffer")?.write(&self.queue, data)
    }

    /// Binds `uniforms` to group 0 (in slot order) and the texture + sampler to
    /// group 1 for draws with `program`.
    pub fn create_binding_set(
        &mut self,
        program: ProgramHandle,
        uniforms: &[BufferHandle],
        texture: TextureHandle,
        sampler: SamplerHandle,
    ) -> RenderResult<BindingSetHandle> {
        let prog = slot(&self.programs, program.0, "program")?;
        let mismatch = |reason: String| RenderError::BindingMismatch {
            program: prog.label.to_string(),
            reason,
        };

        if uniforms.len() as u32 != prog.bindings.uniform_slots {
            return Err(mismatch(format!(
                "{} constant buffers supplied, {} slots declared",
                uniforms.len(),
                prog.bindings.uniform_slots
            )));
        }
        let tex = slot(&self.textures, texture.0, "texture")?;
        if tex.kind != prog.bindings.texture {
            return Err(mismatch(format!(
                "{:?} texture supplied, {:?} expected",
                tex.kind, prog.bindings.texture
            )));
        }
        let smp = slot(&self.samplers, sampler.0, "sampler")?;

        let mut uniform_entries = Vec::with_capacity(uniforms.len());
        for (binding, handle) in uniforms.iter().enumerate() {
            let buffer = slot(&self.buffers, handle.0, "buffer")?;
            uniform_entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.buffer.as_entire_binding(),
            });
        }

        let group_label = format!("{} bindings", prog.label);
        let (uniform_group, material_group) = self.created(&group_label, || {
            let uniforms = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} uniforms", prog.label)),
                layout: &prog.uniform_layout,
                entries: &uniform_entries,
            });
            let material = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} texture", prog.label)),
                layout: &prog.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&tex.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(smp),
                    },
                ],
            });
            Ok((uniforms, material))
        })?;

        let handle = BindingSetHandle(self.binding_sets.len());
        self.binding_sets.push(Some(BindingSet {
            program,
            uniforms: uniform_group,
            material: material_group,
        }));
        self.ledger.record(ResourceId::BindingSet(handle.0));
        Ok(handle)
    }

    pub fn mesh_info(&self, handle: MeshHandle) -> RenderResult<MeshInfo> {
        Ok(slot(&self.meshes, handle.0, "mesh")?.info)
    }

    /// A binding set may only be drawn with the program it was built for.
    pub(crate) fn check_binding_set(
        &self,
        handle: BindingSetHandle,
        program: ProgramHandle,
    ) -> RenderResult<()> {
        let set = slot(&self.binding_sets, handle.0, "binding set")?;
        if set.program != program {
            return Err(RenderError::BindingMismatch {
                program: self.program(program)?.label.to_string(),
                reason: format!("binding set {} was built for another program", handle.0),
            });
        }
        Ok(())
    }

    pub(crate) fn mesh(&self, handle: MeshHandle) -> RenderResult<&GpuMesh> {
        slot(&self.meshes, handle.0, "mesh")
    }

    pub(crate) fn program(&self, handle: ProgramHandle) -> RenderResult<&Program> {
        slot(&self.programs, handle.0, "program")
    }

    pub(crate) fn binding_set(&self, handle: BindingSetHandle) -> RenderResult<&BindingSet> {
        slot(&self.binding_sets, handle.0, "binding set")
    }

    /// Drops every resource, newest first. Handles stop resolving afterwards.
    pub fn release_all(&mut self) {
        let count = self.ledger.len();
        for id in self.ledger.drain_reverse() {
            match id {
                ResourceId::Mesh(i) => self.meshes[i] = None,
                ResourceId::Sampler(i) => self.samplers[i] = None,
                ResourceId::Texture(i) => self.textures[i] = None,
                ResourceId::Buffer(i) => self.buffers[i] = None,
                ResourceId::Program(i) => self.programs[i] = None,
                ResourceId::BindingSet(i) => self.binding_sets[i] = None,
            }
        }
        log::debug!("released {count} resources");
    }
}

impl Drop for ResourceStore {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_resolves_live_entries_only() {
        let arena = vec![Some(1), None, Some(3)];
        assert_eq!(*slot(&arena, 0, "thing").unwrap(), 1);
        assert!(matches!(
            slot(&arena, 1, "thing"),
            Err(RenderError::UnknownHandle("thing"))
        ));
        assert!(slot(&arena, 7, "thing").is_err());
    }
}
