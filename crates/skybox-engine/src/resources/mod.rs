//! GPU resources: meshes, programs, textures, samplers, constant buffers,
//! and the binding sets that tie them to a draw.

mod constant;
mod layout;
mod ledger;
mod mesh;
mod shader;
mod store;
mod texture;

pub use constant::{check_full_write, ConstantBuffer, UpdateFrequency};
pub use layout::{InputLayout, VertexAttribute, VertexFormat};
pub use ledger::{CreationLedger, ResourceId};
pub use mesh::{cube, sky_sphere, MeshData, PositionVertex, TexturedVertex, MAX_SKY_SEGMENTS};
pub use shader::{
    compile_pair, compile_stage, vertex_input_locations, ProgramBindings, ShaderPairDesc,
    ShaderStage, StageSource,
};
pub use store::{
    BindingSetHandle, BufferHandle, MeshHandle, MeshInfo, ProgramHandle, ResourceStore,
    SamplerHandle, TextureHandle,
};
pub use texture::{
    check_asset, create_sampler, load_texture, GpuTexture, SamplerConfig, TextureKind,
};

pub(crate) use store::{BindingSet, GpuMesh, Program};
