//! Shading program sources and their compilation.
//!
//! WGSL text is compiled with naga's front end and validator before any GPU
//! object exists, so compile failures come back with the compiler's own
//! diagnostic text.

use std::borrow::Cow;
use std::fmt;

use crate::error::{RenderError, RenderResult};

use super::layout::InputLayout;
use super::texture::TextureKind;

/// Pipeline stage a source targets; doubles as the compile profile.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn profile(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile())
    }
}

/// One stage's source text plus the entry point to compile.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub source: Cow<'static, str>,
    pub entry_point: &'static str,
    pub stage: ShaderStage,
}

impl StageSource {
    pub fn vertex(source: impl Into<Cow<'static, str>>, entry_point: &'static str) -> Self {
        Self {
            source: source.into(),
            entry_point,
            stage: ShaderStage::Vertex,
        }
    }

    pub fn fragment(source: impl Into<Cow<'static, str>>, entry_point: &'static str) -> Self {
        Self {
            source: source.into(),
            entry_point,
            stage: ShaderStage::Fragment,
        }
    }
}

/// Resource slots a program reads.
///
/// Group 0 holds `uniform_slots` vertex-stage constant buffers at bindings
/// `0..uniform_slots`. Group 1 holds one fragment-stage texture at binding 0
/// and its sampler at binding 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramBindings {
    pub uniform_slots: u32,
    pub texture: TextureKind,
}

/// Everything needed to build a vertex + fragment program pair.
#[derive(Debug, Clone)]
pub struct ShaderPairDesc {
    pub label: &'static str,
    pub vertex: StageSource,
    pub fragment: StageSource,
    pub input_layout: InputLayout,
    pub bindings: ProgramBindings,
}

pub const SKY_VS: &str = include_str!("../shaders/sky_vs.wgsl");
pub const SKY_FS: &str = include_str!("../shaders/sky_fs.wgsl");
pub const CUBE_VS: &str = include_str!("../shaders/cube_vs.wgsl");
pub const CUBE_FS: &str = include_str!("../shaders/cube_fs.wgsl");

impl ShaderPairDesc {
    /// Background program: position-only input, cube-map lookup.
    pub fn sky() -> Self {
        Self {
            label: "sky",
            vertex: StageSource::vertex(SKY_VS, "vs_main"),
            fragment: StageSource::fragment(SKY_FS, "fs_main"),
            input_layout: super::mesh::PositionVertex::layout(),
            bindings: ProgramBindings {
                uniform_slots: 1,
                texture: TextureKind::Cube,
            },
        }
    }

    /// Foreground program: position + uv input, model then view-projection.
    pub fn cube() -> Self {
        Self {
            label: "cube",
            vertex: StageSource::vertex(CUBE_VS, "vs_main"),
            fragment: StageSource::fragment(CUBE_FS, "fs_main"),
            input_layout: super::mesh::TexturedVertex::layout(),
            bindings: ProgramBindings {
                uniform_slots: 2,
                texture: TextureKind::Flat,
            },
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Parses and validates one stage, checking its entry point exists for the
/// requested stage.
pub fn compile_stage(label: &str, src: &StageSource) -> RenderResult<naga::Module> {
    let fail = |diagnostic: String| RenderError::ShaderCompile {
        label: label.to_string(),
        stage: src.stage.profile(),
        diagnostic,
    };

    let module = naga::front::wgsl::parse_str(&src.source)
        .map_err(|e| fail(e.emit_to_string(&src.source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| fail(error_chain(&e)))?;

    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == src.entry_point && ep.stage == src.stage.to_naga());
    if !found {
        return Err(fail(format!(
            "no {} entry point named `{}`",
            src.stage, src.entry_point
        )));
    }

    Ok(module)
}

/// `@location` inputs declared by a vertex entry point, including those
/// inside struct arguments.
pub fn vertex_input_locations(module: &naga::Module, entry_point: &str) -> Vec<u32> {
    let Some(ep) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry_point && ep.stage == naga::ShaderStage::Vertex)
    else {
        return Vec::new();
    };

    let mut locations = Vec::new();
    for arg in &ep.function.arguments {
        match &arg.binding {
            Some(naga::Binding::Location { location, .. }) => locations.push(*location),
            Some(naga::Binding::BuiltIn(_)) => {}
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                            locations.push(*location);
                        }
                    }
                }
            }
        }
    }
    locations.sort_unstable();
    locations
}

/// Compiles both stages and checks the input layout feeds every vertex input.
pub fn compile_pair(desc: &ShaderPairDesc) -> RenderResult<(naga::Module, naga::Module)> {
    let vertex = compile_stage(desc.label, &desc.vertex)?;
    let fragment = compile_stage(desc.label, &desc.fragment)?;

    let layout_error = |diagnostic: String| RenderError::ShaderCompile {
        label: desc.label.to_string(),
        stage: ShaderStage::Vertex.profile(),
        diagnostic,
    };
    desc.input_layout.check().map_err(layout_error)?;

    for location in vertex_input_locations(&vertex, desc.vertex.entry_point) {
        if !desc.input_layout.has_location(location) {
            return Err(layout_error(format!(
                "vertex input @location({location}) is not provided by the input layout"
            )));
        }
    }

    Ok((vertex, fragment))
}
