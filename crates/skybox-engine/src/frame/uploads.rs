//! Which scene matrix feeds which constant buffer.

use glam::Mat4;

use crate::error::RenderResult;
use crate::resources::BufferHandle;
use crate::scene::SceneMatrices;

use super::config::Layers;
use super::plan::Layer;

pub const MATRIX_BYTES: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// A derived matrix a constant buffer carries.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MatrixSlot {
    Model,
    ViewProjection,
    BackgroundViewProjection,
}

impl MatrixSlot {
    pub fn pick(self, m: &SceneMatrices) -> Mat4 {
        match self {
            MatrixSlot::Model => m.model,
            MatrixSlot::ViewProjection => m.view_projection,
            MatrixSlot::BackgroundViewProjection => m.background_view_projection,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatrixSlot::Model => "model",
            MatrixSlot::ViewProjection => "view-projection",
            MatrixSlot::BackgroundViewProjection => "background view-projection",
        }
    }

    /// Matrices a layer's program reads, in uniform-slot order.
    pub fn for_layer(layer: Layer) -> &'static [MatrixSlot] {
        match layer {
            Layer::Background => &[MatrixSlot::BackgroundViewProjection],
            Layer::Foreground => &[MatrixSlot::Model, MatrixSlot::ViewProjection],
        }
    }
}

/// Constant buffers rewritten from the scene every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixUploads {
    entries: Vec<(Layer, BufferHandle, MatrixSlot)>,
}

impl MatrixUploads {
    /// One buffer per slot of every enabled layer. `create` allocates them.
    pub fn standard(
        layers: Layers,
        mut create: impl FnMut(MatrixSlot) -> RenderResult<BufferHandle>,
    ) -> RenderResult<Self> {
        let mut entries = Vec::new();
        let enabled = [
            (Layer::Background, layers.background),
            (Layer::Foreground, layers.foreground),
        ];
        for (layer, on) in enabled {
            if !on {
                continue;
            }
            for &slot in MatrixSlot::for_layer(layer) {
                entries.push((layer, create(slot)?, slot));
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A layer's buffers in uniform-slot order, ready for a binding set.
    pub fn buffers(&self, layer: Layer) -> Vec<BufferHandle> {
        self.entries
            .iter()
            .filter(|(l, ..)| *l == layer)
            .map(|&(_, buffer, _)| buffer)
            .collect()
    }

    /// Column-major contents for every buffer.
    pub fn writes<'a>(
        &'a self,
        m: &'a SceneMatrices,
    ) -> impl Iterator<Item = (BufferHandle, [[f32; 4]; 4])> + 'a {
        self.entries
            .iter()
            .map(move |&(_, buffer, slot)| (buffer, slot.pick(m).to_cols_array_2d()))
    }
}
