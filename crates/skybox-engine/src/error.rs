//! Error taxonomy for the rendering core.
//!
//! Every variant is fatal for the session: the runtime logs it and exits.
//! Nothing here is retried or recovered mid-frame.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal rendering error.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Instance/adapter/device/surface could not be created.
    #[error("failed to create graphics device: {0}")]
    DeviceCreation(String),

    /// A shading program stage failed to compile or validate.
    ///
    /// `diagnostic` is the compiler output, unmodified.
    #[error("shader compile error in {label} ({stage}):\n{diagnostic}")]
    ShaderCompile {
        label: String,
        stage: &'static str,
        diagnostic: String,
    },

    /// A texture asset was missing or malformed.
    #[error("failed to load asset {}: {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },

    /// The GPU rejected a resource or pipeline during startup.
    #[error("failed to create {label}: {reason}")]
    ResourceCreation { label: String, reason: String },

    /// The surface could not be resized to the requested dimensions.
    #[error("failed to resize surface to {width}x{height}: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },

    /// A GPU call failed while updating, drawing, or presenting.
    #[error("frame failed: {0}")]
    Frame(String),

    /// Mesh data violates index/vertex invariants.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A constant buffer update did not cover the whole buffer.
    #[error("constant buffer {label}: expected a full {expected}-byte write, got {actual} bytes")]
    PartialWrite {
        label: String,
        expected: u64,
        actual: u64,
    },

    /// A static constant buffer was created without contents or rewritten.
    #[error("static constant buffer {label}: {reason}")]
    StaticBuffer { label: String, reason: &'static str },

    /// The pass list breaks an ordering or range rule.
    #[error("invalid frame plan: {0}")]
    InvalidPlan(String),

    /// The frame state machine was driven out of order.
    #[error("invalid frame transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::frame::FrameState,
        to: crate::frame::FrameState,
    },

    /// A binding set does not match the slots its program declares.
    #[error("binding set for {program}: {reason}")]
    BindingMismatch { program: String, reason: String },

    /// A handle did not resolve in the resource store.
    #[error("unknown {0} handle")]
    UnknownHandle(&'static str),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn creation(label: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceCreation {
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}
