use thiserror::Error;

use crate::{contract::ContractError, pipeline::ShadingProgram};

/// Everything that can go wrong between loading a frame and reading back the
/// rendered pixels. The shading stages themselves cannot fail, so every
/// variant describes a problem at the host boundary.
#[derive(Debug, Error)]
pub enum HexShadeError {
    #[error("no compatible graphics adapter was found")]
    NoAdapter,

    #[error("could not create a device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("cannot render {width}x{height}, both sides must be between 1 and {max}")]
    InvalidSize { width: u32, height: u32, max: u32 },

    #[error("shader `{0}` is not embedded")]
    ShaderMissing(String),

    #[error("shader `{shader}` includes `{include}` which is not embedded")]
    ShaderInclude { shader: String, include: String },

    #[error("shader `{name}` failed to compile:\n{diagnostics}")]
    ShaderCompilation { name: String, diagnostics: String },

    #[error("shader `{name}` does not match its binding contract: {source}")]
    Contract {
        name: String,
        #[source]
        source: ContractError,
    },

    #[error("could not create the {program} pipeline: {message}")]
    PipelineCreation {
        program: ShadingProgram,
        message: String,
    },

    #[error("could not map the readback buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("the readback buffer was dropped before it was mapped")]
    ReadbackCancelled,

    #[error("the readback buffer does not hold a {width}x{height} image")]
    ReadbackSize { width: u32, height: u32 },

    #[error("invalid frame description: {0}")]
    Frame(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
