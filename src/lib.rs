mod bindings;
mod contract;
mod error;
mod frame;
mod offscreen_renderer;
mod pipeline;
mod renderer;
mod shader;

#[cfg(test)]
mod test;

pub use hexshade_shader;
pub use hexshade_shader::{
    HexVertex, DRAW_MODE_BINDING, DRAW_MODE_EDGE, DRAW_MODE_FILL, EDGE_COLOR_BINDING,
    HEX_OFFSET_LOCATION, OUTLINE_UNIFORM_GROUP,
};

pub use bindings::*;
pub use contract::*;
pub use error::HexShadeError;
pub use frame::*;
pub use offscreen_renderer::{OffscreenRenderer, OFFSCREEN_FORMAT};
pub use pipeline::*;
pub use renderer::Renderer;
pub use shader::{CompiledShader, ShaderLoader, ShaderModules};
