use glam::*;
use palette::Srgba;
use serde_derive::{Deserialize, Serialize};
use wgpu::{util::DeviceExt, *};

use hexshade_shader::{DRAW_MODE_BINDING, DRAW_MODE_EDGE, DRAW_MODE_FILL, EDGE_COLOR_BINDING};

/// Named values for the draw mode uniform. Any nonzero mode draws the edge
/// color, `Edge` is just the canonical one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Fill,
    Edge,
}

impl From<DrawMode> for u32 {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Fill => DRAW_MODE_FILL,
            DrawMode::Edge => DRAW_MODE_EDGE,
        }
    }
}

/// Uniform values of the outlined program for one draw.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingParams {
    pub draw_mode: u32,
    pub edge_color: Vec4,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            draw_mode: DRAW_MODE_FILL,
            edge_color: Vec4::ZERO,
        }
    }
}

impl ShadingParams {
    pub fn fill() -> Self {
        Self::default()
    }

    pub fn edge(edge_color: impl Into<Vec4>) -> Self {
        Self {
            draw_mode: DrawMode::Edge.into(),
            edge_color: edge_color.into(),
        }
    }

    pub fn with_draw_mode(mut self, draw_mode: impl Into<u32>) -> Self {
        self.draw_mode = draw_mode.into();
        self
    }

    pub fn with_edge_color(mut self, edge_color: impl Into<Vec4>) -> Self {
        self.edge_color = edge_color.into();
        self
    }
}

/// Edge colors are copied component for component, no color space conversion.
pub fn edge_color(color: Srgba) -> Vec4 {
    vec4(color.red, color.green, color.blue, color.alpha)
}

/// The draw mode as it sits in its uniform buffer. Uniform buffers are
/// sized in multiples of 16 bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct DrawModeUniform {
    pub draw_mode: u32,
    _padding: [u32; 3],
}

impl DrawModeUniform {
    pub fn new(draw_mode: u32) -> Self {
        Self {
            draw_mode,
            _padding: [0; 3],
        }
    }
}

// Filled once at creation and only read by the fragment stage afterwards
const UNIFORM_USAGE: BufferUsages = BufferUsages::UNIFORM;

/// Buffers and bind group holding the uniforms of one outlined draw.
pub struct OutlineBindings {
    pub draw_mode_buffer: Buffer,
    pub edge_color_buffer: Buffer,
    pub bind_group: BindGroup,
}

impl OutlineBindings {
    pub fn new(device: &Device, layout: &BindGroupLayout, params: &ShadingParams) -> Self {
        let draw_mode_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Draw mode uniform"),
            contents: bytemuck::bytes_of(&DrawModeUniform::new(params.draw_mode)),
            usage: UNIFORM_USAGE,
        });
        let edge_color_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("Edge color uniform"),
            contents: bytemuck::bytes_of(&params.edge_color),
            usage: UNIFORM_USAGE,
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Outline bind group"),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: DRAW_MODE_BINDING,
                    resource: draw_mode_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: EDGE_COLOR_BINDING,
                    resource: edge_color_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            draw_mode_buffer,
            edge_color_buffer,
            bind_group,
        }
    }
}
