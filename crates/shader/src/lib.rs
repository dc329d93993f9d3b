//! Per-vertex and per-fragment logic for drawing a single hexagon.
//!
//! The entry points compile to SPIR-V with rust-gpu. On the CPU the same
//! functions act as the reference the host renders are compared against.
#![cfg_attr(target_arch = "spirv", no_std)]

mod hex;
mod outline;
mod silhouette;

pub use hex::*;
pub use outline::*;
pub use silhouette::*;

pub use glam;

use glam::*;

/// Vertex attribute location the hexagon offset is bound to.
pub const HEX_OFFSET_LOCATION: u32 = 0;

/// Descriptor set holding the outline uniforms.
pub const OUTLINE_UNIFORM_GROUP: u32 = 0;
/// Binding of the `draw_mode` uniform.
pub const DRAW_MODE_BINDING: u32 = 0;
/// Binding of the `edge_color` uniform.
pub const EDGE_COLOR_BINDING: u32 = 1;

/// `draw_mode` value selecting the fill color. Every other value selects the
/// edge color.
pub const DRAW_MODE_FILL: u32 = 0;
/// Conventional `draw_mode` value for edge passes.
pub const DRAW_MODE_EDGE: u32 = 1;

/// One vertex of the hexagon as it sits in the vertex buffer.
#[derive(Copy, Clone)]
#[cfg_attr(
    not(target_arch = "spirv"),
    derive(Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)
)]
#[repr(C)]
pub struct HexVertex {
    pub hex_offset: Vec2,
}

impl HexVertex {
    pub const fn new(hex_offset: Vec2) -> Self {
        Self { hex_offset }
    }
}
