use glam::*;

use spirv_std::spirv;

use crate::DRAW_MODE_FILL;

/// Opaque red used for hexagon interiors.
pub const FILL_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// Picks the fill color when `draw_mode` is exactly zero and the edge color
/// for any other value, including modes that do not exist yet.
pub fn outline_color(draw_mode: u32, edge_color: Vec4) -> Vec4 {
    if draw_mode == DRAW_MODE_FILL {
        FILL_COLOR
    } else {
        edge_color
    }
}

#[spirv(fragment)]
pub fn outline_fragment(
    #[spirv(frag_coord)] _clip_position: Vec4,
    #[spirv(uniform, descriptor_set = 0, binding = 0)] draw_mode: &u32,
    #[spirv(uniform, descriptor_set = 0, binding = 1)] edge_color: &Vec4,
    out_color: &mut Vec4,
) {
    *out_color = outline_color(*draw_mode, *edge_color);
}
