use glam::*;

use spirv_std::spirv;

/// Opaque black, the only color a silhouette pass produces.
pub const SILHOUETTE_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

pub fn silhouette_color() -> Vec4 {
    SILHOUETTE_COLOR
}

#[spirv(fragment)]
pub fn silhouette_fragment(#[spirv(frag_coord)] _clip_position: Vec4, out_color: &mut Vec4) {
    *out_color = silhouette_color();
}
