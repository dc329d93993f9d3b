use glam::*;

use spirv_std::spirv;

/// Embeds a hexagon offset into clip space without any transform. Offsets
/// outside of [-1, 1] are left for the fixed function clipper.
pub fn clip_position(hex_offset: Vec2) -> Vec4 {
    hex_offset.extend(0.0).extend(1.0)
}

#[spirv(vertex)]
pub fn hex_vertex(hex_offset: Vec2, #[spirv(position, invariant)] out_position: &mut Vec4) {
    *out_position = clip_position(hex_offset);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn offset_is_embedded_unchanged() {
        let offsets = [
            vec2(0.0, 0.0),
            vec2(0.5, -0.25),
            vec2(-1.0, 1.0),
            vec2(0.866_025_4, 0.5),
            vec2(f32::MIN_POSITIVE, -f32::MIN_POSITIVE),
        ];

        for offset in offsets {
            assert_eq!(clip_position(offset), vec4(offset.x, offset.y, 0.0, 1.0));
        }
    }

    #[test]
    fn out_of_range_offsets_are_not_clamped() {
        assert_eq!(clip_position(vec2(3.5, -12.0)), vec4(3.5, -12.0, 0.0, 1.0));
    }

    #[test]
    fn entry_point_writes_the_position() {
        let mut position = Vec4::splat(-7.0);
        hex_vertex(vec2(0.25, 0.75), &mut position);
        assert_eq!(position, vec4(0.25, 0.75, 0.0, 1.0));

        let mut again = Vec4::ZERO;
        hex_vertex(vec2(0.25, 0.75), &mut again);
        assert_eq!(position, again);
    }
}
