use glam::*;
use image::{Rgba, RgbaImage};
use palette::Srgba;

use hexshade_shader::{outline_color, silhouette_color};

use crate::{HexDraw, HexFrame, HexShadeError, OffscreenRenderer, ShadingParams, Topology};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;

/// A triangle larger than clip space, so every pixel is covered.
const COVER: [Vec2; 3] = [vec2(-1., -1.), vec2(3., -1.), vec2(-1., 3.)];

const EDGE_COLOR: Vec4 = vec4(0.2, 0.4, 0.6, 1.0);

fn renderer() -> OffscreenRenderer {
    let _ = env_logger::builder().is_test(true).try_init();
    smol::block_on(OffscreenRenderer::new(WIDTH, HEIGHT)).expect("Could not create renderer")
}

fn render(frame: &HexFrame) -> RgbaImage {
    smol::block_on(renderer().draw(frame)).expect("Could not draw frame")
}

/// The value a unorm target stores for a stage output.
fn expected_pixel(color: Vec4) -> Rgba<u8> {
    let channel = |value: f32| (value.clamp(0., 1.) * 255.).round() as u8;
    Rgba([
        channel(color.x),
        channel(color.y),
        channel(color.z),
        channel(color.w),
    ])
}

/// Pixel containing a clip space position.
fn pixel_at(image: &RgbaImage, position: Vec2) -> Rgba<u8> {
    let x = ((position.x + 1.) / 2. * image.width() as f32) as u32;
    let y = ((1. - position.y) / 2. * image.height() as f32) as u32;
    *image.get_pixel(x.min(image.width() - 1), y.min(image.height() - 1))
}

fn assert_uniform(image: &RgbaImage, expected: Rgba<u8>) {
    for (x, y, pixel) in image.enumerate_pixels() {
        assert_eq!(*pixel, expected, "pixel {x},{y}");
    }
}

#[test]
#[ignore = "needs a graphics adapter"]
fn fill_mode_draws_red() {
    let frame = HexFrame::new().with_draw(HexDraw::outlined(
        COVER,
        ShadingParams::fill().with_edge_color(EDGE_COLOR),
    ));
    let image = render(&frame);

    assert_eq!(expected_pixel(outline_color(0, EDGE_COLOR)), Rgba([255, 0, 0, 255]));
    assert_uniform(&image, Rgba([255, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn edge_mode_draws_the_edge_color() {
    let frame = HexFrame::new().with_draw(HexDraw::outlined(COVER, ShadingParams::edge(EDGE_COLOR)));
    let image = render(&frame);

    assert_uniform(&image, Rgba([51, 102, 153, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn any_nonzero_mode_draws_the_edge_color() {
    let mut renderer = renderer();

    for draw_mode in [2, 42, u32::MAX] {
        let params = ShadingParams::edge(EDGE_COLOR).with_draw_mode(draw_mode);
        let frame = HexFrame::new().with_draw(HexDraw::outlined(COVER, params));
        let image = smol::block_on(renderer.draw(&frame)).expect("Could not draw frame");

        assert_uniform(&image, expected_pixel(outline_color(draw_mode, EDGE_COLOR)));
    }
}

#[test]
#[ignore = "needs a graphics adapter"]
fn edge_color_is_passed_through_unmodified() {
    let edge_color = vec4(1.0, 0.6, 0.2, 0.4);
    let frame = HexFrame::new().with_draw(HexDraw::outlined(COVER, ShadingParams::edge(edge_color)));
    let image = render(&frame);

    // Replace blending keeps the alpha as written
    assert_uniform(&image, Rgba([255, 153, 51, 102]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn silhouette_draws_black() {
    let frame = HexFrame::new()
        .with_background(Srgba::new(1., 1., 1., 1.))
        .with_draw(HexDraw::silhouette(COVER));
    let image = render(&frame);

    assert_uniform(&image, expected_pixel(silhouette_color()));
    assert_uniform(&image, Rgba([0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn silhouette_ignores_params() {
    let frame = HexFrame::new().with_draw(
        HexDraw::silhouette(COVER).with_params(ShadingParams::edge(Vec4::ONE).with_draw_mode(7u32)),
    );
    let image = render(&frame);

    assert_uniform(&image, Rgba([0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn offsets_are_placed_in_clip_space() {
    let frame = HexFrame::new().with_draw(HexDraw::silhouette([
        vec2(0.3, 0.3),
        vec2(0.7, 0.3),
        vec2(0.5, 0.7),
    ]));
    let image = render(&frame);

    // Upper right quadrant in clip space is the top right of the image
    assert_eq!(pixel_at(&image, vec2(0.5, 0.5)), Rgba([0, 0, 0, 255]));
    assert_eq!(*image.get_pixel(48, 16), Rgba([0, 0, 0, 255]));
    assert_eq!(pixel_at(&image, vec2(-0.5, -0.5)), Rgba([0, 0, 0, 0]));
    assert_eq!(pixel_at(&image, vec2(-0.5, 0.5)), Rgba([0, 0, 0, 0]));
    assert_eq!(pixel_at(&image, vec2(0.5, -0.5)), Rgba([0, 0, 0, 0]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn empty_frame_is_cleared_to_the_background() {
    let frame = HexFrame::new().with_background(Srgba::new(1., 1., 1., 1.));
    let image = render(&frame);

    assert_uniform(&image, Rgba([255, 255, 255, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn draws_without_offsets_are_skipped() {
    let frame = HexFrame::new()
        .with_draw(HexDraw::silhouette(COVER))
        .with_draw(HexDraw::outlined(Vec::new(), ShadingParams::fill()));
    let image = render(&frame);

    assert_uniform(&image, Rgba([0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn edge_pass_overlays_the_fill() {
    // A horizontal line through the centers of pixel row 20
    let row = 20;
    let line_y = 1. - (row as f32 + 0.5) / HEIGHT as f32 * 2.;
    let frame = HexFrame::new()
        .with_draw(HexDraw::outlined(COVER, ShadingParams::fill()))
        .with_draw(
            HexDraw::outlined(
                [vec2(-1., line_y), vec2(0., line_y), vec2(1., line_y)],
                ShadingParams::edge(EDGE_COLOR),
            )
            .with_topology(Topology::LineStrip),
        );
    let image = render(&frame);

    let edge = Rgba([51, 102, 153, 255]);
    let red = Rgba([255, 0, 0, 255]);
    let edge_pixels = (0..WIDTH)
        .filter(|x| *image.get_pixel(*x, row) == edge)
        .count();
    assert!(edge_pixels > WIDTH as usize / 2, "{edge_pixels} edge pixels");

    for y in [0, 10, 40, 63] {
        for x in 0..WIDTH {
            assert_eq!(*image.get_pixel(x, y), red, "pixel {x},{y}");
        }
    }
}

#[test]
#[ignore = "needs a graphics adapter"]
fn pipelines_are_cached_per_program_and_topology() {
    let mut renderer = renderer();

    let frame = HexFrame::new()
        .with_draw(HexDraw::outlined(COVER, ShadingParams::fill()))
        .with_draw(HexDraw::outlined(COVER, ShadingParams::edge(EDGE_COLOR)));
    smol::block_on(renderer.draw(&frame)).expect("Could not draw frame");
    assert_eq!(renderer.renderer.pipeline_count(), 1);

    let frame = frame
        .with_draw(HexDraw::silhouette(COVER))
        .with_draw(HexDraw::outlined(COVER, ShadingParams::fill()).with_topology(Topology::LineStrip));
    smol::block_on(renderer.draw(&frame)).expect("Could not draw frame");
    assert_eq!(renderer.renderer.pipeline_count(), 3);
}

#[test]
#[ignore = "needs a graphics adapter"]
fn draws_are_applied_in_order() {
    let frame = HexFrame::new()
        .with_draw(HexDraw::silhouette(COVER))
        .with_draw(HexDraw::outlined(COVER, ShadingParams::fill()));
    let image = render(&frame);
    assert_uniform(&image, Rgba([255, 0, 0, 255]));

    let frame = HexFrame::new()
        .with_draw(HexDraw::outlined(COVER, ShadingParams::fill()))
        .with_draw(HexDraw::silhouette(COVER));
    let image = render(&frame);
    assert_uniform(&image, Rgba([0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn resized_renders_match_the_new_size() {
    let mut renderer = renderer();
    renderer.resize(300, 20).expect("Could not resize");

    let frame = HexFrame::new().with_draw(HexDraw::silhouette(COVER));
    let image = smol::block_on(renderer.draw(&frame)).expect("Could not draw frame");

    assert_eq!(image.dimensions(), (300, 20));
    assert_uniform(&image, Rgba([0, 0, 0, 255]));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn empty_targets_are_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let result = smol::block_on(OffscreenRenderer::new(0, 0));
    assert!(matches!(
        result,
        Err(HexShadeError::InvalidSize {
            width: 0,
            height: 0,
            ..
        })
    ));

    let mut renderer = renderer();
    assert!(matches!(
        renderer.resize(64, 0),
        Err(HexShadeError::InvalidSize { height: 0, .. })
    ));
    assert_eq!((renderer.renderer.width, renderer.renderer.height), (WIDTH, HEIGHT));
}

#[test]
#[ignore = "needs a graphics adapter"]
fn targets_past_the_device_limit_are_rejected() {
    let mut renderer = renderer();
    let max = renderer.renderer.device.limits().max_texture_dimension_2d;

    assert!(matches!(
        renderer.resize(max + 1, 16),
        Err(HexShadeError::InvalidSize { width, .. }) if width == max + 1
    ));

    let frame = HexFrame::new().with_draw(HexDraw::silhouette(COVER));
    let image = smol::block_on(renderer.draw(&frame)).expect("Could not draw frame");
    assert_eq!(image.dimensions(), (WIDTH, HEIGHT));
}
