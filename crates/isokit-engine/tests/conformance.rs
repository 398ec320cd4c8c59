//! Renderer conformance: the same scenes run against every backend.
//!
//! The software backend always runs. Build with `--features gpu-tests` on a machine with
//! a wgpu adapter to also run the wgpu backend offscreen and compare its pixels with the
//! software output byte for byte.

use isokit_engine::coords::{Color, Vec2};
use isokit_engine::render::{FrameState, Renderer, RendererConfig, SoftwareRenderer, Sprite};
use isokit_engine::texture::{TextureFilter, TextureHandle, TextureRegion, TextureWrap};

const W: u32 = 64;
const H: u32 = 64;

fn software() -> Box<dyn Renderer> {
    let mut r = SoftwareRenderer::new(RendererConfig::default(), W, H);
    assert!(r.initialize());
    Box::new(r)
}

#[cfg(feature = "gpu-tests")]
fn gpu() -> Box<dyn Renderer> {
    use isokit_engine::render::{create_renderer, GraphicsApi, RenderTarget};

    let config = RendererConfig::default();
    assert_ne!(config.api, GraphicsApi::Software);
    let mut r = create_renderer(config, RenderTarget::Offscreen { width: W, height: H });
    assert!(r.initialize(), "no wgpu adapter available");
    r
}

fn pixel(buf: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * W + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

fn begin(r: &mut dyn Renderer, clear: Color) {
    r.set_clear_color(clear);
    r.begin_frame();
    assert_eq!(r.frame_state(), FrameState::Recording);
    r.set_projection(0.0, W as f32, H as f32, 0.0);
    r.clear();
}

fn end(r: &mut dyn Renderer) -> Vec<u8> {
    r.end_frame();
    let pixels = r.read_pixels().expect("readable target");
    assert_eq!(pixels.len(), (W * H * 4) as usize);
    pixels
}

/// 4x4 RGBA texture; every texel is distinct.
fn gradient_texels() -> Vec<u8> {
    let mut px = Vec::with_capacity(4 * 4 * 4);
    for y in 0..4u8 {
        for x in 0..4u8 {
            px.extend_from_slice(&[x * 60, y * 60, 200, 255]);
        }
    }
    px
}

fn solid_texture(r: &mut dyn Renderer, rgba: [u8; 4]) -> TextureHandle {
    r.create_texture(&rgba, 1, 1, TextureFilter::Nearest, TextureWrap::Clamp)
}

// ── scenes ───────────────────────────────────────────────────────────────────

fn scene_solid_quads(r: &mut dyn Renderer) -> Vec<u8> {
    begin(r, Color::black());
    r.draw_quad(Vec2::new(16.0, 16.0), Vec2::new(16.0, 16.0), Color::red());
    r.draw_quad(
        Vec2::new(16.0, 16.0),
        Vec2::new(16.0, 16.0),
        Color::new(0.0, 0.0, 1.0, 0.25),
    );
    r.draw_quad(Vec2::new(48.0, 48.0), Vec2::new(8.0, 8.0), Color::green());
    let out = end(r);

    assert_eq!(pixel(&out, 0, 0), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 7, 7), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 8, 8), [191, 0, 64, 255]);
    assert_eq!(pixel(&out, 23, 23), [191, 0, 64, 255]);
    assert_eq!(pixel(&out, 24, 24), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 44, 44), [0, 255, 0, 255]);
    assert_eq!(pixel(&out, 52, 52), [0, 0, 0, 255]);

    let stats = r.frame_stats();
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.clears, 1);
    assert_eq!(stats.vertices, 18);
    out
}

fn scene_textured_nearest(r: &mut dyn Renderer) -> Vec<u8> {
    let tex = r.create_texture(&gradient_texels(), 4, 4, TextureFilter::Nearest, TextureWrap::Clamp);
    assert!(tex.is_valid());

    begin(r, Color::black());
    r.draw_textured_quad(
        Vec2::new(16.0, 16.0),
        Vec2::new(32.0, 32.0),
        TextureRegion::full(tex),
        Color::white(),
    );
    // Bottom-right texel only, magnified.
    r.draw_textured_quad(
        Vec2::new(48.0, 48.0),
        Vec2::new(16.0, 16.0),
        TextureRegion::from_pixels(tex, 4, 4, 3, 3, 1, 1),
        Color::white(),
    );
    let out = end(r);

    for ty in 0..4u32 {
        for tx in 0..4u32 {
            let want = [tx as u8 * 60, ty as u8 * 60, 200, 255];
            assert_eq!(pixel(&out, tx * 8, ty * 8), want, "texel {tx},{ty}");
            assert_eq!(pixel(&out, tx * 8 + 7, ty * 8 + 7), want, "texel {tx},{ty}");
        }
    }
    assert_eq!(pixel(&out, 40, 40), [180, 180, 200, 255]);
    assert_eq!(pixel(&out, 55, 55), [180, 180, 200, 255]);
    assert_eq!(pixel(&out, 33, 33), [0, 0, 0, 255]);

    r.destroy_texture(tex);
    out
}

fn scene_viewport(r: &mut dyn Renderer) -> Vec<u8> {
    r.set_clear_color(Color::black());
    r.begin_frame();
    r.clear();
    r.set_viewport(W / 2, 0, W / 2, H);
    r.set_projection(-1.0, 1.0, -1.0, 1.0);
    r.draw_quad(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0), Color::white());
    let out = end(r);
    r.set_viewport(0, 0, W, H);

    assert_eq!(pixel(&out, 31, 10), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 32, 10), [255, 255, 255, 255]);
    assert_eq!(pixel(&out, 63, 63), [255, 255, 255, 255]);
    out
}

fn scene_mid_frame_clear(r: &mut dyn Renderer) -> Vec<u8> {
    begin(r, Color::black());
    r.draw_quad(Vec2::new(8.0, 8.0), Vec2::new(16.0, 16.0), Color::red());
    r.set_clear_color(Color::blue());
    r.clear();
    r.draw_quad(Vec2::new(56.0, 56.0), Vec2::new(16.0, 16.0), Color::green());
    let out = end(r);

    // The red quad was wiped by the second clear.
    assert_eq!(pixel(&out, 4, 4), [0, 0, 255, 255]);
    assert_eq!(pixel(&out, 56, 56), [0, 255, 0, 255]);
    assert_eq!(r.frame_stats().clears, 2);
    out
}

fn scene_batched_sprites(r: &mut dyn Renderer) -> Vec<u8> {
    let a = solid_texture(r, [255, 0, 0, 255]);
    let b = solid_texture(r, [0, 0, 255, 255]);

    begin(r, Color::black());
    r.begin_batch();
    for (i, tex) in [a, a, b, a].into_iter().enumerate() {
        let x = 8.0 + 16.0 * i as f32;
        r.draw_sprite(&Sprite::new(
            Vec2::new(x, 8.0),
            Vec2::new(16.0, 16.0),
            TextureRegion::full(tex),
        ));
    }
    r.end_batch();
    let out = end(r);

    let stats = r.frame_stats();
    assert_eq!(stats.batch_flushes, 3);
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.vertices, 24);
    assert_eq!(stats.dropped_draws, 0);

    assert_eq!(pixel(&out, 8, 8), [255, 0, 0, 255]);
    assert_eq!(pixel(&out, 24, 8), [255, 0, 0, 255]);
    assert_eq!(pixel(&out, 40, 8), [0, 0, 255, 255]);
    assert_eq!(pixel(&out, 56, 8), [255, 0, 0, 255]);
    assert_eq!(pixel(&out, 8, 24), [0, 0, 0, 255]);

    r.destroy_texture(a);
    r.destroy_texture(b);
    out
}

type Scene = fn(&mut dyn Renderer) -> Vec<u8>;

const SCENES: [(&str, Scene); 5] = [
    ("solid_quads", scene_solid_quads),
    ("textured_nearest", scene_textured_nearest),
    ("viewport", scene_viewport),
    ("mid_frame_clear", scene_mid_frame_clear),
    ("batched_sprites", scene_batched_sprites),
];

// ── behavior ─────────────────────────────────────────────────────────────────

fn check_handle_lifecycle(r: &mut dyn Renderer) {
    let px = gradient_texels();
    let a = r.create_texture(&px, 4, 4, TextureFilter::Linear, TextureWrap::Repeat);
    assert!(a.is_valid());
    let info = r.texture_info(a);
    assert_eq!((info.width, info.height), (4, 4));
    assert_eq!(info.filter, TextureFilter::Linear);
    assert_eq!(info.wrap, TextureWrap::Repeat);

    r.destroy_texture(a);
    r.destroy_texture(a);
    assert_eq!(r.texture_info(a).width, 0);

    let b = r.create_texture(&px, 4, 4, TextureFilter::Nearest, TextureWrap::Clamp);
    assert!(b.is_valid());
    assert_ne!(a, b);

    begin(r, Color::black());
    r.draw_textured_quad(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), TextureRegion::full(a), Color::white());
    r.draw_textured_quad(
        Vec2::new(8.0, 8.0),
        Vec2::new(4.0, 4.0),
        TextureRegion::full(TextureHandle::INVALID),
        Color::white(),
    );
    r.draw_textured_quad(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), TextureRegion::full(b), Color::white());
    r.end_frame();

    let stats = r.frame_stats();
    assert_eq!(stats.dropped_draws, 2);
    assert_eq!(stats.draw_calls, 1);
    r.destroy_texture(b);
}

fn check_rejected_uploads(r: &mut dyn Renderer) {
    let nearest = TextureFilter::Nearest;
    let clamp = TextureWrap::Clamp;
    assert_eq!(r.create_texture(&[0; 15], 2, 2, nearest, clamp), TextureHandle::INVALID);
    assert_eq!(r.create_texture(&[], 0, 0, nearest, clamp), TextureHandle::INVALID);
    assert_eq!(r.create_texture(&[0; 4], 1, 0, nearest, clamp), TextureHandle::INVALID);

    let max = r.max_texture_size();
    assert!(max >= 2048);
    assert_eq!(r.create_texture(&[0; 4], max + 1, 1, nearest, clamp), TextureHandle::INVALID);
}

fn check_frame_bracket(r: &mut dyn Renderer) {
    // Outside a frame: nothing happens, nothing panics.
    r.draw_quad(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), Color::red());
    r.clear();
    r.end_frame();
    assert_eq!(r.frame_state(), FrameState::Idle);

    // Sprites outside begin_batch are dropped and counted.
    begin(r, Color::black());
    let tex = solid_texture(r, [255; 4]);
    r.draw_sprite(&Sprite::new(Vec2::new(4.0, 4.0), Vec2::new(2.0, 2.0), TextureRegion::full(tex)));
    // An open batch is flushed by end_frame.
    r.begin_batch();
    r.draw_sprite(&Sprite::new(Vec2::new(4.0, 4.0), Vec2::new(2.0, 2.0), TextureRegion::full(tex)));
    r.end_frame();
    let stats = r.frame_stats();
    assert_eq!(stats.dropped_draws, 1);
    assert_eq!(stats.batch_flushes, 1);
    r.destroy_texture(tex);
}

fn check_sprites_with_dead_handles(r: &mut dyn Renderer) {
    let tex = solid_texture(r, [255; 4]);
    r.destroy_texture(tex);

    begin(r, Color::black());
    r.begin_batch();
    r.draw_sprite(&Sprite::new(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), TextureRegion::full(tex)));
    r.draw_sprite(&Sprite::new(
        Vec2::new(8.0, 8.0),
        Vec2::new(4.0, 4.0),
        TextureRegion::full(TextureHandle::INVALID),
    ));
    r.end_batch();
    let out = end(r);

    let stats = r.frame_stats();
    assert_eq!(stats.dropped_draws, 2);
    assert_eq!(stats.batch_flushes, 0);
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(pixel(&out, 8, 8), [0, 0, 0, 255]);
}

fn check_destroy_mid_frame_still_draws(r: &mut dyn Renderer) {
    let red = solid_texture(r, [255, 0, 0, 255]);
    let blue = solid_texture(r, [0, 0, 255, 255]);

    begin(r, Color::black());
    r.draw_textured_quad(Vec2::new(16.0, 16.0), Vec2::new(8.0, 8.0), TextureRegion::full(red), Color::white());
    r.begin_batch();
    r.draw_sprite(&Sprite::new(Vec2::new(48.0, 16.0), Vec2::new(8.0, 8.0), TextureRegion::full(blue)));
    // Both textures go away while their draws are still queued.
    r.destroy_texture(red);
    r.destroy_texture(blue);
    r.end_batch();
    let out = end(r);

    let stats = r.frame_stats();
    assert_eq!(stats.dropped_draws, 0);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(pixel(&out, 16, 16), [255, 0, 0, 255]);
    assert_eq!(pixel(&out, 48, 16), [0, 0, 255, 255]);
    assert_eq!(r.texture_info(red).width, 0);

    // The next frame no longer accepts them.
    begin(r, Color::black());
    r.draw_textured_quad(Vec2::new(16.0, 16.0), Vec2::new(8.0, 8.0), TextureRegion::full(red), Color::white());
    let out = end(r);
    assert_eq!(r.frame_stats().dropped_draws, 1);
    assert_eq!(pixel(&out, 16, 16), [0, 0, 0, 255]);
}

fn check_invalid_frame(r: &mut dyn Renderer) {
    r.resize(0, 0);
    r.begin_frame();
    assert_eq!(r.frame_state(), FrameState::Invalid);
    r.clear();
    r.draw_quad(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), Color::red());
    r.end_frame();
    assert_eq!(r.frame_state(), FrameState::Idle);
    assert_eq!(r.frame_stats().dropped_draws, 2);
    assert_eq!(r.frame_stats().draw_calls, 0);

    r.resize(W, H);
    begin(r, Color::black());
    r.end_frame();
    assert_eq!(r.target_size(), (W, H));
}

fn run_behavior(r: &mut dyn Renderer) {
    check_handle_lifecycle(r);
    check_rejected_uploads(r);
    check_frame_bracket(r);
    check_sprites_with_dead_handles(r);
    check_destroy_mid_frame_still_draws(r);
    check_invalid_frame(r);
}

// ── software ─────────────────────────────────────────────────────────────────

#[test]
fn software_scenes() {
    let mut r = software();
    for (name, scene) in SCENES {
        let out = scene(r.as_mut());
        assert_eq!(out.len(), (W * H * 4) as usize, "{name}");
    }
}

#[test]
fn software_behavior() {
    let mut r = software();
    run_behavior(r.as_mut());
}

#[test]
fn software_output_is_deterministic() {
    let mut a = software();
    let mut b = software();
    for (name, scene) in SCENES {
        assert_eq!(scene(a.as_mut()), scene(b.as_mut()), "{name}");
    }
}

#[test]
fn shutdown_then_reinitialize_starts_clean() {
    let mut r = software();
    let tex = solid_texture(r.as_mut(), [1, 2, 3, 4]);
    r.shutdown();
    r.shutdown();
    assert!(!r.is_initialized());
    assert_eq!(r.texture_info(tex).width, 0);

    assert!(r.initialize());
    let again = solid_texture(r.as_mut(), [1, 2, 3, 4]);
    assert_ne!(tex, again);
    scene_solid_quads(r.as_mut());
}

// ── wgpu ─────────────────────────────────────────────────────────────────────

#[cfg(feature = "gpu-tests")]
#[test]
fn gpu_behavior() {
    let mut r = gpu();
    run_behavior(r.as_mut());
}

#[cfg(feature = "gpu-tests")]
#[test]
fn gpu_matches_software() {
    let mut sw = software();
    let mut hw = gpu();
    for (name, scene) in SCENES {
        let expected = scene(sw.as_mut());
        let actual = scene(hw.as_mut());
        let mismatches = expected
            .chunks_exact(4)
            .zip(actual.chunks_exact(4))
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(mismatches, 0, "{name}: {mismatches} pixels differ");
    }
}
