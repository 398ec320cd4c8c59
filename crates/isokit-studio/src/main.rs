//! isokit studio: an isometric demo scene.
//!
//! ```text
//! isokit-studio                    # windowed, arrow keys pan the camera
//! isokit-studio --headless out.png # render one frame offscreen and save it
//! ```
//!
//! `ISOKIT_BACKEND` selects the renderer (`vulkan`, `metal`, `dx12`, `gl`, `software`).
//! Headless runs default to `software`.

mod world;

use anyhow::{bail, Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use isokit_engine::core::{App, AppControl, FrameCtx};
use isokit_engine::logging::{init_logging, LoggingConfig};
use isokit_engine::render::{
    create_renderer, GraphicsApi, RenderTarget, RendererConfig, BACKEND_ENV,
};
use isokit_engine::sprite::Image;
use isokit_engine::window::{Runtime, RuntimeConfig};

use world::World;

const HEADLESS_SIZE: (u32, u32) = (800, 600);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => run_windowed(),
        [flag, out] if flag == "--headless" => run_headless(out),
        _ => bail!("usage: isokit-studio [--headless <out.png>]"),
    }
}

fn run_headless(out: &str) -> Result<()> {
    let config = if std::env::var_os(BACKEND_ENV).is_some() {
        RendererConfig::from_env()
    } else {
        RendererConfig::default().with_api(GraphicsApi::Software)
    };
    let (width, height) = HEADLESS_SIZE;
    let mut renderer = create_renderer(config, RenderTarget::Offscreen { width, height });
    if !renderer.initialize() {
        bail!("{} renderer failed to initialize", renderer.backend_name());
    }

    let mut world = World::new(renderer.as_mut())?;
    world.center_camera(width, height);

    renderer.begin_frame();
    world.draw(renderer.as_mut());
    renderer.end_frame();

    let stats = renderer.frame_stats();
    log::info!(
        "frame: {} draw calls, {} batch flushes, {} vertices, {} dropped; {:?}",
        stats.draw_calls,
        stats.batch_flushes,
        stats.vertices,
        stats.dropped_draws,
        world.last_stats()
    );

    let pixels = renderer
        .read_pixels()
        .context("renderer has no readable target")?;
    let image = Image::from_rgba8(width, height, pixels).context("readback size mismatch")?;
    image.save(out)?;
    log::info!("wrote {out}");

    world.unload(renderer.as_mut());
    renderer.shutdown();
    Ok(())
}

fn run_windowed() -> Result<()> {
    let config = RuntimeConfig {
        title: "isokit studio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, Studio::default())
}

#[derive(Default)]
struct Studio {
    world: Option<World>,
    fps_timer: f64,
}

impl App for Studio {
    fn on_window_event(&mut self, _id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };
        let down = event.state == ElementState::Pressed;
        let Some(world) = self.world.as_mut() else {
            return AppControl::Continue;
        };
        match code {
            KeyCode::Escape if down => return AppControl::Exit,
            KeyCode::ArrowLeft => world.pan.left = down,
            KeyCode::ArrowRight => world.pan.right = down,
            KeyCode::ArrowUp => world.pan.up = down,
            KeyCode::ArrowDown => world.pan.down = down,
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.world.is_none() {
            match World::new(&mut *ctx.renderer) {
                Ok(mut world) => {
                    let (w, h) = ctx.window.size();
                    world.center_camera(w, h);
                    self.world = Some(world);
                }
                Err(e) => {
                    log::error!("failed to build the demo scene: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(world) = self.world.as_mut() else {
            return AppControl::Exit;
        };

        world.update(ctx.time.dt);
        ctx.render(|r| world.draw(r));

        if ctx.time.elapsed - self.fps_timer >= 2.0 {
            self.fps_timer = ctx.time.elapsed;
            let stats = ctx.renderer.frame_stats();
            log::debug!(
                "{:.0} fps, {} draw calls, {:?}",
                1.0 / ctx.time.dt.max(1e-6),
                stats.draw_calls,
                world.last_stats()
            );
        }
        AppControl::Continue
    }
}
