use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::render::{create_renderer, RenderTarget, Renderer, RendererConfig};
use crate::time::FrameClock;

/// Window and renderer settings for [`Runtime::run`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub renderer: RendererConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "isokit".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            renderer: RendererConfig::from_env(),
        }
    }
}

/// Runs one window with continuous redraw until the app exits or the window closes.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            app,
            window: None,
            init_error: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.init_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Box<dyn Renderer + 'this>,
}

struct AppState<A: App + 'static> {
    config: RuntimeConfig,
    app: A,
    window: Option<WindowEntry>,
    init_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A: App + 'static> AppState<A> {
    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let renderer_config = self.config.renderer.clone();
        let mut entry = WindowEntryBuilder {
            clock: FrameClock::default(),
            window,
            renderer_builder: |w| create_renderer(renderer_config, RenderTarget::Window(w)),
        }
        .build();

        let ok = entry.with_renderer_mut(|r| r.initialize());
        if !ok {
            anyhow::bail!("renderer initialization failed");
        }
        entry.with(|f| log::info!("window renderer: {}", f.renderer.backend_name()));
        Ok(entry)
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        // Renderer resources go before the window they borrow.
        self.window = None;
        event_loop.exit();
    }
}

impl<A: App + 'static> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.init_error = Some(e);
                self.exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if self.window.is_none() {
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),

            WindowEvent::Resized(size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_renderer_mut(|r| r.resize(size.width, size.height));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let size = entry.with_window(|w| w.inner_size());
                    entry.with_renderer_mut(|r| r.resize(size.width, size.height));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                let app = &mut self.app;
                let mut control = AppControl::Continue;
                if let Some(entry) = self.window.as_mut() {
                    entry.with_mut(|fields| {
                        let mut ctx = FrameCtx {
                            window: WindowCtx {
                                id: window_id,
                                window: fields.window,
                            },
                            renderer: fields.renderer.as_mut(),
                            time: fields.clock.tick(),
                        };
                        control = app.on_frame(&mut ctx);
                    });
                }
                if control == AppControl::Exit {
                    self.exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
