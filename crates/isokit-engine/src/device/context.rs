use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::window::Window;

use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// What the GPU context renders into.
#[derive(Copy, Clone)]
pub enum SurfaceTarget<'w> {
    /// A window swapchain; the window must outlive the context.
    Window(&'w Window),
    /// A persistent offscreen color texture that can be read back.
    Offscreen { width: u32, height: u32 },
}

enum Presenter<'w> {
    Surface {
        surface: wgpu::Surface<'w>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

/// Owns wgpu core objects and the presentation target.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain) or the offscreen texture
/// - acquires frames and provides an encoder + view for rendering
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    presenter: Presenter<'w>,

    /// Current drawable size in physical pixels.
    size: (u32, u32),
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to `target`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(target: SurfaceTarget<'w>, init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let (surface, size) = match target {
            SurfaceTarget::Window(window) => {
                let size = window.inner_size();
                let surface = instance
                    .create_surface(window)
                    .context("failed to create wgpu surface")?;
                (Some(surface), (size.width, size.height))
            }
            SurfaceTarget::Offscreen { width, height } => (None, (width, height)),
        };
        anyhow::ensure!(size.0 > 0 && size.1 > 0, "render target has zero size");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("isokit device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let presenter = match surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                let format = surface::choose_surface_format(&caps, prefer_srgb)
                    .context("no supported surface formats")?;
                let alpha_mode = surface::choose_alpha_mode(&caps, alpha_mode);

                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.0,
                    height: size.1,
                    present_mode,
                    alpha_mode,
                    view_formats: vec![],
                    desired_maximum_frame_latency,
                };
                surface.configure(&device, &config);
                Presenter::Surface { surface, config }
            }
            None => Presenter::Offscreen {
                texture: surface::create_offscreen_texture(&device, size.0, size.1),
            },
        };

        let info = adapter.get_info();
        log::info!(
            "gpu ready: adapter={} backend={:?} target={}x{}",
            info.name,
            info.backend,
            size.0,
            size.1
        );

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            presenter,
            size,
        })
    }

    /// Color format of the render target.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        match &self.presenter {
            Presenter::Surface { config, .. } => config.format,
            Presenter::Offscreen { .. } => surface::OFFSCREEN_FORMAT,
        }
    }

    /// Current drawable size (physical pixels).
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_offscreen(&self) -> bool {
        matches!(self.presenter, Presenter::Offscreen { .. })
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the target after a resize. Zero sizes are remembered but not applied.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        if width == 0 || height == 0 {
            return;
        }

        match &mut self.presenter {
            Presenter::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            Presenter::Offscreen { texture } => {
                *texture = surface::create_offscreen_texture(&self.device, width, height);
            }
        }
    }

    /// Acquires the next drawable and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(SurfaceError::Outdated);
        }

        let (surface_texture, view) = match &self.presenter {
            Presenter::Surface { surface, .. } => {
                let st = surface.get_current_texture()?;
                let view = st
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (Some(st), view)
            }
            Presenter::Offscreen { texture } => (
                None,
                texture.create_view(&wgpu::TextureViewDescriptor::default()),
            ),
        };

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("isokit frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands for the given frame and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        if let Some(st) = surface_texture {
            st.present();
        }
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match &self.presenter {
            Presenter::Surface { surface, config } => {
                surface::map_surface_error(surface, &self.device, config, self.size, err)
            }
            // Offscreen acquisition only fails while the target is zero-sized.
            Presenter::Offscreen { .. } => SurfaceErrorAction::SkipFrame,
        }
    }

    /// Copies the offscreen target into tightly packed RGBA8 rows.
    ///
    /// Window surfaces cannot be read back and yield `Ok(None)`.
    pub fn read_offscreen(&self) -> Result<Option<Vec<u8>>> {
        let Presenter::Offscreen { texture } = &self.presenter else {
            return Ok(None);
        };
        if self.size.0 == 0 || self.size.1 == 0 {
            return Ok(None);
        }
        super::readback::read_texture_rgba8(&self.device, &self.queue, texture, self.size)
            .map(Some)
    }
}
