use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use winit::window::Window;

use crate::coords::Color;
use crate::device::GpuInit;

use super::batch::DEFAULT_MAX_QUADS;
use super::software::SoftwareRenderer;
use super::wgpu_backend::WgpuRenderer;
use super::Renderer;

/// Environment variable overriding the detected graphics API.
pub const BACKEND_ENV: &str = "ISOKIT_BACKEND";

/// Graphics API a renderer runs on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GraphicsApi {
    Vulkan,
    Metal,
    Dx12,
    Gl,
    /// CPU reference rasterizer.
    Software,
}

impl GraphicsApi {
    /// Platform default: Metal on Apple, D3D12 on Windows, GL on the web, Vulkan elsewhere.
    pub fn detect() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            GraphicsApi::Metal
        } else if cfg!(target_os = "windows") {
            GraphicsApi::Dx12
        } else if cfg!(target_arch = "wasm32") {
            GraphicsApi::Gl
        } else {
            GraphicsApi::Vulkan
        }
    }

    /// `ISOKIT_BACKEND` if set and valid, otherwise [`GraphicsApi::detect`].
    pub fn from_env_or_detect() -> Self {
        match std::env::var(BACKEND_ENV) {
            Ok(v) => match v.parse() {
                Ok(api) => api,
                Err(e) => {
                    log::warn!("{BACKEND_ENV}: {e}; using platform default");
                    Self::detect()
                }
            },
            Err(_) => Self::detect(),
        }
    }

    /// wgpu backend set for GPU APIs; `None` for the software rasterizer.
    pub fn wgpu_backends(self) -> Option<wgpu::Backends> {
        match self {
            GraphicsApi::Vulkan => Some(wgpu::Backends::VULKAN),
            GraphicsApi::Metal => Some(wgpu::Backends::METAL),
            GraphicsApi::Dx12 => Some(wgpu::Backends::DX12),
            GraphicsApi::Gl => Some(wgpu::Backends::GL),
            GraphicsApi::Software => None,
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphicsApi::Vulkan => "vulkan",
            GraphicsApi::Metal => "metal",
            GraphicsApi::Dx12 => "dx12",
            GraphicsApi::Gl => "gl",
            GraphicsApi::Software => "software",
        };
        f.write_str(s)
    }
}

impl FromStr for GraphicsApi {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "vulkan" | "vk" => GraphicsApi::Vulkan,
            "metal" | "mtl" => GraphicsApi::Metal,
            "dx12" | "d3d12" => GraphicsApi::Dx12,
            "gl" | "opengl" | "gles" | "webgl" => GraphicsApi::Gl,
            "software" | "sw" | "cpu" => GraphicsApi::Software,
            other => bail!("unknown graphics api `{other}`"),
        })
    }
}

/// Renderer construction parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub api: GraphicsApi,

    /// Device/surface parameters for GPU backends. `backends` is overwritten from `api`.
    pub gpu: GpuInit,

    pub max_batch_quads: usize,
    pub clear_color: Color,

    /// Frames a destroyed texture stays resolvable for commands already recorded.
    pub retire_latency_frames: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            api: GraphicsApi::detect(),
            gpu: GpuInit::default(),
            max_batch_quads: DEFAULT_MAX_QUADS,
            clear_color: Color::cornflower_blue(),
            retire_latency_frames: 2,
        }
    }
}

impl RendererConfig {
    /// Default config with the API taken from `ISOKIT_BACKEND` when present.
    pub fn from_env() -> Self {
        Self {
            api: GraphicsApi::from_env_or_detect(),
            ..Self::default()
        }
    }

    pub fn with_api(mut self, api: GraphicsApi) -> Self {
        self.api = api;
        self
    }
}

/// Where a renderer draws.
#[derive(Copy, Clone)]
pub enum RenderTarget<'w> {
    /// A window's swapchain.
    Window(&'w Window),
    /// A headless color target with readback.
    Offscreen { width: u32, height: u32 },
}

impl RenderTarget<'_> {
    pub fn size(&self) -> (u32, u32) {
        match self {
            RenderTarget::Window(w) => {
                let s = w.inner_size();
                (s.width, s.height)
            }
            RenderTarget::Offscreen { width, height } => (*width, *height),
        }
    }
}

/// Builds the backend selected by `config.api`. The renderer still needs `initialize`.
///
/// The software backend renders into memory only; with a window target it sizes its
/// framebuffer from the window but does not present.
pub fn create_renderer<'w>(config: RendererConfig, target: RenderTarget<'w>) -> Box<dyn Renderer + 'w> {
    log::info!("creating {} renderer", config.api);
    match config.api {
        GraphicsApi::Software => {
            if matches!(target, RenderTarget::Window(_)) {
                log::warn!("software renderer does not present to windows; rendering offscreen");
            }
            let (w, h) = target.size();
            Box::new(SoftwareRenderer::new(config, w, h))
        }
        _ => Box::new(WgpuRenderer::new(config, target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_names_parse() {
        assert_eq!("Vulkan".parse::<GraphicsApi>().unwrap(), GraphicsApi::Vulkan);
        assert_eq!(" d3d12 ".parse::<GraphicsApi>().unwrap(), GraphicsApi::Dx12);
        assert_eq!("cpu".parse::<GraphicsApi>().unwrap(), GraphicsApi::Software);
        assert!("glide".parse::<GraphicsApi>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for api in [
            GraphicsApi::Vulkan,
            GraphicsApi::Metal,
            GraphicsApi::Dx12,
            GraphicsApi::Gl,
            GraphicsApi::Software,
        ] {
            assert_eq!(api.to_string().parse::<GraphicsApi>().unwrap(), api);
        }
    }

    #[test]
    fn detection_picks_a_gpu_api() {
        assert!(GraphicsApi::detect().wgpu_backends().is_some());
        assert!(GraphicsApi::Software.wgpu_backends().is_none());
    }

    #[test]
    fn software_renderer_from_factory() {
        let config = RendererConfig::default().with_api(GraphicsApi::Software);
        let mut r = create_renderer(config, RenderTarget::Offscreen { width: 8, height: 8 });
        assert_eq!(r.backend_name(), "software");
        assert!(r.initialize());
        assert_eq!(r.target_size(), (8, 8));
    }
}
