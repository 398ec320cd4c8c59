/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Graphics APIs wgpu may pick an adapter from.
    ///
    /// Set by the renderer factory from `GraphicsApi`; `all()` lets wgpu decide.
    pub backends: wgpu::Backends,

    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: the software backend blends in UNORM space, and both backends
    /// must agree on every pixel.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference; falls back to a supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// Allow wgpu's software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Hint for the number of frames queued ahead of presentation.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
