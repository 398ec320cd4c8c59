/// A single acquired frame.
///
/// Short-lived: holding a surface texture blocks acquisition of the next one.
/// Offscreen frames carry no surface texture and render straight into the target.
pub struct GpuFrame {
    pub surface_texture: Option<wgpu::SurfaceTexture>,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
