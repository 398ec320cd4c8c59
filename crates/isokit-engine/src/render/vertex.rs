use bytemuck::{Pod, Zeroable};

use crate::coords::{Color, Vec2};
use crate::texture::{TextureHandle, TextureRegion};

/// One corner of a quad as consumed by every backend.
///
/// Before recording, `position` is in the caller's logical space. Recorded vertices are in
/// framebuffer pixels, which both backends consume unchanged.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // texcoord
        2 => Float32x4  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Vertices emitted per quad (two triangles, no index buffer).
pub const VERTICES_PER_QUAD: usize = 6;

/// A textured quad submitted through the batch path.
///
/// `origin` is the pivot in normalized quad coordinates: `(0, 0)` is the top-left corner,
/// `(0.5, 0.5)` the center. `position` is where the pivot lands; `rotation` (radians)
/// spins the quad around it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub size: Vec2,
    pub region: TextureRegion,
    pub tint: Color,
    pub rotation: f32,
    pub origin: Vec2,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            size: Vec2::new(1.0, 1.0),
            region: TextureRegion::default(),
            tint: Color::white(),
            rotation: 0.0,
            origin: Vec2::new(0.5, 0.5),
        }
    }
}

impl Sprite {
    pub fn new(position: Vec2, size: Vec2, region: TextureRegion) -> Self {
        Self {
            position,
            size,
            region,
            ..Self::default()
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.region.texture
    }

    /// Expands the sprite into two triangles.
    ///
    /// The corner with the smaller local y receives `v0`, so V grows downward on screen
    /// for both the immediate and the batched path.
    pub fn vertices(&self) -> [Vertex; VERTICES_PER_QUAD] {
        let x0 = -self.origin.x * self.size.x;
        let y0 = -self.origin.y * self.size.y;
        let x1 = x0 + self.size.x;
        let y1 = y0 + self.size.y;

        let (cos, sin) = if self.rotation == 0.0 {
            (1.0, 0.0)
        } else {
            (self.rotation.cos(), self.rotation.sin())
        };
        let place = |x: f32, y: f32| {
            let p = Vec2::new(x, y).rotated(cos, sin) + self.position;
            [p.x, p.y]
        };

        let r = &self.region;
        let color = self.tint.to_array();
        let tl = Vertex {
            position: place(x0, y0),
            texcoord: [r.u0, r.v0],
            color,
        };
        let tr = Vertex {
            position: place(x1, y0),
            texcoord: [r.u1, r.v0],
            color,
        };
        let br = Vertex {
            position: place(x1, y1),
            texcoord: [r.u1, r.v1],
            color,
        };
        let bl = Vertex {
            position: place(x0, y1),
            texcoord: [r.u0, r.v1],
            color,
        };

        [tl, tr, br, tl, br, bl]
    }
}
