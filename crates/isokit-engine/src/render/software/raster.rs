//! CPU triangle rasterizer following GPU conventions.
//!
//! - vertices snapped to a 1/256 pixel grid (round to nearest)
//! - coverage sampled at pixel centers, top-left fill rule
//! - attributes interpolated linearly
//! - `src * a + dst * (1 - a)` blending, round-to-nearest UNORM8 output

use crate::coords::{unorm8, Color, PixelViewport};
use crate::render::Vertex;
use crate::texture::{TextureFilter, TextureWrap};

const SUBPIXEL_BITS: u32 = 8;
const SUBPIXEL_ONE: i64 = 1 << SUBPIXEL_BITS;
const SUBPIXEL_HALF: i64 = SUBPIXEL_ONE / 2;

/// Snapped coordinates are clamped here; edge math runs in i128 so products stay exact.
const SNAP_LIMIT: f64 = (1u64 << 40) as f64;

/// RGBA8 texture held in memory.
pub(crate) struct SoftTexture {
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    pub texels: Vec<u8>,
}

impl SoftTexture {
    fn wrap_coord(&self, i: i64, n: u32) -> usize {
        let n = i64::from(n);
        let i = match self.wrap {
            TextureWrap::Clamp => i.clamp(0, n - 1),
            TextureWrap::Repeat => i.rem_euclid(n),
        };
        i as usize
    }

    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let x = self.wrap_coord(x, self.width);
        let y = self.wrap_coord(y, self.height);
        let i = (y * self.width as usize + x) * 4;
        let t = &self.texels[i..i + 4];
        [
            t[0] as f32 / 255.0,
            t[1] as f32 / 255.0,
            t[2] as f32 / 255.0,
            t[3] as f32 / 255.0,
        ]
    }

    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let u = if u.is_finite() { u } else { 0.0 };
        let v = if v.is_finite() { v } else { 0.0 };
        let fu = u * self.width as f32;
        let fv = v * self.height as f32;

        match self.filter {
            TextureFilter::Nearest => self.texel(fu.floor() as i64, fv.floor() as i64),
            TextureFilter::Linear => {
                let fx = fu - 0.5;
                let fy = fv - 0.5;
                let x0 = fx.floor();
                let y0 = fy.floor();
                let ax = fx - x0;
                let ay = fy - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let t00 = self.texel(x0, y0);
                let t10 = self.texel(x0 + 1, y0);
                let t01 = self.texel(x0, y0 + 1);
                let t11 = self.texel(x0 + 1, y0 + 1);

                let mut out = [0.0; 4];
                for c in 0..4 {
                    let top = t00[c] + (t10[c] - t00[c]) * ax;
                    let bottom = t01[c] + (t11[c] - t01[c]) * ax;
                    out[c] = top + (bottom - top) * ay;
                }
                out
            }
        }
    }
}

/// RGBA8 color target, rows top to bottom.
pub(crate) struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[derive(Copy, Clone)]
struct Snapped {
    p: [i64; 2],
    texcoord: [f32; 2],
    color: [f32; 4],
}

fn snap(v: &Vertex) -> Option<Snapped> {
    let [x, y] = v.position;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let s = |c: f32| (f64::from(c) * SUBPIXEL_ONE as f64).round().clamp(-SNAP_LIMIT, SNAP_LIMIT) as i64;
    Some(Snapped {
        p: [s(x), s(y)],
        texcoord: v.texcoord,
        color: v.color,
    })
}

#[inline]
fn edge(a: [i64; 2], b: [i64; 2], p: [i64; 2]) -> i128 {
    (b[0] - a[0]) as i128 * (p[1] - a[1]) as i128 - (b[1] - a[1]) as i128 * (p[0] - a[0]) as i128
}

/// Top edges (horizontal, interior below) and left edges own the pixels they pass through.
#[inline]
fn is_top_left(a: [i64; 2], b: [i64; 2]) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dy == 0 && dx > 0) || dy < 0
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reallocates the target; contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Rasterizes a triangle list clipped to `scissor`.
    pub fn draw_triangles(
        &mut self,
        vertices: &[Vertex],
        scissor: PixelViewport,
        texture: Option<&SoftTexture>,
    ) {
        let Some(scissor) = scissor.clipped_to(self.width, self.height) else {
            return;
        };
        for tri in vertices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (snap(&tri[0]), snap(&tri[1]), snap(&tri[2])) else {
                continue;
            };
            self.draw_triangle(a, b, c, scissor, texture);
        }
    }

    fn draw_triangle(
        &mut self,
        v0: Snapped,
        mut v1: Snapped,
        mut v2: Snapped,
        scissor: PixelViewport,
        texture: Option<&SoftTexture>,
    ) {
        let mut area = edge(v0.p, v1.p, v2.p);
        if area == 0 {
            return;
        }
        if area < 0 {
            std::mem::swap(&mut v1, &mut v2);
            area = -area;
        }

        let min_x = v0.p[0].min(v1.p[0]).min(v2.p[0]);
        let max_x = v0.p[0].max(v1.p[0]).max(v2.p[0]);
        let min_y = v0.p[1].min(v1.p[1]).min(v2.p[1]);
        let max_y = v0.p[1].max(v1.p[1]).max(v2.p[1]);

        // Pixels whose centers can fall inside the bounding box, clipped to the scissor.
        let sx0 = i64::from(scissor.x);
        let sy0 = i64::from(scissor.y);
        let sx1 = sx0 + i64::from(scissor.width);
        let sy1 = sy0 + i64::from(scissor.height);
        let x_start = (min_x - SUBPIXEL_HALF).div_euclid(SUBPIXEL_ONE).max(sx0);
        let x_end = ((max_x - SUBPIXEL_HALF).div_euclid(SUBPIXEL_ONE) + 1).min(sx1);
        let y_start = (min_y - SUBPIXEL_HALF).div_euclid(SUBPIXEL_ONE).max(sy0);
        let y_end = ((max_y - SUBPIXEL_HALF).div_euclid(SUBPIXEL_ONE) + 1).min(sy1);
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        // Edge i is opposite vertex i.
        let edges = [(v1.p, v2.p), (v2.p, v0.p), (v0.p, v1.p)];
        let owns_zero = edges.map(|(a, b)| is_top_left(a, b));
        let step_x = edges.map(|(a, b)| -((b[1] - a[1]) as i128) * SUBPIXEL_ONE as i128);
        let step_y = edges.map(|(a, b)| ((b[0] - a[0]) as i128) * SUBPIXEL_ONE as i128);

        let origin = [
            x_start * SUBPIXEL_ONE + SUBPIXEL_HALF,
            y_start * SUBPIXEL_ONE + SUBPIXEL_HALF,
        ];
        let mut row = edges.map(|(a, b)| edge(a, b, origin));
        let inv_area = 1.0 / area as f64;

        for y in y_start..y_end {
            let mut w = row;
            for x in x_start..x_end {
                let inside = (0..3).all(|i| w[i] > 0 || (w[i] == 0 && owns_zero[i]));
                if inside {
                    let l = [
                        (w[0] as f64 * inv_area) as f32,
                        (w[1] as f64 * inv_area) as f32,
                        (w[2] as f64 * inv_area) as f32,
                    ];
                    let uv = [
                        l[0] * v0.texcoord[0] + l[1] * v1.texcoord[0] + l[2] * v2.texcoord[0],
                        l[0] * v0.texcoord[1] + l[1] * v1.texcoord[1] + l[2] * v2.texcoord[1],
                    ];
                    let mut src = [0.0f32; 4];
                    for c in 0..4 {
                        src[c] = l[0] * v0.color[c] + l[1] * v1.color[c] + l[2] * v2.color[c];
                    }
                    if let Some(tex) = texture {
                        let t = tex.sample(uv[0], uv[1]);
                        for c in 0..4 {
                            src[c] *= t[c];
                        }
                    }
                    self.blend(x as usize, y as usize, src);
                }
                for i in 0..3 {
                    w[i] += step_x[i];
                }
            }
            for i in 0..3 {
                row[i] += step_y[i];
            }
        }
    }

    /// Straight-alpha "over": rgb = src * a + dst * (1 - a), alpha = a + dst_a * (1 - a).
    fn blend(&mut self, x: usize, y: usize, src: [f32; 4]) {
        let i = (y * self.width as usize + x) * 4;
        let dst = &mut self.pixels[i..i + 4];
        let src = src.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) });
        let a = src[3];
        let inv = 1.0 - a;
        for c in 0..3 {
            let d = dst[c] as f32 / 255.0;
            dst[c] = unorm8(src[c] * a + d * inv);
        }
        let da = dst[3] as f32 / 255.0;
        dst[3] = unorm8(a + da * inv);
    }
}
