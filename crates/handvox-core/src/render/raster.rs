//! Software rasterizer for drawable primitives

use super::color::Color;
use super::primitive::{DrawablePrimitive, PrimitiveKind, ScreenPoint};
use super::zbuffer::ZBuffer;
use crate::spatial::EPSILON;

/// RGB framebuffer with a depth buffer for opaque pixels
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    zbuffer: ZBuffer,
    depth_test: bool,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width * height],
            zbuffer: ZBuffer::new(width, height),
            depth_test: true,
        }
    }

    /// Enable or disable depth testing of opaque primitives
    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, background: Color) {
        self.pixels.fill(background);
        self.zbuffer.clear();
    }

    pub fn resize(&mut self, width: usize, height: usize, background: Color) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, background);
        self.zbuffer.resize(width, height);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn zbuffer(&self) -> &ZBuffer {
        &self.zbuffer
    }

    /// Draw primitives in the given order
    ///
    /// Opaque pixels are depth-tested. Everything else is alpha-composited
    /// over whatever is already there.
    pub fn rasterize(&mut self, primitives: &[DrawablePrimitive]) {
        for prim in primitives {
            match prim.kind {
                PrimitiveKind::Polygon => self.fill_polygon(prim),
                PrimitiveKind::Line => {
                    if let [a, b] = prim.points.as_slice() {
                        self.draw_line(*a, *b, prim);
                    }
                }
            }
        }
    }

    /// Cross of `arm` pixels each way around `at`, drawn over the scene
    /// without a depth test
    pub fn draw_marker(&mut self, at: ScreenPoint, arm: f32, color: Color) {
        let point = |dx: f32, dy: f32| ScreenPoint::new(at.x + dx, at.y + dy, at.depth);
        self.rasterize(&[
            DrawablePrimitive::line(point(-arm, 0.0), point(arm, 0.0), color),
            DrawablePrimitive::line(point(0.0, -arm), point(0.0, arm), color),
        ]);
    }

    fn plot(&mut self, x: i64, y: i64, depth: f32, prim: &DrawablePrimitive) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let idx = y * self.width + x;
        if prim.is_depth_tested() {
            if self.depth_test && !self.zbuffer.test_and_set(x, y, depth) {
                return;
            }
            self.pixels[idx] = prim.color.with_alpha(255);
        } else {
            self.pixels[idx] = prim.color.blend_over(&self.pixels[idx]);
        }
    }

    /// Even-odd scanline fill sampled at pixel centers, with depth
    /// interpolated in 1/z across each span
    fn fill_polygon(&mut self, prim: &DrawablePrimitive) {
        let pts = &prim.points;
        if pts.len() < 3 {
            return;
        }
        let (min_y, max_y) = pts
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let first_row = (min_y - 0.5).ceil().max(0.0) as i64;
        let last_row = ((max_y - 0.5).floor() as i64).min(self.height as i64 - 1);

        let mut crossings: Vec<(f32, f32)> = Vec::with_capacity(pts.len());
        for row in first_row..=last_row {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for (i, a) in pts.iter().enumerate() {
                let b = &pts[(i + 1) % pts.len()];
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    let t = (yc - a.y) / (b.y - a.y);
                    let x = a.x + t * (b.x - a.x);
                    let inv = inv_depth(a.depth) + t * (inv_depth(b.depth) - inv_depth(a.depth));
                    crossings.push((x, inv));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            for span in crossings.chunks_exact(2) {
                let (x0, inv0) = span[0];
                let (x1, inv1) = span[1];
                let start = (x0 - 0.5).ceil().max(0.0) as i64;
                let end = ((x1 - 0.5).ceil() as i64).min(self.width as i64);
                for px in start..end {
                    let xc = px as f32 + 0.5;
                    let t = if x1 - x0 > EPSILON { (xc - x0) / (x1 - x0) } else { 0.0 };
                    let inv = inv0 + t * (inv1 - inv0);
                    self.plot(px, row, 1.0 / inv.max(EPSILON), prim);
                }
            }
        }
    }

    /// Bresenham line between the pixels holding the endpoints
    fn draw_line(&mut self, a: ScreenPoint, b: ScreenPoint, prim: &DrawablePrimitive) {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return;
        }
        let (mut x0, mut y0) = (a.x.floor() as i64, a.y.floor() as i64);
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let steps = dx.max(-dy).max(1) as f32;
        let mut step = 0.0;

        loop {
            let depth = a.depth + (b.depth - a.depth) * (step / steps);
            self.plot(x0, y0, depth, prim);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }
}

fn inv_depth(d: f32) -> f32 {
    1.0 / d.max(EPSILON)
}
