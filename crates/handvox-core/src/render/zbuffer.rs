//! Per-pixel nearest-depth record

/// Depth buffer; smaller depth is closer. Cleared to infinity.
#[derive(Debug, Clone)]
pub struct ZBuffer {
    width: usize,
    height: usize,
    depths: Vec<f32>,
}

impl ZBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depths: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depths.fill(f32::INFINITY);
    }

    /// Resize and clear
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.depths.clear();
        self.depths.resize(width * height, f32::INFINITY);
    }

    /// Record `depth` if it is strictly closer than what the pixel holds
    ///
    /// Returns whether the pixel should be written. Out-of-range pixels and
    /// NaN depths always fail.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let slot = &mut self.depths[y * self.width + x];
        if depth < *slot {
            *slot = depth;
            true
        } else {
            false
        }
    }

    /// Stored depth, or infinity outside the buffer
    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return f32::INFINITY;
        }
        self.depths[y * self.width + x]
    }
}
