//! Hand position → world-space editing cursor

use super::classify::positive;
use crate::error::{ConfigError, Result};
use crate::spatial::Vector3D;
use crate::world::GridCoord;

/// Clamp-then-remap of detector depth onto a world depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthMapping {
    pub source_min: f32,
    pub source_max: f32,
    /// World z for depth at or below `source_min`
    pub world_at_min: f32,
    /// World z for depth at or above `source_max`
    pub world_at_max: f32,
}

impl Default for DepthMapping {
    /// Hand near the camera (more negative z) comes toward the viewer
    fn default() -> Self {
        Self {
            source_min: -0.15,
            source_max: 0.05,
            world_at_min: 3.0,
            world_at_max: -3.0,
        }
    }
}

impl DepthMapping {
    pub fn validate(&self) -> Result<()> {
        let values = [self.source_min, self.source_max, self.world_at_min, self.world_at_max];
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                name: "depth mapping",
                expected: "finite",
                value,
            });
        }
        if self.source_min >= self.source_max {
            return Err(ConfigError::Inconsistent(format!(
                "depth source range is empty: min {} >= max {}",
                self.source_min, self.source_max
            )));
        }
        Ok(())
    }

    pub fn map(&self, depth: f32) -> f32 {
        let clamped = depth.clamp(self.source_min, self.source_max);
        let t = (clamped - self.source_min) / (self.source_max - self.source_min);
        self.world_at_min + t * (self.world_at_max - self.world_at_min)
    }
}

/// Fixed affine map from normalized frame coordinates to world space
///
/// Independent of the render camera: the cursor tracks the physical hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMapping {
    /// World units spanned by the frame width
    pub workspace_width: f32,
    /// World units spanned by the frame height
    pub workspace_height: f32,
    /// Mirror x so the cursor follows the hand in a selfie view
    pub mirror_x: bool,
    pub depth: DepthMapping,
}

impl Default for CursorMapping {
    fn default() -> Self {
        Self {
            workspace_width: 10.0,
            workspace_height: 10.0,
            mirror_x: false,
            depth: DepthMapping::default(),
        }
    }
}

impl CursorMapping {
    pub fn validate(&self) -> Result<()> {
        positive("workspace_width", self.workspace_width)?;
        positive("workspace_height", self.workspace_height)?;
        self.depth.validate()
    }

    pub fn map(&self, normalized: Vector3D) -> Vector3D {
        let dx = normalized.x - 0.5;
        let x = (if self.mirror_x { -dx } else { dx }) * self.workspace_width;
        // Frame y grows downward, world y grows upward
        let y = -(normalized.y - 0.5) * self.workspace_height;
        Vector3D::new(x, y, self.depth.map(normalized.z))
    }
}

/// Cursor for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Smoothed thumb/index midpoint in frame coordinates
    pub normalized: Vector3D,
    pub world: Vector3D,
    /// Nearest grid cell to `world`
    pub cell: GridCoord,
}

impl Cursor {
    pub fn new(normalized: Vector3D, mapping: &CursorMapping) -> Self {
        let world = mapping.map(normalized);
        Self {
            normalized,
            world,
            cell: GridCoord::from_world(world),
        }
    }
}

/// Exponential moving average over cursor samples
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    alpha: f32,
    previous: Option<Vector3D>,
}

impl CursorSmoother {
    /// `alpha` is the weight of the newest sample, in (0, 1]. 1 disables
    /// smoothing.
    pub fn new(alpha: f32) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "smoothing_alpha",
                expected: "in (0, 1]",
                value: alpha,
            });
        }
        Ok(Self {
            alpha,
            previous: None,
        })
    }

    pub fn smooth(&mut self, sample: Vector3D) -> Vector3D {
        let next = match self.previous {
            Some(prev) => sample * self.alpha + prev * (1.0 - self.alpha),
            None => sample,
        };
        self.previous = Some(next);
        next
    }

    /// Forget history, e.g. when the hand is lost
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
