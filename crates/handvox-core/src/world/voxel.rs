//! Grid coordinates and voxel values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::render::Color;
use crate::spatial::Vector3D;

/// Integer cell of the voxel grid. The cube for a cell is centered on the
/// cell's coordinates and spans ±0.5 on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Snap a world position to the nearest cell
    ///
    /// Halfway values round away from zero, so the same input always lands in
    /// the same cell. Non-finite components snap to 0.
    pub fn from_world(p: Vector3D) -> Self {
        let snap = |v: f32| {
            if v.is_finite() {
                v.round().clamp(i32::MIN as f32, i32::MAX as f32) as i32
            } else {
                0
            }
        };
        Self::new(snap(p.x), snap(p.y), snap(p.z))
    }

    /// World-space center of this cell's cube
    pub fn center(&self) -> Vector3D {
        Vector3D::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Neighboring cell, `None` when it lies outside the `i32` grid
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for GridCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

/// How a voxel is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opacity {
    /// Filled faces, depth-tested against other opaque faces
    Opaque,
    /// Filled faces composited with alpha in back-to-front order
    #[default]
    Translucent,
    /// Edges only (cursor preview)
    Wireframe,
}

/// A colored unit cube at a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voxel {
    pub coord: GridCoord,
    pub color: Color,
    pub opacity: Opacity,
}

impl Voxel {
    pub fn new(coord: GridCoord, color: Color, opacity: Opacity) -> Self {
        Self {
            coord,
            color,
            opacity,
        }
    }

    /// Wireframe preview voxel
    pub fn ghost(coord: GridCoord, color: Color) -> Self {
        Self::new(coord, color, Opacity::Wireframe)
    }

    pub fn center(&self) -> Vector3D {
        self.coord.center()
    }
}
