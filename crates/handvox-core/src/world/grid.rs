//! Sparse voxel world

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::voxel::{GridCoord, Opacity, Voxel};
use crate::error::EditError;
use crate::render::Color;
use crate::spatial::Vector3D;

/// Inclusive cell range the world accepts edits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: GridCoord,
    pub max: GridCoord,
}

impl WorldBounds {
    /// Cube of cells from `-half_extent` to `+half_extent` on every axis
    pub fn cube(half_extent: i32) -> Self {
        let h = half_extent.saturating_abs();
        Self {
            min: GridCoord::new(-h, -h, -h),
            max: GridCoord::new(h, h, h),
        }
    }

    pub fn contains(&self, c: GridCoord) -> bool {
        (self.min.x..=self.max.x).contains(&c.x)
            && (self.min.y..=self.max.y).contains(&c.y)
            && (self.min.z..=self.max.z).contains(&c.z)
    }
}

/// Map from grid cell to voxel, plus one transient ghost voxel
///
/// A cell holds at most one voxel. The ghost is a cursor preview: it is never
/// returned by [`VoxelWorld::iter`], never counted, and never erased by edits.
#[derive(Debug, Clone, Default)]
pub struct VoxelWorld {
    voxels: BTreeMap<GridCoord, Voxel>,
    ghost: Option<Voxel>,
    bounds: Option<WorldBounds>,
    capacity: Option<usize>,
}

impl VoxelWorld {
    /// Unbounded, empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject placements outside `bounds`
    pub fn with_bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Reject placements into new cells once `limit` voxels exist
    pub fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity = Some(limit);
        self
    }

    pub fn bounds_limit(&self) -> Option<WorldBounds> {
        self.bounds
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity
    }

    /// Place a voxel, overwriting whatever occupied the cell
    ///
    /// Returns the voxel previously in the cell. Overwriting an occupied cell
    /// is always allowed, even at the capacity limit.
    pub fn place(
        &mut self,
        coord: GridCoord,
        color: Color,
        opacity: Opacity,
    ) -> Result<Option<Voxel>, EditError> {
        if let Some(bounds) = self.bounds {
            if !bounds.contains(coord) {
                return Err(EditError::OutOfBounds(coord));
            }
        }
        if let Some(limit) = self.capacity {
            if self.voxels.len() >= limit && !self.voxels.contains_key(&coord) {
                return Err(EditError::CapacityReached { limit });
            }
        }
        Ok(self.voxels.insert(coord, Voxel::new(coord, color, opacity)))
    }

    /// Remove the voxel at `coord`. Removing an empty cell is a no-op.
    pub fn erase(&mut self, coord: GridCoord) -> Option<Voxel> {
        self.voxels.remove(&coord)
    }

    /// Remove every voxel whose cube center is within `radius` of `point`
    ///
    /// Returns how many voxels were removed.
    pub fn erase_near(&mut self, point: Vector3D, radius: f32) -> usize {
        if !(radius >= 0.0) {
            return 0;
        }
        let r2 = radius * radius;
        let before = self.voxels.len();
        self.voxels
            .retain(|coord, _| coord.center().distance_squared(&point) > r2);
        before - self.voxels.len()
    }

    pub fn get(&self, coord: GridCoord) -> Option<&Voxel> {
        self.voxels.get(&coord)
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.voxels.contains_key(&coord)
    }

    /// Persisted voxels in ascending coordinate order
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &Voxel)> + '_ {
        self.voxels.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn clear(&mut self) {
        self.voxels.clear();
    }

    /// Smallest and largest occupied cell on each axis, `None` when empty
    pub fn bounds(&self) -> Option<(GridCoord, GridCoord)> {
        let mut coords = self.voxels.keys();
        let first = *coords.next()?;
        Some(coords.fold((first, first), |(lo, hi), c| {
            (
                GridCoord::new(lo.x.min(c.x), lo.y.min(c.y), lo.z.min(c.z)),
                GridCoord::new(hi.x.max(c.x), hi.y.max(c.y), hi.z.max(c.z)),
            )
        }))
    }

    /// Occupied cell closest to `point` within `max_distance`
    pub fn nearest(&self, point: Vector3D, max_distance: f32) -> Option<GridCoord> {
        let limit = max_distance * max_distance;
        self.voxels
            .keys()
            .map(|c| (*c, c.center().distance_squared(&point)))
            .filter(|(_, d2)| *d2 <= limit)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    pub fn ghost(&self) -> Option<&Voxel> {
        self.ghost.as_ref()
    }

    pub fn set_ghost(&mut self, ghost: Voxel) {
        self.ghost = Some(ghost);
    }

    pub fn clear_ghost(&mut self) {
        self.ghost = None;
    }
}
