//! Voxel world model
//!
//! The world is a sparse map from integer grid cells to colored unit cubes.
//! Grid coordinates are world coordinates: the cube for cell `(x, y, z)` is
//! centered on that point.

mod grid;
mod seed;
mod voxel;

pub use grid::{VoxelWorld, WorldBounds};
pub use seed::SeedPattern;
pub use voxel::{GridCoord, Opacity, Voxel};
