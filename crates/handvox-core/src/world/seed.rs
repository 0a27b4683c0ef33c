//! Starting structures for a fresh world

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::grid::VoxelWorld;
use super::voxel::{GridCoord, Opacity};
use crate::error::ConfigError;
use crate::render::{Color, DEFAULT_PALETTE};

/// Colors used for seeded voxels
const SEED_COLORS: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::YELLOW,
    Color::MAGENTA,
    Color::CYAN,
];

/// Initial world contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedPattern {
    Empty,
    /// Outer shell of a cube centered on the origin
    HollowCube { half_extent: i32 },
    /// Square slab at y = -half_extent - 1
    Floor { half_extent: i32 },
    /// One voxel at the origin
    Single,
}

impl Default for SeedPattern {
    fn default() -> Self {
        SeedPattern::HollowCube { half_extent: 1 }
    }
}

impl SeedPattern {
    /// Largest accepted `half_extent`
    pub const MAX_HALF_EXTENT: i32 = 64;

    fn half_extent(&self) -> Option<i32> {
        match *self {
            SeedPattern::HollowCube { half_extent } | SeedPattern::Floor { half_extent } => {
                Some(half_extent)
            }
            SeedPattern::Empty | SeedPattern::Single => None,
        }
    }

    /// Largest absolute coordinate any cell of the pattern uses
    fn reach(&self) -> i32 {
        let h = self.half_extent().unwrap_or(0).clamp(0, Self::MAX_HALF_EXTENT);
        match self {
            SeedPattern::Floor { .. } => h + 1,
            _ => h,
        }
    }

    /// Reject extents that are negative, above [`Self::MAX_HALF_EXTENT`], or
    /// whose cells fall outside a cube of `bounds_half_extent`
    pub fn validate(&self, bounds_half_extent: Option<i32>) -> Result<(), ConfigError> {
        let Some(h) = self.half_extent() else {
            return Ok(());
        };
        if !(0..=Self::MAX_HALF_EXTENT).contains(&h) {
            return Err(ConfigError::InvalidValue {
                name: "half_extent",
                expected: "between 0 and 64",
                value: h as f32,
            });
        }
        if let Some(bound) = bounds_half_extent {
            if self.reach() > bound {
                return Err(ConfigError::InvalidValue {
                    name: "half_extent",
                    expected: "a pattern that fits inside bounds_half_extent",
                    value: h as f32,
                });
            }
        }
        Ok(())
    }

    /// Cells this pattern occupies, in ascending order
    ///
    /// Extents outside `0..=MAX_HALF_EXTENT` are clamped into that range.
    pub fn cells(&self) -> Box<dyn Iterator<Item = GridCoord>> {
        let h = self.half_extent().unwrap_or(0).clamp(0, Self::MAX_HALF_EXTENT);
        match *self {
            SeedPattern::Empty => Box::new(std::iter::empty()),
            SeedPattern::Single => Box::new(std::iter::once(GridCoord::ORIGIN)),
            SeedPattern::HollowCube { .. } => Box::new(
                (-h..=h)
                    .flat_map(move |x| (-h..=h).map(move |y| (x, y)))
                    .flat_map(move |(x, y)| {
                        // Interior rows only contribute their two end cells
                        let step = if x.abs() == h || y.abs() == h {
                            1
                        } else {
                            (2 * h).max(1) as usize
                        };
                        (-h..=h).step_by(step).map(move |z| GridCoord::new(x, y, z))
                    }),
            ),
            SeedPattern::Floor { .. } => {
                let y = -h - 1;
                Box::new(
                    (-h..=h).flat_map(move |x| (-h..=h).map(move |z| GridCoord::new(x, y, z))),
                )
            }
        }
    }

    /// Fill `world` with this pattern using colors drawn from `rng_seed`
    ///
    /// The same seed always yields the same colors. Cells the world rejects
    /// are skipped, and filling stops once the world's capacity is used up.
    /// Returns how many voxels were placed.
    pub fn populate(&self, world: &mut VoxelWorld, rng_seed: u64, opacity: Opacity) -> usize {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let mut placed = 0;
        for cell in self.cells() {
            if world.capacity_limit().is_some_and(|limit| world.len() >= limit) {
                tracing::debug!(placed, "seed stopped at capacity");
                break;
            }
            let color = *SEED_COLORS.choose(&mut rng).unwrap_or(&DEFAULT_PALETTE[0]);
            match world.place(cell, color, opacity) {
                Ok(_) => placed += 1,
                Err(e) => tracing::debug!("seed voxel skipped: {}", e),
            }
        }
        tracing::debug!(pattern = ?self, placed, "seeded world");
        placed
    }
}
