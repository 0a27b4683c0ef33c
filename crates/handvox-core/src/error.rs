//! Error types for handvox operations

use std::path::PathBuf;

use crate::world::GridCoord;

/// Startup-time configuration problems. These are never clamped away.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipRange { near: f32, far: f32 },

    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f32),

    #[error("viewport must be at least 1x1, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("{name} must be {expected}, got {value}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: f32,
    },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rejected world edits. The interaction controller drops these per frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("voxel {0} lies outside the world bounds")]
    OutOfBounds(GridCoord),

    #[error("voxel limit of {limit} reached")]
    CapacityReached { limit: usize },
}

/// Malformed detector output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LandmarkError {
    #[error("expected {expected} hand landmarks, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
