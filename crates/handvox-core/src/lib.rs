//! handvox-core: gesture-driven voxel sculpting
//!
//! This crate provides:
//! - A sparse integer-grid voxel world with an optional ghost preview
//! - A virtual camera with yaw/pitch orientation and pivot orbit
//! - A CPU render pipeline (projection, face culling, painter's sort) and a
//!   scanline rasterizer with a depth buffer for opaque faces
//! - Hand landmark classification, debouncing and cursor mapping
//! - The per-frame editor that turns gestures into edits and camera motion
//!
//! Hand tracking itself lives outside the crate behind [`HandDetector`].

pub mod camera;
pub mod config;
pub mod error;
pub mod gesture;
pub mod interaction;
pub mod render;
pub mod spatial;
pub mod world;

// Re-export commonly used types
pub use camera::{Camera, CameraMode};
pub use config::HandvoxConfig;
pub use error::{ConfigError, EditError, LandmarkError};
pub use gesture::{
    GestureFrame, GestureRecognizer, GestureState, HandDetector, HandLandmarks, HandPose, Intent,
};
pub use interaction::{Applied, Editor, FrameReport, InteractionController, Palette};
pub use render::{Canvas, Color, DrawablePrimitive, RenderPipeline, RenderSettings};
pub use spatial::{Matrix4, Vector3D};
pub use world::{GridCoord, Opacity, SeedPattern, Voxel, VoxelWorld};
