//! Spatial primitives: vectors and homogeneous transforms
//!
//! Uses a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Toward the viewer (+) / Into the screen (-)

mod matrix4;
mod vector3d;

pub use matrix4::{Matrix4, Vector4D};
pub use vector3d::{Vector3D, EPSILON};
