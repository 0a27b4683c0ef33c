//! Virtual camera for the voxel view

use crate::error::{ConfigError, Result};
use crate::spatial::{Matrix4, Vector3D, EPSILON};

/// Pitch stays inside ±89° so the view basis never degenerates
pub const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Which control currently drives the camera orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Fixed yaw increment every frame
    #[default]
    AutoRotate,
    /// Open-palm hand motion orbits the view
    GestureOrbit,
}

/// Camera pose and lens
///
/// Orientation is yaw (about +Y) and pitch (about the camera's right axis).
/// With yaw = pitch = 0 the camera looks down -Z. View and projection
/// matrices are derived on every call and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vector3D,
    yaw: f32,
    pitch: f32,
    fov_y_degrees: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a camera looking down -Z
    ///
    /// Fails on a field of view outside (0, 180) or a clip range that is not
    /// `0 < near < far`.
    pub fn new(position: Vector3D, fov_y_degrees: f32, near: f32, far: f32) -> Result<Self> {
        if !fov_y_degrees.is_finite() || fov_y_degrees <= 0.0 || fov_y_degrees >= 180.0 {
            return Err(ConfigError::InvalidFov(fov_y_degrees));
        }
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || near >= far {
            return Err(ConfigError::InvalidClipRange { near, far });
        }
        Ok(Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_degrees,
            near,
            far,
        })
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Unit view direction
    pub fn forward(&self) -> Vector3D {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vector3D::new(-sy * cp, sp, -cy * cp)
    }

    /// Unit right vector, always horizontal
    pub fn right(&self) -> Vector3D {
        let (sy, cy) = self.yaw.sin_cos();
        Vector3D::new(cy, 0.0, -sy)
    }

    pub fn up(&self) -> Vector3D {
        self.right().cross(&self.forward())
    }

    /// World → camera transform
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::from_basis(self.position, self.right(), self.forward())
    }

    /// Camera → clip transform for a viewport of the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Result<Matrix4> {
        Matrix4::perspective(self.fov_y_degrees, aspect, self.near, self.far)
    }

    /// Turn to face `target`. Does nothing when `target` is the camera position.
    pub fn look_at(&mut self, target: Vector3D) {
        let Some(dir) = (target - self.position).try_normalize() else {
            tracing::debug!("look_at target coincides with camera, orientation kept");
            return;
        };
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        if dir.x.abs() > EPSILON || dir.z.abs() > EPSILON {
            self.yaw = (-dir.x).atan2(-dir.z);
        }
    }

    /// Rotate in place by the given angles (radians)
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        if !d_yaw.is_finite() || !d_pitch.is_finite() {
            return;
        }
        self.yaw = wrap_angle(self.yaw + d_yaw);
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Swing around `pivot`, keeping the current distance and facing the pivot
    pub fn orbit(&mut self, pivot: Vector3D, d_yaw: f32, d_pitch: f32) {
        if d_yaw == 0.0 && d_pitch == 0.0 {
            return;
        }
        let distance = self.position.distance(&pivot);
        if distance < EPSILON {
            self.rotate(d_yaw, d_pitch);
            return;
        }
        self.look_at(pivot);
        self.rotate(d_yaw, d_pitch);
        self.position = pivot - self.forward() * distance;
    }
}

fn wrap_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}
