//! 4x4 homogeneous transforms
//!
//! Storage is row-major (`m[row][col]`) and vectors are columns, so a point
//! is transformed as `M · v`. Composition applies right to left: `a * b`
//! transforms by `b` first, then by `a`. The full vertex transform used by
//! the render pipeline is therefore `clip = projection * view * model * v`.

use std::ops::Mul;

use super::vector3d::{Vector3D, EPSILON};
use crate::error::ConfigError;

/// A homogeneous coordinate (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector4D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4D {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point (w = 1)
    pub fn point(v: Vector3D) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }

    /// Drop w without dividing
    pub fn xyz(&self) -> Vector3D {
        Vector3D::new(self.x, self.y, self.z)
    }

    /// Perspective divide; `None` when `|w|` is too small to divide by
    pub fn perspective_divide(&self) -> Option<Vector3D> {
        if self.w.abs() < EPSILON {
            return None;
        }
        Some(Vector3D::new(self.x / self.w, self.y / self.w, self.z / self.w))
    }
}

/// A 4x4 matrix in homogeneous coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translation(offset: Vector3D) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][3] = offset.x;
        out.m[1][3] = offset.y;
        out.m[2][3] = offset.z;
        out
    }

    /// Rotation about +X by `angle` radians (counter-clockwise looking down the axis)
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about +Y by `angle` radians
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about +Z by `angle` radians
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about an arbitrary axis (Rodrigues' formula)
    ///
    /// A zero-length axis yields the identity.
    pub fn rotation_axis(axis: Vector3D, angle: f32) -> Self {
        let Some(a) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Self::from_rows([
            [
                t * a.x * a.x + c,
                t * a.x * a.y - s * a.z,
                t * a.x * a.z + s * a.y,
                0.0,
            ],
            [
                t * a.x * a.y + s * a.z,
                t * a.y * a.y + c,
                t * a.y * a.z - s * a.x,
                0.0,
            ],
            [
                t * a.x * a.z - s * a.y,
                t * a.y * a.z + s * a.x,
                t * a.z * a.z + c,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// OpenGL-style perspective projection
    ///
    /// Maps view space (camera looking down -Z) to clip space so that points
    /// inside the frustum land in NDC `[-1, 1]` on all axes after dividing by
    /// `w`. `w` equals the view-space distance in front of the camera.
    pub fn perspective(
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, ConfigError> {
        if !fov_y_degrees.is_finite() || fov_y_degrees <= 0.0 || fov_y_degrees >= 180.0 {
            return Err(ConfigError::InvalidFov(fov_y_degrees));
        }
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(ConfigError::InvalidAspect(aspect));
        }
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || near >= far {
            return Err(ConfigError::InvalidClipRange { near, far });
        }

        let tan_half_fov = (fov_y_degrees.to_radians() / 2.0).tan();
        let depth = far - near;
        Ok(Self::from_rows([
            [1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0],
            [0.0, 1.0 / tan_half_fov, 0.0, 0.0],
            [0.0, 0.0, -(far + near) / depth, -(2.0 * far * near) / depth],
            [0.0, 0.0, -1.0, 0.0],
        ]))
    }

    /// View matrix for an eye looking at `target`
    ///
    /// `None` when the eye coincides with the target or the view direction is
    /// parallel to `up`.
    pub fn look_at(eye: Vector3D, target: Vector3D, up: Vector3D) -> Option<Self> {
        let forward = (target - eye).try_normalize()?;
        let right = forward.cross(&up).try_normalize()?;
        Some(Self::from_basis(eye, right, forward))
    }

    /// View matrix (world → camera) from an orthonormal camera basis
    ///
    /// This is the inverse of the camera's world transform: the rotation is
    /// transposed and the translation is the negated, rotated eye position.
    pub fn from_basis(eye: Vector3D, right: Vector3D, forward: Vector3D) -> Self {
        let up = right.cross(&forward);
        Self::from_rows([
            [right.x, right.y, right.z, -right.dot(&eye)],
            [up.x, up.y, up.z, -up.dot(&eye)],
            [-forward.x, -forward.y, -forward.z, forward.dot(&eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Transform a point (w = 1) into homogeneous coordinates
    pub fn transform_point(&self, p: Vector3D) -> Vector4D {
        *self * Vector4D::point(p)
    }

    /// Transform a direction (w = 0); translation does not apply
    pub fn transform_direction(&self, d: Vector3D) -> Vector3D {
        (*self * Vector4D::new(d.x, d.y, d.z, 0.0)).xyz()
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Self::Output {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Matrix4::from_rows(out)
    }
}

impl Mul<Vector4D> for Matrix4 {
    type Output = Vector4D;

    fn mul(self, v: Vector4D) -> Self::Output {
        let row = |r: usize| {
            self.m[r][0] * v.x + self.m[r][1] * v.y + self.m[r][2] * v.z + self.m[r][3] * v.w
        };
        Vector4D::new(row(0), row(1), row(2), row(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vector3D, b: Vector3D) -> bool {
        (a - b).max_abs_component() < 1e-4
    }

    #[test]
    fn test_translation() {
        let t = Matrix4::translation(Vector3D::new(10.0, 20.0, 30.0));
        let p = t.transform_point(Vector3D::new(5.0, 5.0, 5.0));
        assert_eq!(p, Vector4D::new(15.0, 25.0, 35.0, 1.0));
        assert_eq!(t.transform_direction(Vector3D::UP), Vector3D::UP);
    }

    #[test]
    fn test_composition_order() {
        // Rotate first, then translate
        let rotate = Matrix4::rotation_z(FRAC_PI_2);
        let translate = Matrix4::translation(Vector3D::new(10.0, 0.0, 0.0));
        let p = (translate * rotate).transform_point(Vector3D::RIGHT).xyz();
        assert!(approx(p, Vector3D::new(10.0, 1.0, 0.0)));

        // Translate first, then rotate
        let q = (rotate * translate).transform_point(Vector3D::RIGHT).xyz();
        assert!(approx(q, Vector3D::new(0.0, 11.0, 0.0)));
    }

    #[test]
    fn test_associative() {
        let a = Matrix4::rotation_x(0.3);
        let b = Matrix4::translation(Vector3D::new(1.0, -2.0, 3.0));
        let c = Matrix4::rotation_y(-1.1);
        let p = Vector3D::new(0.5, 0.25, -4.0);
        let left = ((a * b) * c).transform_point(p).xyz();
        let right = (a * (b * c)).transform_point(p).xyz();
        assert!(approx(left, right));
    }

    #[test]
    fn test_rotation_axis_matches_principal_axes() {
        let p = Vector3D::new(0.3, -0.7, 1.9);
        for (axis, principal) in [
            (Vector3D::RIGHT, Matrix4::rotation_x(0.8)),
            (Vector3D::UP, Matrix4::rotation_y(0.8)),
            (Vector3D::BACK, Matrix4::rotation_z(0.8)),
        ] {
            let general = Matrix4::rotation_axis(axis, 0.8);
            assert!(approx(
                general.transform_point(p).xyz(),
                principal.transform_point(p).xyz()
            ));
        }
        assert_eq!(Matrix4::rotation_axis(Vector3D::ZERO, 1.0), Matrix4::IDENTITY);
    }

    #[test]
    fn test_perspective_center_point() {
        let proj = Matrix4::perspective(60.0, 1.0, 0.1, 100.0).unwrap();
        let clip = proj.transform_point(Vector3D::new(0.0, 0.0, -10.0));
        assert!((clip.w - 10.0).abs() < 1e-4);
        let ndc = clip.perspective_divide().unwrap();
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_perspective_near_far_map_to_ndc_bounds() {
        let proj = Matrix4::perspective(60.0, 1.0, 0.1, 100.0).unwrap();
        let near = proj.transform_point(Vector3D::new(0.0, 0.0, -0.1));
        let far = proj.transform_point(Vector3D::new(0.0, 0.0, -100.0));
        assert!((near.perspective_divide().unwrap().z + 1.0).abs() < 1e-3);
        assert!((far.perspective_divide().unwrap().z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_perspective_rejects_bad_config() {
        assert!(matches!(
            Matrix4::perspective(0.0, 1.0, 0.1, 100.0),
            Err(ConfigError::InvalidFov(_))
        ));
        assert!(matches!(
            Matrix4::perspective(180.0, 1.0, 0.1, 100.0),
            Err(ConfigError::InvalidFov(_))
        ));
        assert!(matches!(
            Matrix4::perspective(60.0, 1.0, 10.0, 10.0),
            Err(ConfigError::InvalidClipRange { .. })
        ));
        assert!(matches!(
            Matrix4::perspective(60.0, 1.0, 50.0, 10.0),
            Err(ConfigError::InvalidClipRange { .. })
        ));
        assert!(matches!(
            Matrix4::perspective(60.0, 0.0, 0.1, 10.0),
            Err(ConfigError::InvalidAspect(_))
        ));
    }

    #[test]
    fn test_look_at_inverts_camera_transform() {
        let eye = Vector3D::new(0.0, 0.0, 10.0);
        let view = Matrix4::look_at(eye, Vector3D::ZERO, Vector3D::UP).unwrap();
        // The target lies straight ahead, 10 units down -Z
        let target = view.transform_point(Vector3D::ZERO).xyz();
        assert!(approx(target, Vector3D::new(0.0, 0.0, -10.0)));
        // The eye maps to the origin
        assert!(approx(view.transform_point(eye).xyz(), Vector3D::ZERO));
    }

    #[test]
    fn test_look_at_degenerate() {
        let p = Vector3D::new(1.0, 2.0, 3.0);
        assert!(Matrix4::look_at(p, p, Vector3D::UP).is_none());
        assert!(Matrix4::look_at(Vector3D::ZERO, Vector3D::UP, Vector3D::UP).is_none());
    }

    #[test]
    fn test_divide_guard() {
        assert!(Vector4D::new(1.0, 1.0, 1.0, 0.0).perspective_divide().is_none());
    }
}
