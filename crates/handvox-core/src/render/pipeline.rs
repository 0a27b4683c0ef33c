//! Voxel world → ordered screen-space primitives

use super::color::Color;
use super::primitive::{DrawablePrimitive, ScreenPoint};
use crate::camera::Camera;
use crate::error::{ConfigError, Result};
use crate::spatial::{Matrix4, Vector3D, Vector4D};
use crate::world::{Opacity, Voxel, VoxelWorld};

/// Corner `i` of a unit cube sits at `center + offset(i)`, with bit 0 picking
/// +x, bit 1 +y and bit 2 +z.
fn corner_offset(i: usize) -> Vector3D {
    let pick = |bit: usize| if i & bit != 0 { 0.5 } else { -0.5 };
    Vector3D::new(pick(1), pick(2), pick(4))
}

struct Face {
    /// Corners in perimeter order
    corners: [usize; 4],
    /// Outward normal, also the offset to the neighboring cell
    normal: (i32, i32, i32),
    tint: f32,
}

const FACES: [Face; 6] = [
    Face {
        corners: [1, 3, 7, 5],
        normal: (1, 0, 0),
        tint: 0.8,
    },
    Face {
        corners: [0, 4, 6, 2],
        normal: (-1, 0, 0),
        tint: 0.8,
    },
    Face {
        corners: [2, 6, 7, 3],
        normal: (0, 1, 0),
        tint: 1.0,
    },
    Face {
        corners: [0, 1, 5, 4],
        normal: (0, -1, 0),
        tint: 0.55,
    },
    Face {
        corners: [4, 5, 7, 6],
        normal: (0, 0, 1),
        tint: 0.68,
    },
    Face {
        corners: [0, 2, 3, 1],
        normal: (0, 0, -1),
        tint: 0.68,
    },
];

const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Viewport and drawing options
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Alpha given to translucent voxels whose color is fully opaque
    pub translucent_alpha: u8,
    /// Skip faces shared with an occupied neighbor cell
    pub skip_hidden_faces: bool,
    /// Skip faces of opaque voxels that point away from the camera
    pub cull_back_faces: bool,
    /// Darken faces by a fixed factor per direction so cube edges read
    pub face_tint: bool,
}

impl RenderSettings {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let settings = Self {
            width,
            height,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 160,
            height: 90,
            translucent_alpha: 180,
            skip_hidden_faces: true,
            cull_back_faces: true,
            face_tint: true,
        }
    }
}

/// Counters from the most recent frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub voxels: usize,
    pub faces_hidden: usize,
    pub faces_back: usize,
    pub culled_near: usize,
    pub culled_frustum: usize,
    pub emitted: usize,
}

/// A cube corner after the view and projection transforms
#[derive(Debug, Clone, Copy)]
struct Projected {
    /// Distance in front of the camera (-z in view space)
    distance: f32,
    clip: Vector4D,
}

const OUT_LEFT: u8 = 1;
const OUT_RIGHT: u8 = 2;
const OUT_BOTTOM: u8 = 4;
const OUT_TOP: u8 = 8;
const OUT_NEAR: u8 = 16;
const OUT_FAR: u8 = 32;

fn outcode(c: &Vector4D) -> u8 {
    let mut code = 0;
    if c.x < -c.w {
        code |= OUT_LEFT;
    }
    if c.x > c.w {
        code |= OUT_RIGHT;
    }
    if c.y < -c.w {
        code |= OUT_BOTTOM;
    }
    if c.y > c.w {
        code |= OUT_TOP;
    }
    if c.z < -c.w {
        code |= OUT_NEAR;
    }
    if c.z > c.w {
        code |= OUT_FAR;
    }
    code
}

enum Cull {
    Near,
    Frustum,
}

/// Transforms the world through `projection · view` and emits primitives
/// sorted back to front
#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    settings: RenderSettings,
    stats: FrameStats,
}

impl RenderPipeline {
    pub fn new(settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            stats: FrameStats::default(),
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        let next = RenderSettings {
            width,
            height,
            ..self.settings.clone()
        };
        next.validate()?;
        self.settings = next;
        Ok(())
    }

    /// Render the world and its ghost voxel
    ///
    /// Never fails per frame: faces crossing the near plane or lying wholly
    /// outside the frustum are dropped, and an empty world yields no
    /// primitives.
    pub fn render(&mut self, world: &VoxelWorld, camera: &Camera) -> Vec<DrawablePrimitive> {
        self.stats = FrameStats::default();
        let view = camera.view_matrix();
        let projection = match camera.projection_matrix(self.settings.aspect()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("skipping frame: {}", e);
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for (_, voxel) in world.iter() {
            self.stats.voxels += 1;
            self.emit_voxel(voxel, world, &view, &projection, camera.near(), &mut out);
        }
        if let Some(ghost) = world.ghost() {
            self.emit_voxel(ghost, world, &view, &projection, camera.near(), &mut out);
        }

        // Stable, so equal depths keep world iteration order
        out.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        self.stats.emitted = out.len();
        out
    }

    fn emit_voxel(
        &mut self,
        voxel: &Voxel,
        world: &VoxelWorld,
        view: &Matrix4,
        projection: &Matrix4,
        near: f32,
        out: &mut Vec<DrawablePrimitive>,
    ) {
        let center = voxel.center();
        let corners: [Projected; 8] = std::array::from_fn(|i| {
            let v = view.transform_point(center + corner_offset(i));
            Projected {
                distance: -v.z,
                clip: *projection * v,
            }
        });

        if voxel.opacity == Opacity::Wireframe {
            for (a, b) in EDGES {
                match self.project(&[corners[a], corners[b]], near) {
                    Ok(points) => {
                        out.push(DrawablePrimitive::line(points[0], points[1], voxel.color))
                    }
                    Err(cull) => self.count(cull),
                }
            }
            return;
        }

        let view_center = view.transform_point(center).xyz();
        for face in &FACES {
            let (nx, ny, nz) = face.normal;
            let neighbor = voxel.coord.offset(nx, ny, nz);
            if self.settings.skip_hidden_faces && neighbor.is_some_and(|n| world.contains(n)) {
                self.stats.faces_hidden += 1;
                continue;
            }
            if self.settings.cull_back_faces && voxel.opacity == Opacity::Opaque {
                let normal = Vector3D::new(nx as f32, ny as f32, nz as f32);
                let face_center = view_center + view.transform_direction(normal) * 0.5;
                if view.transform_direction(normal).dot(&face_center) >= 0.0 {
                    self.stats.faces_back += 1;
                    continue;
                }
            }

            let verts = face.corners.map(|i| corners[i]);
            match self.project(&verts, near) {
                Ok(points) => {
                    let color = self.face_color(voxel, face.tint);
                    out.push(DrawablePrimitive::polygon(points, color, voxel.opacity));
                }
                Err(cull) => self.count(cull),
            }
        }
    }

    /// Cull, divide and map to the viewport
    fn project(
        &self,
        verts: &[Projected],
        near: f32,
    ) -> std::result::Result<Vec<ScreenPoint>, Cull> {
        // Anything touching the near plane is dropped before the divide
        if verts.iter().any(|v| !(v.distance > near)) {
            return Err(Cull::Near);
        }
        let shared = verts.iter().fold(0x3f, |acc, v| acc & outcode(&v.clip));
        if shared != 0 {
            return Err(Cull::Frustum);
        }

        let w = self.settings.width as f32;
        let h = self.settings.height as f32;
        let mut points = Vec::with_capacity(verts.len());
        for v in verts {
            let ndc = v.clip.perspective_divide().ok_or(Cull::Near)?;
            points.push(ScreenPoint::new(
                (ndc.x + 1.0) * 0.5 * w,
                (1.0 - ndc.y) * 0.5 * h,
                v.distance,
            ));
        }
        Ok(points)
    }

    fn face_color(&self, voxel: &Voxel, tint: f32) -> Color {
        let base = if self.settings.face_tint {
            voxel.color.shade(tint)
        } else {
            voxel.color
        };
        match voxel.opacity {
            Opacity::Opaque => base.with_alpha(255),
            Opacity::Translucent if base.is_opaque() => {
                base.with_alpha(self.settings.translucent_alpha)
            }
            _ => base,
        }
    }

    fn count(&mut self, cull: Cull) {
        match cull {
            Cull::Near => self.stats.culled_near += 1,
            Cull::Frustum => self.stats.culled_frustum += 1,
        }
    }
}

/// Project one world point to the viewport, `None` when it is not in front
/// of the camera
pub fn project_point(
    p: Vector3D,
    camera: &Camera,
    settings: &RenderSettings,
) -> Option<ScreenPoint> {
    let v = camera.view_matrix().transform_point(p);
    let distance = -v.z;
    if !(distance > camera.near()) {
        return None;
    }
    let clip = camera.projection_matrix(settings.aspect()).ok()? * v;
    let ndc = clip.perspective_divide()?;
    Some(ScreenPoint::new(
        (ndc.x + 1.0) * 0.5 * settings.width as f32,
        (1.0 - ndc.y) * 0.5 * settings.height as f32,
        distance,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PrimitiveKind;
    use crate::world::GridCoord;

    fn camera() -> Camera {
        Camera::new(Vector3D::new(0.0, 0.0, 10.0), 60.0, 0.1, 100.0).unwrap()
    }

    fn pipeline() -> RenderPipeline {
        RenderPipeline::new(RenderSettings::new(100, 100).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_world() {
        let mut p = pipeline();
        assert!(p.render(&VoxelWorld::new(), &camera()).is_empty());
        assert_eq!(p.stats(), FrameStats::default());
    }

    #[test]
    fn test_voxel_behind_camera_is_culled() {
        let mut world = VoxelWorld::new();
        world
            .place(GridCoord::new(0, 0, 20), Color::RED, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        assert!(p.render(&world, &camera()).is_empty());
        assert!(p.stats().culled_near > 0);
    }

    #[test]
    fn test_voxel_straddling_near_plane_is_culled() {
        let mut world = VoxelWorld::new();
        world
            .place(GridCoord::new(0, 0, 10), Color::RED, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        // Only the far face lies wholly in front of the near plane
        assert_eq!(prims.len(), 1);
        assert_eq!(p.stats().culled_near, 5);
        assert!(prims[0].points.iter().all(|pt| pt.depth > 0.1));
    }

    #[test]
    fn test_off_screen_voxel_is_frustum_culled() {
        let mut world = VoxelWorld::new();
        world
            .place(GridCoord::new(50, 0, 0), Color::RED, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        assert!(p.render(&world, &camera()).is_empty());
        assert_eq!(p.stats().culled_frustum, 6);
    }

    #[test]
    fn test_single_translucent_voxel_draws_all_faces() {
        let mut world = VoxelWorld::new();
        world
            .place(GridCoord::ORIGIN, Color::GREEN, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        assert_eq!(prims.len(), 6);
        assert!(prims.iter().all(|prim| prim.kind == PrimitiveKind::Polygon));
        assert!(prims.iter().all(|prim| prim.color.a == 180));
        // Back face first, front face last
        assert!((prims[0].depth - 10.5).abs() < 1e-3);
        assert!((prims[5].depth - 9.5).abs() < 1e-3);
    }

    #[test]
    fn test_screen_mapping_flips_y() {
        let mut world = VoxelWorld::new();
        world
            .place(GridCoord::new(0, 2, 0), Color::RED, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        assert!(!prims.is_empty());
        // Above the view axis lands in the upper half of the screen
        assert!(prims
            .iter()
            .flat_map(|prim| prim.points.iter())
            .all(|pt| pt.y < 50.0));
    }

    #[test]
    fn test_opaque_back_faces_skipped() {
        let mut world = VoxelWorld::new();
        world.place(GridCoord::ORIGIN, Color::BLUE, Opacity::Opaque).unwrap();
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        // Looking straight down -Z only the +Z face is visible
        assert_eq!(prims.len(), 1);
        assert_eq!(p.stats().faces_back, 5);
        assert!(prims[0].color.is_opaque());
    }

    #[test]
    fn test_shared_faces_hidden() {
        let mut world = VoxelWorld::new();
        world.place(GridCoord::ORIGIN, Color::RED, Opacity::Translucent).unwrap();
        world
            .place(GridCoord::new(1, 0, 0), Color::RED, Opacity::Translucent)
            .unwrap();
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        assert_eq!(p.stats().faces_hidden, 2);
        assert_eq!(prims.len(), 10);
    }

    #[test]
    fn test_depth_sorted_back_to_front() {
        let mut world = VoxelWorld::new();
        for z in [2, -4, 0] {
            world
                .place(GridCoord::new(0, 0, z), Color::RED, Opacity::Translucent)
                .unwrap();
        }
        let mut settings = RenderSettings::new(100, 100).unwrap();
        settings.skip_hidden_faces = false;
        let mut p = RenderPipeline::new(settings).unwrap();
        let prims = p.render(&world, &camera());
        assert_eq!(prims.len(), 18);
        assert!(prims.windows(2).all(|w| w[0].depth >= w[1].depth));
        // Farthest voxel (z = -4, distance 14) is drawn first
        assert!((prims[0].depth - 14.5).abs() < 1e-3);
        assert!((prims[17].depth - 7.5).abs() < 1e-3);
    }

    #[test]
    fn test_ghost_drawn_as_edges() {
        let mut world = VoxelWorld::new();
        world.set_ghost(Voxel::ghost(GridCoord::ORIGIN, Color::WHITE));
        let mut p = pipeline();
        let prims = p.render(&world, &camera());
        assert_eq!(prims.len(), 12);
        assert!(prims.iter().all(|prim| prim.kind == PrimitiveKind::Line));
        assert_eq!(p.stats().voxels, 0);
    }

    #[test]
    fn test_project_point() {
        let settings = RenderSettings::new(100, 100).unwrap();
        let cam = camera();
        let center = project_point(Vector3D::ZERO, &cam, &settings).unwrap();
        assert!((center.x - 50.0).abs() < 1e-3);
        assert!((center.y - 50.0).abs() < 1e-3);
        assert!((center.depth - 10.0).abs() < 1e-4);
        assert!(project_point(Vector3D::new(0.0, 0.0, 11.0), &cam, &settings).is_none());
    }

    #[test]
    fn test_voxels_at_grid_edge_render() {
        let mut world = VoxelWorld::new();
        for c in [(i32::MAX, 0, 0), (i32::MIN, 0, 0), (0, i32::MAX, i32::MIN)] {
            world.place(c.into(), Color::RED, Opacity::Opaque).unwrap();
        }
        let mut p = pipeline();
        p.render(&world, &camera());
        assert_eq!(p.stats().voxels, 3);
        assert_eq!(p.stats().faces_hidden, 0);
    }

    #[test]
    fn test_rejects_empty_viewport() {
        assert!(matches!(
            RenderSettings::new(0, 10),
            Err(ConfigError::InvalidViewport { .. })
        ));
        let mut p = pipeline();
        assert!(p.set_viewport(10, 0).is_err());
        assert_eq!(p.settings().height, 100);
    }
}
