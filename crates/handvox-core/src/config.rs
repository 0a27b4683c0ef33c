//! Startup configuration
//!
//! Loaded from TOML. Every section and field is optional and falls back to
//! its default. [`HandvoxConfig::validate`] rejects bad values instead of
//! clamping them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::error::{ConfigError, Result};
use crate::gesture::{CursorMapping, DepthMapping, GestureThresholds, RecognizerSettings};
use crate::interaction::ControllerSettings;
use crate::render::{Color, RenderSettings};
use crate::spatial::Vector3D;
use crate::world::{Opacity, SeedPattern, VoxelWorld, WorldBounds};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandvoxConfig {
    pub camera: CameraConfig,
    pub world: WorldConfig,
    pub cursor: CursorConfig,
    pub gesture: GestureConfig,
    pub render: RenderConfig,
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Initial look-at point, also the orbit pivot
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub pattern: SeedPattern,
    /// Seed for the pattern's colors
    pub rng_seed: u64,
    /// Edits outside `-n..=n` on any axis are dropped
    pub bounds_half_extent: Option<i32>,
    pub max_voxels: Option<usize>,
    pub placed_opacity: Opacity,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            pattern: SeedPattern::default(),
            rng_seed: 7,
            bounds_half_extent: Some(16),
            max_voxels: Some(100),
            placed_opacity: Opacity::Translucent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub workspace_width: f32,
    pub workspace_height: f32,
    pub mirror_x: bool,
    pub depth_source_min: f32,
    pub depth_source_max: f32,
    /// World z when the hand depth is at `depth_source_min`
    pub world_depth_at_min: f32,
    /// World z when the hand depth is at `depth_source_max`
    pub world_depth_at_max: f32,
    pub smoothing_alpha: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        let mapping = CursorMapping::default();
        Self {
            workspace_width: mapping.workspace_width,
            workspace_height: mapping.workspace_height,
            mirror_x: mapping.mirror_x,
            depth_source_min: mapping.depth.source_min,
            depth_source_max: mapping.depth.source_max,
            world_depth_at_min: mapping.depth.world_at_min,
            world_depth_at_max: mapping.depth.world_at_max,
            smoothing_alpha: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub pinch_distance: f32,
    pub fist_distance: f32,
    pub open_palm_distance: f32,
    pub debounce_frames: u32,
    pub erase_radius: f32,
    pub orbit_sensitivity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let thresholds = GestureThresholds::default();
        let recognizer = RecognizerSettings::default();
        Self {
            pinch_distance: thresholds.pinch_distance,
            fist_distance: thresholds.fist_distance,
            open_palm_distance: thresholds.open_palm_distance,
            debounce_frames: recognizer.debounce_frames,
            erase_radius: recognizer.erase_radius,
            orbit_sensitivity: recognizer.orbit_sensitivity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Viewport size in pixels. 0 takes the size from the terminal.
    pub width: u32,
    pub height: u32,
    pub translucent_alpha: u8,
    pub skip_hidden_faces: bool,
    pub cull_back_faces: bool,
    pub face_tint: bool,
    pub depth_test: bool,
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            width: 0,
            height: 0,
            translucent_alpha: settings.translucent_alpha,
            skip_hidden_faces: settings.skip_hidden_faces,
            cull_back_faces: settings.cull_back_faces,
            face_tint: settings.face_tint,
            depth_test: true,
            background: Color::BACKDROP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Camera yaw per frame while no open palm is held, in degrees
    pub auto_rotate_degrees: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_rotate_degrees: ControllerSettings::default().auto_rotate_degrees,
        }
    }
}

impl HandvoxConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: HandvoxConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check every section; the first problem found is returned
    pub fn validate(&self) -> Result<()> {
        self.build_camera()?;
        self.recognizer_settings().validate()?;
        crate::gesture::CursorSmoother::new(self.cursor.smoothing_alpha)?;
        if self.gesture.debounce_frames == 0 {
            return Err(ConfigError::InvalidValue {
                name: "debounce_frames",
                expected: "at least 1",
                value: 0.0,
            });
        }

        if let Some(h) = self.world.bounds_half_extent {
            if h < 0 {
                return Err(ConfigError::InvalidValue {
                    name: "bounds_half_extent",
                    expected: "non-negative",
                    value: h as f32,
                });
            }
        }
        self.world.pattern.validate(self.world.bounds_half_extent)?;
        if self.world.max_voxels == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "max_voxels",
                expected: "at least 1",
                value: 0.0,
            });
        }

        let r = &self.render;
        if (r.width == 0) != (r.height == 0) {
            return Err(ConfigError::InvalidViewport {
                width: r.width,
                height: r.height,
            });
        }
        if !self.controller.auto_rotate_degrees.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "auto_rotate_degrees",
                expected: "finite",
                value: self.controller.auto_rotate_degrees,
            });
        }
        Ok(())
    }

    /// Camera at the configured position facing the target
    pub fn build_camera(&self) -> Result<Camera> {
        let c = &self.camera;
        let mut camera = Camera::new(Vector3D::from(c.position), c.fov_degrees, c.near, c.far)?;
        camera.look_at(Vector3D::from(c.target));
        Ok(camera)
    }

    /// Empty world with the configured limits, seeded with the pattern
    pub fn build_world(&self) -> VoxelWorld {
        let w = &self.world;
        let mut world = VoxelWorld::new();
        if let Some(h) = w.bounds_half_extent {
            world = world.with_bounds(WorldBounds::cube(h));
        }
        if let Some(limit) = w.max_voxels {
            world = world.with_capacity_limit(limit);
        }
        w.pattern.populate(&mut world, w.rng_seed, w.placed_opacity);
        world
    }

    pub fn recognizer_settings(&self) -> RecognizerSettings {
        let g = &self.gesture;
        let c = &self.cursor;
        RecognizerSettings {
            thresholds: GestureThresholds {
                pinch_distance: g.pinch_distance,
                fist_distance: g.fist_distance,
                open_palm_distance: g.open_palm_distance,
                ..GestureThresholds::default()
            },
            debounce_frames: g.debounce_frames,
            erase_radius: g.erase_radius,
            orbit_sensitivity: g.orbit_sensitivity,
            cursor: CursorMapping {
                workspace_width: c.workspace_width,
                workspace_height: c.workspace_height,
                mirror_x: c.mirror_x,
                depth: DepthMapping {
                    source_min: c.depth_source_min,
                    source_max: c.depth_source_max,
                    world_at_min: c.world_depth_at_min,
                    world_at_max: c.world_depth_at_max,
                },
            },
            smoothing_alpha: c.smoothing_alpha,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            pivot: Vector3D::from(self.camera.target),
            placed_opacity: self.world.placed_opacity,
            auto_rotate_degrees: self.controller.auto_rotate_degrees,
        }
    }

    /// Render settings for a viewport. Configured dimensions win over the
    /// ones passed in.
    pub fn render_settings(&self, width: u32, height: u32) -> Result<RenderSettings> {
        let r = &self.render;
        let (width, height) = if r.width > 0 { (r.width, r.height) } else { (width, height) };
        let settings = RenderSettings {
            width,
            height,
            translucent_alpha: r.translucent_alpha,
            skip_hidden_faces: r.skip_hidden_faces,
            cull_back_faces: r.cull_back_faces,
            face_tint: r.face_tint,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = HandvoxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_world().len(), 26);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(HandvoxConfig::from_toml_str("").unwrap(), HandvoxConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = HandvoxConfig::from_toml_str(
            r#"
            [camera]
            fov_degrees = 75.0

            [gesture]
            debounce_frames = 5

            [world]
            max_voxels = 10

            [world.pattern]
            kind = "floor"
            half_extent = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.gesture.debounce_frames, 5);
        assert_eq!(config.world.pattern, SeedPattern::Floor { half_extent: 2 });
        // Floor has 25 cells but the limit stops at 10
        assert_eq!(config.build_world().len(), 10);
    }

    #[test]
    fn test_fail_fast_on_bad_values() {
        let bad_fov = HandvoxConfig::from_toml_str("[camera]\nfov_degrees = 180.0\n");
        assert!(matches!(bad_fov, Err(ConfigError::InvalidFov(_))));

        let bad_clip = HandvoxConfig::from_toml_str("[camera]\nnear = 5.0\nfar = 1.0\n");
        assert!(matches!(bad_clip, Err(ConfigError::InvalidClipRange { .. })));

        let bad_debounce = HandvoxConfig::from_toml_str("[gesture]\ndebounce_frames = 0\n");
        assert!(matches!(
            bad_debounce,
            Err(ConfigError::InvalidValue { name: "debounce_frames", .. })
        ));

        let bad_thresholds = HandvoxConfig::from_toml_str(
            "[gesture]\nfist_distance = 0.5\nopen_palm_distance = 0.1\n",
        );
        assert!(matches!(bad_thresholds, Err(ConfigError::Inconsistent(_))));

        let bad_alpha = HandvoxConfig::from_toml_str("[cursor]\nsmoothing_alpha = 0.0\n");
        assert!(bad_alpha.is_err());

        let half_viewport = HandvoxConfig::from_toml_str("[render]\nwidth = 80\n");
        assert!(matches!(half_viewport, Err(ConfigError::InvalidViewport { .. })));
    }

    #[test]
    fn test_seed_extent_validated() {
        let pattern = |kind: &str, half_extent: i64| {
            HandvoxConfig::from_toml_str(&format!(
                "[world.pattern]\nkind = \"{}\"\nhalf_extent = {}\n",
                kind, half_extent
            ))
        };
        for (kind, half_extent) in [
            ("hollow_cube", -2147483648),
            ("hollow_cube", -1),
            ("floor", 2147483647),
            ("floor", 100_000),
        ] {
            assert!(matches!(
                pattern(kind, half_extent),
                Err(ConfigError::InvalidValue { name: "half_extent", .. })
            ));
        }
        // Default bounds are 16: a cube of 16 fits, a floor of 16 sits at y = -17
        assert!(pattern("hollow_cube", 16).is_ok());
        assert!(pattern("floor", 16).is_err());
        assert!(pattern("floor", 15).is_ok());

        let mut unbounded = HandvoxConfig::default();
        unbounded.world.bounds_half_extent = None;
        unbounded.world.max_voxels = Some(10);
        unbounded.world.pattern = SeedPattern::Floor { half_extent: 64 };
        unbounded.validate().unwrap();
        assert_eq!(unbounded.build_world().len(), 10);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            HandvoxConfig::from_toml_str("[camera\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[controller]\nauto_rotate_degrees = 0.0").unwrap();
        let config = HandvoxConfig::load(file.path()).unwrap();
        assert_eq!(config.controller.auto_rotate_degrees, 0.0);

        let missing = HandvoxConfig::load("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = HandvoxConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(HandvoxConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_render_settings_viewport() {
        let config = HandvoxConfig::default();
        let s = config.render_settings(120, 60).unwrap();
        assert_eq!((s.width, s.height), (120, 60));
        assert!(config.render_settings(0, 0).is_err());
    }

    #[test]
    fn test_camera_faces_target() {
        let camera = HandvoxConfig::default().build_camera().unwrap();
        let to_target = (Vector3D::ZERO - camera.position).normalize();
        assert!(to_target.distance(&camera.forward()) < 1e-4);
    }
}
