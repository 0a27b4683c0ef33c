//! Applies gesture intents to the world and camera

use crate::camera::{Camera, CameraMode};
use crate::error::{EditError, Result};
use crate::gesture::{GestureFrame, GestureRecognizer, GestureState, HandLandmarks, Intent};
use crate::render::{Color, DEFAULT_PALETTE};
use crate::spatial::Vector3D;
use crate::world::{GridCoord, Opacity, Voxel, VoxelWorld};

/// How far from the cursor a voxel can be and still donate its color
pub const PICK_DISTANCE: f32 = 2.0;

/// Drawing colors with one active entry
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
    active: usize,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
            active: 0,
        }
    }
}

impl Palette {
    /// `None` for an empty color list
    pub fn new(colors: Vec<Color>) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }
        Some(Self { colors, active: 0 })
    }

    pub fn active(&self) -> Color {
        self.colors[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Advance to the next color, wrapping around
    pub fn cycle(&mut self) -> Color {
        self.active = (self.active + 1) % self.colors.len();
        self.active()
    }

    /// Select by index; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.colors.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Make `color` active if the palette holds it
    pub fn pick(&mut self, color: Color) -> bool {
        match self.colors.iter().position(|c| *c == color) {
            Some(index) => self.select(index),
            None => false,
        }
    }
}

/// Outcome of applying one intent
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Nothing,
    Placed { cell: GridCoord, replaced: bool },
    Erased(usize),
    Orbited,
    /// The edit was rejected and had no effect
    Dropped(EditError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Point the camera orbits around
    pub pivot: Vector3D,
    pub placed_opacity: Opacity,
    /// Yaw added each frame outside open palm, in degrees. 0 disables.
    pub auto_rotate_degrees: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            pivot: Vector3D::ZERO,
            placed_opacity: Opacity::Translucent,
            auto_rotate_degrees: 0.5,
        }
    }
}

/// Applies exactly one intent per frame; nothing is queued or retried
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    settings: ControllerSettings,
}

impl InteractionController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn apply(&self, intent: &Intent, world: &mut VoxelWorld, camera: &mut Camera) -> Applied {
        match *intent {
            Intent::None => Applied::Nothing,
            Intent::Place { cell, color } => {
                match world.place(cell, color, self.settings.placed_opacity) {
                    Ok(previous) => {
                        tracing::debug!(%cell, "voxel placed");
                        Applied::Placed {
                            cell,
                            replaced: previous.is_some(),
                        }
                    }
                    Err(e) => {
                        tracing::debug!("place dropped: {}", e);
                        Applied::Dropped(e)
                    }
                }
            }
            Intent::EraseNear { center, radius } => {
                let removed = world.erase_near(center, radius);
                if removed > 0 {
                    tracing::debug!(removed, "voxels erased");
                }
                Applied::Erased(removed)
            }
            Intent::Orbit { yaw, pitch } => {
                camera.orbit(self.settings.pivot, yaw, pitch);
                Applied::Orbited
            }
        }
    }

    /// Fixed per-frame rotation used while no gesture drives the camera
    pub fn auto_rotate(&self, camera: &mut Camera) -> bool {
        if self.settings.auto_rotate_degrees == 0.0 {
            return false;
        }
        camera.orbit(self.settings.pivot, self.settings.auto_rotate_degrees.to_radians(), 0.0);
        true
    }
}

/// Everything that happened in one editor step
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub gesture: GestureFrame,
    pub applied: Applied,
    pub camera_mode: CameraMode,
    pub voxel_count: usize,
}

/// World, camera, and the gesture pipeline that edits them
///
/// The frame loop owns one of these and calls [`Editor::step`] once per
/// detector sample.
#[derive(Debug, Clone)]
pub struct Editor {
    world: VoxelWorld,
    camera: Camera,
    recognizer: GestureRecognizer,
    controller: InteractionController,
    palette: Palette,
    mode: CameraMode,
    cursor: Option<Vector3D>,
}

impl Editor {
    pub fn new(
        world: VoxelWorld,
        camera: Camera,
        recognizer: GestureRecognizer,
        controller: InteractionController,
    ) -> Self {
        Self {
            world,
            camera,
            recognizer,
            controller,
            palette: Palette::default(),
            mode: CameraMode::AutoRotate,
            cursor: None,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Build from a validated configuration
    pub fn from_config(config: &crate::config::HandvoxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.build_world(),
            config.build_camera()?,
            GestureRecognizer::new(config.recognizer_settings())?,
            InteractionController::new(config.controller_settings()),
        ))
    }

    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut VoxelWorld {
        &mut self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.mode
    }

    pub fn gesture_state(&self) -> GestureState {
        self.recognizer.state()
    }

    /// World position of the cursor from the last step, `None` without a hand
    pub fn cursor(&self) -> Option<Vector3D> {
        self.cursor
    }

    /// Adopt the color of the voxel nearest the cursor
    ///
    /// Returns the new active color, or `None` when there is no cursor, no
    /// voxel within [`PICK_DISTANCE`], or the voxel's color is not in the
    /// palette.
    pub fn pick_color(&mut self) -> Option<Color> {
        let cell = self.world.nearest(self.cursor?, PICK_DISTANCE)?;
        let color = self.world.get(cell)?.color;
        if !self.palette.pick(color) {
            tracing::debug!(%cell, "picked color is not in the palette");
            return None;
        }
        tracing::debug!(%cell, ?color, "color picked");
        Some(color)
    }

    /// Run one frame: recognize, apply the intent, update the ghost and camera
    pub fn step(&mut self, hand: Option<&HandLandmarks>) -> FrameReport {
        let color = self.palette.active();
        let gesture = self.recognizer.update(hand, color);
        self.cursor = gesture.cursor.map(|c| c.world);
        let applied = self
            .controller
            .apply(&gesture.intent, &mut self.world, &mut self.camera);

        match (gesture.state, gesture.cursor) {
            (GestureState::Aim | GestureState::Pinch, Some(cursor)) => {
                self.world.set_ghost(Voxel::ghost(cursor.cell, color));
            }
            _ => self.world.clear_ghost(),
        }

        let mode = if gesture.state == GestureState::OpenPalm {
            CameraMode::GestureOrbit
        } else {
            CameraMode::AutoRotate
        };
        if mode != self.mode {
            tracing::debug!(?mode, "camera mode changed");
            self.mode = mode;
        }
        if mode == CameraMode::AutoRotate {
            self.controller.auto_rotate(&mut self.camera);
        }

        FrameReport {
            gesture,
            applied,
            camera_mode: mode,
            voxel_count: self.world.len(),
        }
    }
}
