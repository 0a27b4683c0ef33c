//! Keyboard hand simulator
//!
//! Stands in for a camera-based detector during development. Maps keys to a
//! synthetic hand: arrows move it, `[`/`]` push it away from or pull it
//! toward the camera, `1`-`4` choose the pose, `h` hides it.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use handvox_core::gesture::HandPose;
use handvox_core::{HandDetector, HandLandmarks, LandmarkError, Vector3D};

/// Non-hand actions the frame loop has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    None,
    CycleColor,
    /// Take the color of the voxel under the cursor
    PickColor,
    Quit,
}

/// Simulates a tracked hand from keyboard input
#[derive(Debug, Clone)]
pub struct HandSimulator {
    /// Thumb/index midpoint in normalized frame coordinates
    position: Vector3D,
    pose: HandPose,
    visible: bool,
    move_step: f32,
    depth_step: f32,
    depth_range: (f32, f32),
}

impl Default for HandSimulator {
    fn default() -> Self {
        Self {
            position: Vector3D::new(0.5, 0.5, -0.05),
            pose: HandPose::Aim,
            visible: true,
            move_step: 0.02,
            depth_step: 0.01,
            depth_range: (-0.15, 0.05),
        }
    }
}

impl HandSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict depth travel to the cursor's depth source range
    pub fn with_depth_range(mut self, min: f32, max: f32) -> Self {
        self.depth_range = (min, max);
        self.position.z = self.position.z.clamp(min, max);
        self
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn pose(&self) -> HandPose {
        self.pose
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Process a keyboard event
    pub fn process_key(&mut self, key: KeyEvent) -> SimCommand {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return SimCommand::None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return SimCommand::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return SimCommand::Quit
            }

            // Arrow keys: move the hand in the frame
            KeyCode::Up => self.nudge(0.0, -self.move_step, 0.0),
            KeyCode::Down => self.nudge(0.0, self.move_step, 0.0),
            KeyCode::Left => self.nudge(-self.move_step, 0.0, 0.0),
            KeyCode::Right => self.nudge(self.move_step, 0.0, 0.0),

            // Brackets: hand depth
            KeyCode::Char('[') => self.nudge(0.0, 0.0, self.depth_step),
            KeyCode::Char(']') => self.nudge(0.0, 0.0, -self.depth_step),

            // Number keys: pose
            KeyCode::Char('1') => self.set_pose(HandPose::Aim),
            KeyCode::Char('2') => self.set_pose(HandPose::Pinch),
            KeyCode::Char('3') => self.set_pose(HandPose::Fist),
            KeyCode::Char('4') => self.set_pose(HandPose::OpenPalm),

            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.visible = !self.visible;
                tracing::debug!(visible = self.visible, "simulated hand toggled");
            }
            KeyCode::Char('c') | KeyCode::Char('C') => return SimCommand::CycleColor,
            KeyCode::Char('p') | KeyCode::Char('P') => return SimCommand::PickColor,
            _ => {}
        }
        SimCommand::None
    }

    fn nudge(&mut self, dx: f32, dy: f32, dz: f32) {
        let (zmin, zmax) = self.depth_range;
        self.position = Vector3D::new(
            (self.position.x + dx).clamp(0.0, 1.0),
            (self.position.y + dy).clamp(0.0, 1.0),
            (self.position.z + dz).clamp(zmin, zmax),
        );
    }

    fn set_pose(&mut self, pose: HandPose) {
        self.pose = pose;
        self.visible = true;
    }

    /// Reset simulator to default state
    pub fn reset(&mut self) {
        let (zmin, zmax) = self.depth_range;
        *self = Self::default().with_depth_range(zmin, zmax);
    }
}

impl HandDetector for HandSimulator {
    fn detect(&mut self) -> Result<Option<HandLandmarks>, LandmarkError> {
        if !self.visible {
            return Ok(None);
        }
        self.pose.landmarks(self.position).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_arrows_move_hand() {
        let mut sim = HandSimulator::new();
        sim.process_key(press(KeyCode::Up));
        sim.process_key(press(KeyCode::Right));
        let p = sim.position();
        assert!(p.y < 0.5);
        assert!(p.x > 0.5);
    }

    #[test]
    fn test_position_stays_in_frame() {
        let mut sim = HandSimulator::new();
        for _ in 0..100 {
            sim.process_key(press(KeyCode::Left));
            sim.process_key(press(KeyCode::Char('[')));
        }
        let p = sim.position();
        assert_eq!(p.x, 0.0);
        assert_eq!(p.z, 0.05);
    }

    #[test]
    fn test_pose_keys_and_hide() {
        let mut sim = HandSimulator::new();
        sim.process_key(press(KeyCode::Char('3')));
        assert_eq!(sim.pose(), HandPose::Fist);

        sim.process_key(press(KeyCode::Char('h')));
        assert!(sim.detect().unwrap().is_none());

        // Choosing a pose shows the hand again
        sim.process_key(press(KeyCode::Char('2')));
        let hand = sim.detect().unwrap().unwrap();
        assert!(hand.pinch_midpoint().distance(&sim.position()) < 1e-5);
    }

    #[test]
    fn test_commands() {
        let mut sim = HandSimulator::new();
        assert_eq!(sim.process_key(press(KeyCode::Char('c'))), SimCommand::CycleColor);
        assert_eq!(sim.process_key(press(KeyCode::Char('p'))), SimCommand::PickColor);
        assert_eq!(sim.process_key(press(KeyCode::Esc)), SimCommand::Quit);
        assert_eq!(
            sim.process_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            SimCommand::Quit
        );
        assert_eq!(sim.process_key(press(KeyCode::Char('x'))), SimCommand::None);
    }

    #[test]
    fn test_reset_keeps_depth_range() {
        let mut sim = HandSimulator::new().with_depth_range(-0.1, 0.0);
        sim.process_key(press(KeyCode::Char('4')));
        sim.process_key(press(KeyCode::Down));
        sim.reset();
        assert_eq!(sim.pose(), HandPose::Aim);
        assert_eq!(sim.position(), Vector3D::new(0.5, 0.5, -0.05));
    }
}
