//! Landmarks → debounced gesture state, cursor, and editing intent

use super::classify::{classify, positive, GestureState, GestureThresholds};
use super::cursor::{Cursor, CursorMapping, CursorSmoother};
use super::debounce::Debouncer;
use super::landmarks::HandLandmarks;
use crate::error::{ConfigError, Result};
use crate::render::Color;
use crate::spatial::Vector3D;
use crate::world::GridCoord;

/// What the current frame asks the world or camera to do
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Intent {
    #[default]
    None,
    Place {
        cell: GridCoord,
        color: Color,
    },
    EraseNear {
        center: Vector3D,
        radius: f32,
    },
    /// Camera orbit angles in radians
    Orbit {
        yaw: f32,
        pitch: f32,
    },
}

/// Tunables for [`GestureRecognizer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerSettings {
    pub thresholds: GestureThresholds,
    pub debounce_frames: u32,
    /// World-space radius cleared by a fist
    pub erase_radius: f32,
    /// Radians of orbit per normalized unit of wrist travel
    pub orbit_sensitivity: f32,
    pub cursor: CursorMapping,
    /// Weight of the newest cursor sample
    pub smoothing_alpha: f32,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            thresholds: GestureThresholds::default(),
            debounce_frames: 3,
            erase_radius: 0.75,
            orbit_sensitivity: 3.0,
            cursor: CursorMapping::default(),
            smoothing_alpha: 0.6,
        }
    }
}

impl RecognizerSettings {
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.cursor.validate()?;
        positive("erase_radius", self.erase_radius)?;
        if !self.orbit_sensitivity.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "orbit_sensitivity",
                expected: "finite",
                value: self.orbit_sensitivity,
            });
        }
        Ok(())
    }
}

/// Result of one recognizer update
#[derive(Debug, Clone, PartialEq)]
pub struct GestureFrame {
    /// Raw classification of this frame
    pub observed: GestureState,
    /// Debounced state in effect
    pub state: GestureState,
    /// Present whenever a hand was detected
    pub cursor: Option<Cursor>,
    pub intent: Intent,
}

/// Stateful gesture recognizer
///
/// Carries only the debounce counter, the cursor smoother, the last placed
/// cell of the current pinch, and the previous wrist position of the current
/// open palm. Everything else is recomputed from the frame's landmarks.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    settings: RecognizerSettings,
    debouncer: Debouncer,
    smoother: CursorSmoother,
    last_placed: Option<GridCoord>,
    last_wrist: Option<Vector3D>,
}

impl GestureRecognizer {
    pub fn new(settings: RecognizerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            debouncer: Debouncer::new(settings.debounce_frames)?,
            smoother: CursorSmoother::new(settings.smoothing_alpha)?,
            settings,
            last_placed: None,
            last_wrist: None,
        })
    }

    pub fn settings(&self) -> &RecognizerSettings {
        &self.settings
    }

    pub fn state(&self) -> GestureState {
        self.debouncer.committed()
    }

    /// Process one frame. `hand` is `None` when no hand was detected.
    pub fn update(&mut self, hand: Option<&HandLandmarks>, active_color: Color) -> GestureFrame {
        let observed = classify(hand, &self.settings.thresholds);
        let previous = self.debouncer.committed();
        let state = self.debouncer.update(observed);
        if state != previous {
            tracing::debug!(from = %previous, to = %state, "gesture committed");
        }

        let cursor = match hand {
            Some(hand) => {
                let normalized = self.smoother.smooth(hand.pinch_midpoint());
                Some(Cursor::new(normalized, &self.settings.cursor))
            }
            None => {
                self.smoother.reset();
                None
            }
        };

        if state != GestureState::Pinch {
            self.last_placed = None;
        }
        if state != GestureState::OpenPalm || hand.is_none() {
            self.last_wrist = None;
        }

        let intent = match (state, hand, cursor) {
            (GestureState::Pinch, Some(_), Some(cursor)) => {
                if self.last_placed == Some(cursor.cell) {
                    Intent::None
                } else {
                    self.last_placed = Some(cursor.cell);
                    Intent::Place {
                        cell: cursor.cell,
                        color: active_color,
                    }
                }
            }
            (GestureState::Fist, Some(_), Some(cursor)) => Intent::EraseNear {
                center: cursor.world,
                radius: self.settings.erase_radius,
            },
            (GestureState::OpenPalm, Some(hand), _) => {
                let wrist = hand.wrist();
                let intent = match self.last_wrist {
                    Some(prev) => {
                        let delta = wrist - prev;
                        Intent::Orbit {
                            yaw: delta.x * self.settings.orbit_sensitivity,
                            pitch: delta.y * self.settings.orbit_sensitivity,
                        }
                    }
                    None => Intent::None,
                };
                self.last_wrist = Some(wrist);
                intent
            }
            _ => Intent::None,
        };

        GestureFrame {
            observed,
            state,
            cursor,
            intent,
        }
    }

    /// Drop all history (debounce, smoothing, placement, orbit)
    pub fn reset(&mut self) {
        self.debouncer.reset();
        self.smoother.reset();
        self.last_placed = None;
        self.last_wrist = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::pose::HandPose;

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(RecognizerSettings::default()).unwrap()
    }

    fn hand(pose: HandPose, x: f32, y: f32) -> HandLandmarks {
        pose.landmarks(Vector3D::new(x, y, -0.05)).unwrap()
    }

    #[test]
    fn test_no_hand_no_intent() {
        let mut r = recognizer();
        for _ in 0..5 {
            let frame = r.update(None, Color::RED);
            assert_eq!(frame.state, GestureState::None);
            assert!(frame.cursor.is_none());
            assert_eq!(frame.intent, Intent::None);
        }
    }

    #[test]
    fn test_pinch_places_once_per_cell() {
        let mut r = recognizer();
        let pinch = hand(HandPose::Pinch, 0.5, 0.5);
        let intents: Vec<_> = (0..6).map(|_| r.update(Some(&pinch), Color::RED).intent).collect();
        assert_eq!(intents[..2], [Intent::None, Intent::None]);
        assert_eq!(
            intents[2],
            Intent::Place {
                cell: GridCoord::ORIGIN,
                color: Color::RED
            }
        );
        assert!(intents[3..].iter().all(|i| *i == Intent::None));
    }

    #[test]
    fn test_pinch_drag_places_in_new_cells() {
        let settings = RecognizerSettings {
            smoothing_alpha: 1.0,
            debounce_frames: 1,
            ..RecognizerSettings::default()
        };
        let mut r = GestureRecognizer::new(settings).unwrap();
        let a = r.update(Some(&hand(HandPose::Pinch, 0.5, 0.5)), Color::RED).intent;
        let b = r.update(Some(&hand(HandPose::Pinch, 0.7, 0.5)), Color::RED).intent;
        let c = r.update(Some(&hand(HandPose::Pinch, 0.7, 0.5)), Color::RED).intent;
        assert!(matches!(a, Intent::Place { cell, .. } if cell == GridCoord::ORIGIN));
        assert!(matches!(b, Intent::Place { cell, .. } if cell == GridCoord::new(2, 0, 0)));
        assert_eq!(c, Intent::None);
    }

    #[test]
    fn test_releasing_pinch_allows_same_cell_again() {
        let settings = RecognizerSettings {
            debounce_frames: 1,
            ..RecognizerSettings::default()
        };
        let mut r = GestureRecognizer::new(settings).unwrap();
        let pinch = hand(HandPose::Pinch, 0.5, 0.5);
        assert!(matches!(r.update(Some(&pinch), Color::RED).intent, Intent::Place { .. }));
        r.update(None, Color::RED);
        assert!(matches!(r.update(Some(&pinch), Color::RED).intent, Intent::Place { .. }));
    }

    #[test]
    fn test_fist_erases_every_frame() {
        let mut r = recognizer();
        let fist = hand(HandPose::Fist, 0.5, 0.5);
        let frames: Vec<_> = (0..5).map(|_| r.update(Some(&fist), Color::RED)).collect();
        assert_eq!(frames[1].state, GestureState::None);
        for frame in &frames[2..] {
            assert_eq!(frame.state, GestureState::Fist);
            match frame.intent {
                Intent::EraseNear { center, radius } => {
                    assert!(center.magnitude() < 1e-4);
                    assert_eq!(radius, 0.75);
                }
                other => panic!("expected erase, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_open_palm_orbits_from_wrist_motion() {
        let settings = RecognizerSettings {
            debounce_frames: 1,
            ..RecognizerSettings::default()
        };
        let mut r = GestureRecognizer::new(settings).unwrap();
        // First frame has no previous wrist
        let first = r.update(Some(&hand(HandPose::OpenPalm, 0.5, 0.5)), Color::RED);
        assert_eq!(first.intent, Intent::None);
        match r.update(Some(&hand(HandPose::OpenPalm, 0.6, 0.5)), Color::RED).intent {
            Intent::Orbit { yaw, pitch } => {
                assert!((yaw - 0.3).abs() < 1e-4);
                assert!(pitch.abs() < 1e-5);
            }
            other => panic!("expected orbit, got {:?}", other),
        }

        // Leaving open palm drops the reference, so there is no jump on return
        r.update(Some(&hand(HandPose::Aim, 0.6, 0.5)), Color::RED);
        let back = r.update(Some(&hand(HandPose::OpenPalm, 0.9, 0.5)), Color::RED);
        assert_eq!(back.intent, Intent::None);
    }

    #[test]
    fn test_aim_has_cursor_but_no_intent() {
        let mut r = recognizer();
        let aim = hand(HandPose::Aim, 0.2, 0.8);
        let mut last = None;
        for _ in 0..4 {
            last = Some(r.update(Some(&aim), Color::RED));
        }
        let frame = last.unwrap();
        assert_eq!(frame.state, GestureState::Aim);
        assert_eq!(frame.intent, Intent::None);
        assert_eq!(frame.cursor.map(|c| c.cell), Some(GridCoord::new(-3, -3, 0)));
    }

    #[test]
    fn test_rejects_bad_settings() {
        let bad = RecognizerSettings {
            debounce_frames: 0,
            ..RecognizerSettings::default()
        };
        assert!(GestureRecognizer::new(bad).is_err());
        let bad = RecognizerSettings {
            erase_radius: -1.0,
            ..RecognizerSettings::default()
        };
        assert!(GestureRecognizer::new(bad).is_err());
    }
}
