//! Synthetic hand poses
//!
//! Stand-in landmark sets for the keyboard simulator and for tests. Each pose
//! is a flat hand; only the x/y layout changes between poses.

use super::classify::GestureState;
use super::landmarks::{HandLandmarks, LandmarkIndex, LANDMARK_COUNT};
use crate::error::LandmarkError;
use crate::spatial::Vector3D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandPose {
    /// Index finger and thumb out, other fingers curled
    #[default]
    Aim,
    /// Index and thumb tips touching
    Pinch,
    /// Every finger curled, thumb tucked
    Fist,
    /// Every finger spread
    OpenPalm,
}

const WRIST: (f32, f32) = (0.0, 0.08);
const THUMB_CMC: (f32, f32) = (-0.03, 0.06);
const THUMB_MCP: (f32, f32) = (-0.05, 0.03);

/// MCP joint and pointing direction for index, middle, ring, pinky
const FINGER_BASES: [((f32, f32), (f32, f32)); 4] = [
    ((-0.03, -0.02), (-0.2, -1.0)),
    ((-0.01, -0.025), (-0.07, -1.0)),
    ((0.01, -0.02), (0.07, -1.0)),
    ((0.03, -0.015), (0.2, -1.0)),
];

impl HandPose {
    pub const ALL: [HandPose; 4] = [
        HandPose::Aim,
        HandPose::Pinch,
        HandPose::Fist,
        HandPose::OpenPalm,
    ];

    /// What the default gesture thresholds classify this pose as
    pub fn expected_state(self) -> GestureState {
        match self {
            HandPose::Aim => GestureState::Aim,
            HandPose::Pinch => GestureState::Pinch,
            HandPose::Fist => GestureState::Fist,
            HandPose::OpenPalm => GestureState::OpenPalm,
        }
    }

    pub fn label(self) -> &'static str {
        self.expected_state().label()
    }

    /// Landmarks with the thumb/index midpoint placed at `cursor`
    ///
    /// `cursor` is in normalized frame coordinates; every landmark gets its z.
    pub fn landmarks(self, cursor: Vector3D) -> Result<HandLandmarks, LandmarkError> {
        let layout = self.layout();
        let thumb = layout[LandmarkIndex::ThumbTip.index()];
        let index = layout[LandmarkIndex::IndexTip.index()];
        let mid = ((thumb.0 + index.0) * 0.5, (thumb.1 + index.1) * 0.5);

        let points = layout
            .map(|(x, y)| Vector3D::new(x - mid.0 + cursor.x, y - mid.1 + cursor.y, cursor.z));
        HandLandmarks::new(points)
    }

    /// Palm-centered 2D layout, y down
    fn layout(self) -> [(f32, f32); LANDMARK_COUNT] {
        let extended: [bool; 4] = match self {
            HandPose::OpenPalm => [true; 4],
            HandPose::Aim | HandPose::Pinch => [true, false, false, false],
            HandPose::Fist => [false; 4],
        };

        let mut pts = [(0.0, 0.0); LANDMARK_COUNT];
        pts[0] = WRIST;
        pts[1] = THUMB_CMC;
        pts[2] = THUMB_MCP;
        match self {
            HandPose::Fist => {
                pts[3] = (-0.05, 0.01);
                pts[4] = (-0.05, 0.05);
            }
            _ => {
                pts[3] = (-0.08, 0.0);
                pts[4] = (-0.11, -0.02);
            }
        }

        for (finger, &((mx, my), dir)) in FINGER_BASES.iter().enumerate() {
            let len = (dir.0 * dir.0 + dir.1 * dir.1).sqrt();
            let (dx, dy) = (dir.0 / len, dir.1 / len);
            let along = |t: f32| (mx + dx * t, my + dy * t);
            let base = 5 + finger * 4;
            pts[base] = (mx, my);
            if extended[finger] {
                pts[base + 1] = along(0.04);
                pts[base + 2] = along(0.065);
                pts[base + 3] = along(0.09);
            } else {
                pts[base + 1] = along(0.035);
                pts[base + 2] = along(0.02);
                pts[base + 3] = (mx, my + 0.02);
            }
        }

        if self == HandPose::Pinch {
            // Thumb reaches over to the index tip
            let (ix, iy) = pts[LandmarkIndex::IndexTip.index()];
            pts[3] = (-0.07, -0.035);
            pts[4] = (ix - 0.012, iy + 0.008);
        }
        pts
    }
}
