//! Hand landmark record from an external detector

use std::ops::Index;

use crate::error::LandmarkError;
use crate::spatial::Vector3D;

/// Points per detected hand
pub const LANDMARK_COUNT: usize = 21;

/// Named landmark positions, in detector output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIndex {
    /// Landmarks averaged for the palm center
    pub const PALM: [LandmarkIndex; 5] = [
        LandmarkIndex::Wrist,
        LandmarkIndex::IndexMcp,
        LandmarkIndex::MiddleMcp,
        LandmarkIndex::RingMcp,
        LandmarkIndex::PinkyMcp,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four non-thumb fingers
    pub const FINGERS: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn mcp(self) -> LandmarkIndex {
        match self {
            Finger::Thumb => LandmarkIndex::ThumbMcp,
            Finger::Index => LandmarkIndex::IndexMcp,
            Finger::Middle => LandmarkIndex::MiddleMcp,
            Finger::Ring => LandmarkIndex::RingMcp,
            Finger::Pinky => LandmarkIndex::PinkyMcp,
        }
    }

    /// Middle joint. For the thumb this is the IP joint.
    pub fn pip(self) -> LandmarkIndex {
        match self {
            Finger::Thumb => LandmarkIndex::ThumbIp,
            Finger::Index => LandmarkIndex::IndexPip,
            Finger::Middle => LandmarkIndex::MiddlePip,
            Finger::Ring => LandmarkIndex::RingPip,
            Finger::Pinky => LandmarkIndex::PinkyPip,
        }
    }

    pub fn tip(self) -> LandmarkIndex {
        match self {
            Finger::Thumb => LandmarkIndex::ThumbTip,
            Finger::Index => LandmarkIndex::IndexTip,
            Finger::Middle => LandmarkIndex::MiddleTip,
            Finger::Ring => LandmarkIndex::RingTip,
            Finger::Pinky => LandmarkIndex::PinkyTip,
        }
    }
}

/// One hand: 21 points in normalized frame coordinates
///
/// x and y are in [0, 1] with y growing downward; z is relative depth,
/// negative toward the camera. All points are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Vector3D; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Vector3D; LANDMARK_COUNT]) -> Result<Self, LandmarkError> {
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    /// Build from detector output, which must hold exactly 21 points
    pub fn from_points(points: &[Vector3D]) -> Result<Self, LandmarkError> {
        let points: [Vector3D; LANDMARK_COUNT] =
            points.try_into().map_err(|_| LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                got: points.len(),
            })?;
        Self::new(points)
    }

    pub fn points(&self) -> &[Vector3D; LANDMARK_COUNT] {
        &self.points
    }

    pub fn get(&self, index: LandmarkIndex) -> Vector3D {
        self.points[index.index()]
    }

    pub fn wrist(&self) -> Vector3D {
        self.get(LandmarkIndex::Wrist)
    }

    pub fn thumb_tip(&self) -> Vector3D {
        self.get(LandmarkIndex::ThumbTip)
    }

    pub fn index_tip(&self) -> Vector3D {
        self.get(LandmarkIndex::IndexTip)
    }

    pub fn tip(&self, finger: Finger) -> Vector3D {
        self.get(finger.tip())
    }

    /// Mean of the wrist and the four finger MCP joints
    pub fn palm_center(&self) -> Vector3D {
        let sum = LandmarkIndex::PALM
            .iter()
            .fold(Vector3D::ZERO, |acc, &i| acc + self.get(i));
        sum / LandmarkIndex::PALM.len() as f32
    }

    /// Midpoint of the thumb and index tips, the editing cursor
    pub fn pinch_midpoint(&self) -> Vector3D {
        self.thumb_tip().midpoint(&self.index_tip())
    }

    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance(&self.index_tip())
    }
}

impl Index<LandmarkIndex> for HandLandmarks {
    type Output = Vector3D;

    fn index(&self, index: LandmarkIndex) -> &Vector3D {
        &self.points[index.index()]
    }
}

/// Source of per-frame hand samples
///
/// Implementations wrap a camera plus landmark model, or a simulator.
/// `Ok(None)` means no hand this frame; an error means the detector produced
/// something unusable, which the frame loop also treats as no hand.
pub trait HandDetector {
    fn detect(&mut self) -> Result<Option<HandLandmarks>, LandmarkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<Vector3D> {
        (0..LANDMARK_COUNT)
            .map(|i| Vector3D::new(i as f32 * 0.01, 0.5, 0.0))
            .collect()
    }

    #[test]
    fn test_from_points_checks_length() {
        let mut pts = grid_points();
        assert!(HandLandmarks::from_points(&pts).is_ok());
        pts.pop();
        assert_eq!(
            HandLandmarks::from_points(&pts),
            Err(LandmarkError::WrongCount {
                expected: 21,
                got: 20
            })
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut pts = grid_points();
        pts[7].y = f32::NAN;
        assert_eq!(
            HandLandmarks::from_points(&pts),
            Err(LandmarkError::NonFinite { index: 7 })
        );
    }

    #[test]
    fn test_named_access() {
        let hand = HandLandmarks::from_points(&grid_points()).unwrap();
        assert_eq!(hand[LandmarkIndex::IndexTip], Vector3D::new(0.08, 0.5, 0.0));
        assert_eq!(hand.tip(Finger::Pinky), hand.get(LandmarkIndex::PinkyTip));
        assert_eq!(LandmarkIndex::PinkyTip.index(), 20);
        // Mean of indices 0, 5, 9, 13, 17
        assert!((hand.palm_center().x - 0.088).abs() < 1e-6);
        assert!((hand.pinch_midpoint().x - 0.06).abs() < 1e-6);
    }
}
