//! Per-frame gesture classification

use std::fmt;

use super::landmarks::{Finger, HandLandmarks, LandmarkIndex};
use crate::error::{ConfigError, Result};

/// Discrete hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// No hand detected
    #[default]
    None,
    /// Hand present, none of the other poses
    Aim,
    /// Thumb and index tips touching: place voxels
    Pinch,
    /// All fingers curled: erase voxels
    Fist,
    /// All fingers spread: orbit the camera
    OpenPalm,
}

impl GestureState {
    pub fn label(&self) -> &'static str {
        match self {
            GestureState::None => "none",
            GestureState::Aim => "aim",
            GestureState::Pinch => "pinch",
            GestureState::Fist => "fist",
            GestureState::OpenPalm => "open palm",
        }
    }

    pub fn hand_present(&self) -> bool {
        *self != GestureState::None
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distances are in normalized frame units
#[derive(Debug, Clone, PartialEq)]
pub struct GestureThresholds {
    /// Thumb tip to index tip below this is a pinch
    pub pinch_distance: f32,
    /// Every finger tip closer than this to the palm center is a fist
    pub fist_distance: f32,
    /// Every tip farther than this from the palm center can be an open palm
    pub open_palm_distance: f32,
    /// Finger extended when tip-to-MCP exceeds PIP-to-MCP times this
    pub finger_extension_ratio: f32,
    /// Thumb extended when tip-to-MCP exceeds MCP-to-wrist times this
    pub thumb_extension_ratio: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch_distance: 0.045,
            fist_distance: 0.07,
            open_palm_distance: 0.10,
            finger_extension_ratio: 1.1,
            thumb_extension_ratio: 0.6,
        }
    }
}

impl GestureThresholds {
    pub fn validate(&self) -> Result<()> {
        positive("pinch_distance", self.pinch_distance)?;
        positive("fist_distance", self.fist_distance)?;
        positive("open_palm_distance", self.open_palm_distance)?;
        positive("finger_extension_ratio", self.finger_extension_ratio)?;
        positive("thumb_extension_ratio", self.thumb_extension_ratio)?;
        if self.fist_distance >= self.open_palm_distance {
            return Err(ConfigError::Inconsistent(format!(
                "fist_distance ({}) must be smaller than open_palm_distance ({})",
                self.fist_distance, self.open_palm_distance
            )));
        }
        Ok(())
    }
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            expected: "positive and finite",
            value,
        })
    }
}

/// Which fingers are extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn from_landmarks(hand: &HandLandmarks, thresholds: &GestureThresholds) -> Self {
        let finger = |f: Finger| {
            let mcp = hand.get(f.mcp());
            hand.get(f.tip()).distance(&mcp)
                > hand.get(f.pip()).distance(&mcp) * thresholds.finger_extension_ratio
        };
        let thumb_mcp = hand.get(LandmarkIndex::ThumbMcp);
        let thumb = hand.thumb_tip().distance(&thumb_mcp)
            > thumb_mcp.distance(&hand.wrist()) * thresholds.thumb_extension_ratio;

        Self {
            thumb,
            index: finger(Finger::Index),
            middle: finger(Finger::Middle),
            ring: finger(Finger::Ring),
            pinky: finger(Finger::Pinky),
        }
    }

    pub fn count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&e| e)
            .count()
    }

    /// All four non-thumb fingers extended
    pub fn fingers_extended(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }
}

/// Classify one frame. Checks run in priority order: pinch, fist, open palm,
/// then aim as the fallback.
pub fn classify(hand: Option<&HandLandmarks>, thresholds: &GestureThresholds) -> GestureState {
    let Some(hand) = hand else {
        return GestureState::None;
    };

    let pinched = hand.pinch_distance() < thresholds.pinch_distance;
    if pinched {
        return GestureState::Pinch;
    }

    let palm = hand.palm_center();
    let curled = Finger::FINGERS
        .iter()
        .all(|&f| hand.tip(f).distance(&palm) < thresholds.fist_distance);
    if curled {
        return GestureState::Fist;
    }

    let spread = Finger::ALL
        .iter()
        .all(|&f| hand.tip(f).distance(&palm) > thresholds.open_palm_distance);
    if spread && FingerStates::from_landmarks(hand, thresholds).fingers_extended() {
        return GestureState::OpenPalm;
    }

    GestureState::Aim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::pose::HandPose;
    use crate::spatial::Vector3D;

    fn at_center(pose: HandPose) -> HandLandmarks {
        pose.landmarks(Vector3D::new(0.5, 0.5, 0.0)).unwrap()
    }

    #[test]
    fn test_no_hand() {
        assert_eq!(classify(None, &GestureThresholds::default()), GestureState::None);
    }

    #[test]
    fn test_synthetic_poses() {
        let t = GestureThresholds::default();
        for pose in HandPose::ALL {
            assert_eq!(classify(Some(&at_center(pose)), &t), pose.expected_state());
        }
    }

    #[test]
    fn test_pinch_beats_fist() {
        // A fist with the thumb pressed onto the index tip reads as a pinch
        let fist = at_center(HandPose::Fist);
        let mut points = *fist.points();
        points[LandmarkIndex::ThumbTip.index()] = fist.index_tip() + Vector3D::new(0.01, 0.0, 0.0);
        let hand = HandLandmarks::new(points).unwrap();
        assert_eq!(classify(Some(&hand), &GestureThresholds::default()), GestureState::Pinch);
    }

    #[test]
    fn test_threshold_controls_pinch() {
        let hand = at_center(HandPose::Aim);
        let wide = GestureThresholds {
            pinch_distance: hand.pinch_distance() + 0.01,
            ..GestureThresholds::default()
        };
        assert_eq!(classify(Some(&hand), &wide), GestureState::Pinch);
    }

    #[test]
    fn test_finger_states() {
        let t = GestureThresholds::default();
        let open = FingerStates::from_landmarks(&at_center(HandPose::OpenPalm), &t);
        assert_eq!(open.count(), 5);
        assert!(open.fingers_extended());

        let aim = FingerStates::from_landmarks(&at_center(HandPose::Aim), &t);
        assert!(aim.index && aim.thumb);
        assert!(!aim.middle && !aim.ring && !aim.pinky);

        let fist = FingerStates::from_landmarks(&at_center(HandPose::Fist), &t);
        assert!(!fist.fingers_extended());
    }

    #[test]
    fn test_validate() {
        assert!(GestureThresholds::default().validate().is_ok());
        let bad = GestureThresholds {
            fist_distance: 0.2,
            ..GestureThresholds::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Inconsistent(_))));
        let bad = GestureThresholds {
            pinch_distance: 0.0,
            ..GestureThresholds::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidValue { name: "pinch_distance", .. })
        ));
    }
}
