//! Frame debouncing for gesture states

use super::classify::GestureState;
use crate::error::{ConfigError, Result};

/// Debounce bookkeeping carried between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceState {
    /// State currently in effect
    pub committed: GestureState,
    /// Most recent state that differs from `committed`
    pub candidate: GestureState,
    /// Consecutive frames `candidate` has been observed
    pub count: u32,
}

/// One debounce transition
///
/// A candidate is committed on the `frames`-th consecutive frame it is
/// observed. Observing the committed state again discards any pending
/// candidate.
pub fn debounce(observed: GestureState, state: DebounceState, frames: u32) -> DebounceState {
    if observed == state.committed {
        return DebounceState {
            committed: state.committed,
            candidate: observed,
            count: 0,
        };
    }

    let count = if observed == state.candidate {
        state.count.saturating_add(1)
    } else {
        1
    };
    if count >= frames {
        DebounceState {
            committed: observed,
            candidate: observed,
            count: 0,
        }
    } else {
        DebounceState {
            committed: state.committed,
            candidate: observed,
            count,
        }
    }
}

/// Owns the debounce state and window length
#[derive(Debug, Clone)]
pub struct Debouncer {
    frames: u32,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(frames: u32) -> Result<Self> {
        if frames == 0 {
            return Err(ConfigError::InvalidValue {
                name: "debounce_frames",
                expected: "at least 1",
                value: 0.0,
            });
        }
        Ok(Self {
            frames,
            state: DebounceState::default(),
        })
    }

    /// Feed one observed state; returns the committed state
    pub fn update(&mut self, observed: GestureState) -> GestureState {
        self.state = debounce(observed, self.state, self.frames);
        self.state.committed
    }

    pub fn committed(&self) -> GestureState {
        self.state.committed
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GestureState::*;

    fn run(frames: u32, inputs: &[GestureState]) -> Vec<GestureState> {
        let mut d = Debouncer::new(frames).unwrap();
        inputs.iter().map(|&s| d.update(s)).collect()
    }

    #[test]
    fn test_aim_then_fist() {
        let mut inputs = vec![Aim; 5];
        inputs.extend([Fist; 5]);
        let out = run(3, &inputs);
        assert_eq!(out[..5], [None, None, Aim, Aim, Aim]);
        // First two fist frames are absorbed, third commits
        assert_eq!(out[5..], [Aim, Aim, Fist, Fist, Fist]);
    }

    #[test]
    fn test_single_frame_flicker_suppressed() {
        let out = run(3, &[Aim, Aim, Aim, Fist, Aim, Aim, Fist, Aim]);
        assert!(out[2..].iter().all(|&s| s == Aim));
    }

    #[test]
    fn test_interrupted_candidate_restarts() {
        let out = run(3, &[Pinch, Pinch, Fist, Pinch, Pinch, Pinch]);
        assert_eq!(out, [None, None, None, None, None, Pinch]);
    }

    #[test]
    fn test_window_of_one_commits_immediately() {
        let out = run(1, &[Aim, Fist, None]);
        assert_eq!(out, [Aim, Fist, None]);
    }

    #[test]
    fn test_transition_function_is_pure() {
        let s = DebounceState {
            committed: Aim,
            candidate: Fist,
            count: 1,
        };
        let next = debounce(Fist, s, 3);
        assert_eq!(next.count, 2);
        assert_eq!(next.committed, Aim);
        assert_eq!(debounce(Fist, s, 3), next);
        assert_eq!(debounce(Aim, s, 3).count, 0);
    }

    #[test]
    fn test_zero_frames_rejected() {
        assert!(Debouncer::new(0).is_err());
    }
}
