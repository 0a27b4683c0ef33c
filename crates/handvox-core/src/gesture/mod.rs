//! Hand gesture recognition
//!
//! Per frame: [`classify`] maps landmarks to a raw [`GestureState`],
//! [`debounce`] decides whether that state is committed, and
//! [`GestureRecognizer`] turns the committed state plus the cursor into an
//! [`Intent`].

mod classify;
mod cursor;
mod debounce;
mod landmarks;
pub mod pose;
mod recognizer;

pub use classify::{classify, FingerStates, GestureState, GestureThresholds};
pub use cursor::{Cursor, CursorMapping, CursorSmoother, DepthMapping};
pub use debounce::{debounce, DebounceState, Debouncer};
pub use landmarks::{Finger, HandDetector, HandLandmarks, LandmarkIndex, LANDMARK_COUNT};
pub use pose::HandPose;
pub use recognizer::{GestureFrame, GestureRecognizer, Intent, RecognizerSettings};
