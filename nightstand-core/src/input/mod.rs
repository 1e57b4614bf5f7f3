//! Input classification
//!
//! Turns raw control levels into taps, graduated holds and releases, with
//! an optional rotary velocity flag.

pub mod classifier;
pub mod events;
pub mod velocity;

pub use classifier::{ButtonClassifier, ControlSamples, InputClassifier};
pub use events::{ControlEvent, ControlId, HoldLevel, Transition, Velocity};
pub use velocity::{VelocityTracker, VELOCITY_WINDOW};
