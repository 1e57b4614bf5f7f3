//! Display output
//!
//! Formatting options, brightness selection and composition of the
//! per-tick [`DisplayFrame`].

pub mod brightness;
pub mod format;
pub mod frame;

pub use brightness::brightness;
pub use format::{DateFormat, DimmingMode, NightDim, TimeFormat};
pub use frame::{compose, DisplayFrame, FrameInputs, MAX_DIGITS};
