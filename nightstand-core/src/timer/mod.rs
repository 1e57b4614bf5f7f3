//! Countdown timer and stopwatch

pub mod machine;

pub use machine::{Timer, TimerBehavior, TimerEvent, TimerState, TIMER_CAP_MS};
