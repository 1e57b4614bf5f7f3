//! Alert signal patterns and sequencing

pub mod pattern;
pub mod sequencer;

pub use pattern::{PulseSchedule, SignalPattern, STEADY_INTERVAL_MS};
pub use sequencer::{
    OutputKind, SignalEnd, SignalEvent, SignalRequest, SignalSequencer, SignalSession,
    SignalSource,
};
