//! Alarm scheduling

pub mod scheduler;

pub use scheduler::{
    AlarmConfig, AlarmOutcome, AlarmScheduler, AlarmState, AutoSkip, DateRange, SkipReason,
};
