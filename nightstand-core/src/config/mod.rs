//! Configuration
//!
//! [`ClockConfig`] describes the appliance build and is fixed at startup.
//! [`UserSettings`] holds what the user changes at runtime and is persisted
//! as a postcard-encoded [`SettingsBlock`].

pub mod settings;
pub mod types;

pub use settings::{
    CounterDate, SettingsBlock, UserSettings, SETTINGS_BUFFER_SIZE, SETTINGS_MAGIC,
    SETTINGS_VERSION,
};
pub use types::*;
