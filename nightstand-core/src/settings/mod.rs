//! Numeric settings editor

pub mod editor;

pub use editor::{
    EndReason, SessionEnd, SettingField, SettingsEditor, SettingsSession, TimeoutPolicy,
};
