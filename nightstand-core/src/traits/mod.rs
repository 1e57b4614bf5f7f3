//! Hardware abstraction traits
//!
//! These traits define the interface between the clock core and the
//! board-specific peripherals: display, time source, settings storage,
//! light and temperature sensors, and the alert output.

pub mod alert;
pub mod display;
pub mod sensor;
pub mod storage;
pub mod time_source;

pub use alert::AlertOutput;
pub use display::DisplayDriver;
pub use sensor::{LightSensor, NoLightSensor, NoTemperatureSensor, SensorError, TemperatureSensor};
pub use storage::{NoStorage, SettingsStore, StorageError};
pub use time_source::{NoTimeSource, TimeSource, TimeSourceError};
