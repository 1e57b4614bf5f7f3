//! Ambient light and temperature sensor traits

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor did not respond
    NotResponding,
    /// Reading out of expected range
    OutOfRange,
}

/// Trait for the ambient light sensor feeding the dimming curve
pub trait LightSensor {
    /// Current illuminance in lux, or `None` if no reading is available
    fn read_lux(&mut self) -> Option<u16>;
}

/// Trait for temperature sensors (e.g. the RTC's die sensor)
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Returns a fixed-point value with 0.1°C resolution.
    /// For example, 21.5°C is returned as 215.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;
}

/// Placeholder for boards without a light sensor
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLightSensor;

impl LightSensor for NoLightSensor {
    fn read_lux(&mut self) -> Option<u16> {
        None
    }
}

/// Placeholder for boards without a temperature sensor
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTemperatureSensor;

impl TemperatureSensor for NoTemperatureSensor {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        Err(SensorError::NotResponding)
    }
}
