//! Analog sensors
//!
//! Both sensors read a resistive divider through an ADC channel.

pub mod light;
pub mod ntc;

pub use light::LdrLightSensor;
pub use ntc::NtcSensor;

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Full scale of a 12-bit ADC
pub const ADC_MAX: u16 = 4096;

/// Fixed ADC value for tests
#[cfg(test)]
pub struct DummyAdc(pub Option<u16>);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.0.ok_or(())
    }
}
