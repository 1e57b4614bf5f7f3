//! Hardware adapters for the Nightstand core
//!
//! This crate provides implementations of the traits defined in
//! nightstand-core on top of `embedded-hal` 1.0 pins:
//!
//! - Buttons sampled into [`ControlSamples`](nightstand_core::input::ControlSamples)
//! - Quadrature rotary encoder decoding
//! - GPIO alert output (beeper, switched appliance, pulse solenoid)
//! - Settings storage over any byte-addressable memory
//! - NTC thermistor and light-dependent resistor sensors

#![no_std]
#![deny(unsafe_code)]

pub mod alert;
pub mod button;
pub mod encoder;
pub mod sensor;
pub mod store;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Stand-in for a pin that is not fitted
///
/// Reads low and ignores writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
