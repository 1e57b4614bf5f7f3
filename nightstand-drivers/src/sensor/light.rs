//! Light-dependent resistor as an ambient light sensor
//!
//! The LDR sits on the low side of a divider, so the reading rises with
//! light. The response is treated as linear up to `full_scale_lux`, which
//! is good enough to drive a 16-step dimming curve.

use nightstand_core::traits::LightSensor;

use super::{AdcReader, ADC_MAX};

pub struct LdrLightSensor<ADC> {
    adc: ADC,
    /// Illuminance at full-scale reading
    full_scale_lux: u16,
}

impl<ADC> LdrLightSensor<ADC> {
    pub fn new(adc: ADC, full_scale_lux: u16) -> Self {
        Self {
            adc,
            full_scale_lux,
        }
    }

    pub fn adc_to_lux(&self, adc_value: u16) -> u16 {
        let adc_value = u32::from(adc_value.min(ADC_MAX - 1));
        (adc_value * u32::from(self.full_scale_lux) / u32::from(ADC_MAX - 1)) as u16
    }
}

impl<ADC: AdcReader> LightSensor for LdrLightSensor<ADC> {
    fn read_lux(&mut self) -> Option<u16> {
        let adc_value = self.adc.read().ok()?;
        Some(self.adc_to_lux(adc_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::DummyAdc;

    #[test]
    fn test_scale() {
        let sensor = LdrLightSensor::new(DummyAdc(None), 1000);
        assert_eq!(sensor.adc_to_lux(0), 0);
        assert_eq!(sensor.adc_to_lux(4095), 1000);
        assert_eq!(sensor.adc_to_lux(u16::MAX), 1000);
    }

    #[test]
    fn test_read() {
        let mut sensor = LdrLightSensor::new(DummyAdc(Some(4095)), 500);
        assert_eq!(sensor.read_lux(), Some(500));

        let mut broken = LdrLightSensor::new(DummyAdc(None), 500);
        assert_eq!(broken.read_lux(), None);
    }
}
