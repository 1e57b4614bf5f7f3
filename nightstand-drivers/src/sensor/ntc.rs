//! NTC 10K thermistor sensor
//!
//! Room temperature sensing for boards without an RTC die sensor.
//! Uses a lookup table for integer-only temperature calculation.

use nightstand_core::traits::{SensorError, TemperatureSensor};

use super::{AdcReader, ADC_MAX};

/// NTC 10K thermistor temperature lookup table
///
/// Table format: (resistance_ohms, temperature_x10)
/// Generated using beta equation with:
/// - R0 = 10,000 ohms at T0 = 25°C
/// - Beta = 3950K
///
/// Temperature range: -20°C to 60°C
const TEMP_TABLE: &[(u32, i16)] = &[
    (105_400, -200),
    (58_200, -100),
    (33_620, 0),
    (20_180, 100),
    (12_540, 200),
    (10_000, 250), // R0
    (8_040, 300),
    (5_300, 400),
    (3_590, 500),
    (2_490, 600),
];

/// NTC 10K thermistor with B=3950
///
/// Circuit: VCC -- pullup -- ADC_PIN -- NTC -- GND
pub struct NtcSensor<ADC> {
    adc: ADC,
    /// Pull-up resistor value in ohms
    pullup_ohms: u32,
}

impl<ADC> NtcSensor<ADC> {
    pub fn new(adc: ADC, pullup_ohms: u32) -> Self {
        Self { adc, pullup_ohms }
    }

    /// Convert ADC reading to resistance
    ///
    /// R_ntc = R_pullup * adc_value / (adc_max - adc_value)
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<u32, SensorError> {
        // Rail readings mean an open or shorted thermistor
        if adc_value >= ADC_MAX - 10 || adc_value < 10 {
            return Err(SensorError::NotResponding);
        }

        let numerator = u64::from(self.pullup_ohms) * u64::from(adc_value);
        let denominator = u64::from(ADC_MAX - adc_value);
        Ok((numerator / denominator) as u32)
    }

    /// Calculate temperature from resistance using lookup table
    ///
    /// Returns temperature in 0.1°C units (e.g., 215 = 21.5°C).
    /// Uses linear interpolation between table entries.
    pub fn resistance_to_temp_x10(resistance: u32) -> Result<i16, SensorError> {
        // Table is sorted by decreasing resistance (increasing temperature)
        TEMP_TABLE
            .windows(2)
            .find_map(|pair| {
                let (r_high, t_low) = pair[0];
                let (r_low, t_high) = pair[1];
                if resistance > r_high || resistance < r_low {
                    return None;
                }
                let r_range = (r_high - r_low) as i32;
                let t_range = i32::from(t_high - t_low);
                let r_offset = (r_high - resistance) as i32;
                Some(t_low + (t_range * r_offset / r_range) as i16)
            })
            .ok_or(SensorError::OutOfRange)
    }
}

impl<ADC: AdcReader> TemperatureSensor for NtcSensor<ADC> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::NotResponding)?;
        let resistance = self.adc_to_resistance(adc_value)?;
        Self::resistance_to_temp_x10(resistance)
    }
}
