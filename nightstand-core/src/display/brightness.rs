//! Brightness selection

use super::format::{DimmingMode, NightDim};
use crate::config::DisplayConfig;

/// Pick a brightness level (0-15)
///
/// The night-dim period wins over everything else. In ambient mode the
/// level follows a linear curve between `lux_dim` and `lux_full`; with no
/// sensor reading the display stays at full brightness.
pub fn brightness(
    config: &DisplayConfig,
    mode: DimmingMode,
    night: &NightDim,
    lux: Option<u16>,
    minute_of_day: u16,
) -> u8 {
    if night.is_active(minute_of_day) {
        return config.brightness_dim;
    }

    let Some(lux) = lux.filter(|_| mode == DimmingMode::Ambient) else {
        return config.brightness_full;
    };

    if lux >= config.lux_full {
        return config.brightness_full;
    }
    if lux <= config.lux_dim {
        return config.brightness_dim;
    }

    let span_lux = u32::from(config.lux_full - config.lux_dim);
    let span_level = u32::from(config.brightness_full.saturating_sub(config.brightness_dim));
    let offset = u32::from(lux - config.lux_dim) * span_level / span_lux;
    config.brightness_dim + offset as u8
}
