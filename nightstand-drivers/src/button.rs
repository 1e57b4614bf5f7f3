//! Push-button inputs
//!
//! Buttons are only sampled here. Debouncing and hold classification
//! happen in the core, which needs the raw level once per tick.

use embedded_hal::digital::InputPin;
use nightstand_core::input::ControlSamples;

/// One push button on a GPIO pin
pub struct ButtonInput<P> {
    pin: P,
    /// If true, pressed = pin LOW (switch to ground with pull-up)
    active_low: bool,
}

impl<P: InputPin> ButtonInput<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Button to ground with a pull-up
    pub fn active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Raw pressed level
    ///
    /// A pin read error counts as released.
    pub fn is_pressed(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high != self.active_low,
            Err(_) => false,
        }
    }
}

/// The clock's control buttons
///
/// Boards without Alt or Up/Down buttons pass
/// `ButtonInput::active_high(NoPin)` for the missing ones.
pub struct ControlPanel<S, A, U, D> {
    pub select: ButtonInput<S>,
    pub alt: ButtonInput<A>,
    pub up: ButtonInput<U>,
    pub down: ButtonInput<D>,
}

impl<S, A, U, D> ControlPanel<S, A, U, D>
where
    S: InputPin,
    A: InputPin,
    U: InputPin,
    D: InputPin,
{
    pub fn new(
        select: ButtonInput<S>,
        alt: ButtonInput<A>,
        up: ButtonInput<U>,
        down: ButtonInput<D>,
    ) -> Self {
        Self {
            select,
            alt,
            up,
            down,
        }
    }

    /// Sample every button for this tick
    ///
    /// `rotary` is the detent count collected from an encoder since the
    /// last tick (0 without one).
    pub fn sample(&mut self, rotary: i8) -> ControlSamples {
        ControlSamples {
            select: self.select.is_pressed(),
            alt: self.alt.is_pressed(),
            up: self.up.is_pressed(),
            down: self.down.is_pressed(),
            rotary,
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::mock::MockInput;
    use crate::NoPin;

    #[test]
    fn test_active_low_button() {
        let level = Cell::new(true);
        let mut button = ButtonInput::active_low(MockInput(&level));
        assert!(!button.is_pressed());

        level.set(false);
        assert!(button.is_pressed());
    }

    #[test]
    fn test_active_high_button() {
        let level = Cell::new(false);
        let mut button = ButtonInput::active_high(MockInput(&level));
        assert!(!button.is_pressed());

        level.set(true);
        assert!(button.is_pressed());
    }

    #[test]
    fn test_panel_sample() {
        let select = Cell::new(false);
        let up = Cell::new(true);
        let mut panel = ControlPanel::new(
            ButtonInput::active_low(MockInput(&select)),
            ButtonInput::active_high(NoPin),
            ButtonInput::active_low(MockInput(&up)),
            ButtonInput::active_high(NoPin),
        );

        let samples = panel.sample(-2);
        assert!(samples.select);
        assert!(!samples.alt);
        assert!(!samples.up);
        assert!(!samples.down);
        assert_eq!(samples.rotary, -2);
    }
}
