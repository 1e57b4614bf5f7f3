//! Display driver trait
//!
//! The display is a dumb sink: the core composes a [`DisplayFrame`] every
//! tick and the driver turns it into segments, matrix columns or tube
//! cathodes. Nothing flows back to the core.

use core::ops::Range;

use crate::display::DisplayFrame;

/// Trait for the digit display peripheral
pub trait DisplayDriver {
    /// Show a frame
    ///
    /// Positions set to `None` are blank. Positions in the frame's blink
    /// mask should blink at the driver's own cadence.
    fn render(&mut self, frame: &DisplayFrame);

    /// Set brightness level (0-15)
    fn set_brightness(&mut self, level: u8);

    /// Blank a range of digit positions
    fn clear(&mut self, positions: Range<u8>);
}
